use roll_config::GeneralConfig;

/// Row cap for list commands: `--limit`, then `general.default_limit`.
#[must_use]
pub fn list_limit(global: Option<u32>, general: &GeneralConfig) -> u32 {
    global.unwrap_or(general.default_limit)
}

/// Entry cap for activity feeds: the command's own `--recent`, then
/// `--limit`, then `general.recent_activity_limit`.
#[must_use]
pub fn feed_limit(recent: Option<u32>, global: Option<u32>, general: &GeneralConfig) -> u32 {
    recent.or(global).unwrap_or(general.recent_activity_limit)
}

#[cfg(test)]
mod tests {
    use roll_config::GeneralConfig;

    use super::{feed_limit, list_limit};

    #[test]
    fn list_limit_prefers_flag() {
        let general = GeneralConfig::default();
        assert_eq!(list_limit(Some(7), &general), 7);
        assert_eq!(list_limit(None, &general), 20);
    }

    #[test]
    fn recent_beats_global_limit() {
        let general = GeneralConfig::default();
        assert_eq!(feed_limit(Some(5), Some(10), &general), 5);
        assert_eq!(feed_limit(None, Some(10), &general), 10);
        assert_eq!(feed_limit(None, None, &general), 50);
    }
}
