//! Attendance code configuration.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

/// Default code lifetime in minutes.
const fn default_code_ttl_minutes() -> u32 {
    15
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AttendanceConfig {
    /// Minutes a code stays redeemable after opening. Zero expires codes
    /// as soon as the clock moves past the opening instant.
    #[serde(default = "default_code_ttl_minutes")]
    pub code_ttl_minutes: u32,

    /// Base for redemption deep links (e.g. `https://attend.example.edu`).
    /// Empty yields root-relative links.
    #[serde(default)]
    pub base_url: String,
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            code_ttl_minutes: default_code_ttl_minutes(),
            base_url: String::new(),
        }
    }
}

impl AttendanceConfig {
    /// Code lifetime as a duration.
    pub fn ttl(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.code_ttl_minutes))
    }

    pub fn has_base_url(&self) -> bool {
        !self.base_url.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ttl_is_fifteen_minutes() {
        let config = AttendanceConfig::default();
        assert_eq!(config.ttl(), TimeDelta::minutes(15));
        assert!(!config.has_base_url());
    }

    #[test]
    fn zero_ttl_is_honoured() {
        let config = AttendanceConfig {
            code_ttl_minutes: 0,
            ..Default::default()
        };
        assert_eq!(config.ttl(), TimeDelta::zero());
    }

    #[test]
    fn whitespace_base_url_is_unset() {
        let config = AttendanceConfig {
            base_url: "  ".into(),
            ..Default::default()
        };
        assert!(!config.has_base_url());
    }
}
