/// Config sections reachable through `ROLLCALL_<SECTION>__<KEY>`.
const SECTIONS: [&str; 3] = ["ATTENDANCE", "DATABASE", "GENERAL"];

/// Emit warnings for likely mistyped env var keys that silently fell back to defaults.
pub fn warn_unconfigured() {
    for warning in collect_unconfigured_warnings(std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env_keys = env.into_iter().map(|(key, _)| key).collect::<Vec<_>>();

    SECTIONS
        .iter()
        .filter_map(|section| {
            let single = format!("ROLLCALL_{section}_");
            let double = format!("ROLLCALL_{section}__");
            let mistyped = env_keys
                .iter()
                .find(|key| key.starts_with(&single) && !key.starts_with(&double))?;
            Some(format!(
                "{mistyped} is ignored. Use double underscores (example: {double}{}).",
                example_key(section)
            ))
        })
        .collect()
}

fn example_key(section: &str) -> &'static str {
    match section {
        "ATTENDANCE" => "CODE_TTL_MINUTES",
        "DATABASE" => "PATH",
        _ => "DEFAULT_LIMIT",
    }
}
