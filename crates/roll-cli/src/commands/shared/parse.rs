use chrono::{DateTime, Utc};
use roll_core::entities::parse_schedule_instant;
use serde::de::DeserializeOwned;

/// Parse a snake_case enum value using serde-deserialization.
pub fn parse_enum<T>(raw: &str, field: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
    let json = format!("\"{normalized}\"");
    serde_json::from_str(&json).map_err(|error| anyhow::anyhow!("invalid {field} '{raw}': {error}"))
}

/// Parse `--start`/`--end`, naming the flag on failure.
pub fn parse_instant(raw: &str, field: &str) -> anyhow::Result<DateTime<Utc>> {
    parse_schedule_instant(raw).map_err(|error| anyhow::anyhow!("invalid {field}: {error}"))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use roll_core::enums::{AuditAction, Role};

    use super::{parse_enum, parse_instant};

    #[test]
    fn parses_snake_case_enum() {
        let role: Role = parse_enum("lecturer", "role").expect("role should parse");
        assert_eq!(role, Role::Lecturer);
    }

    #[test]
    fn parses_uppercase_alias() {
        let role: Role = parse_enum("TA", "role").expect("role should parse");
        assert_eq!(role, Role::Ta);
        let action: AuditAction = parse_enum("Redeemed", "action").expect("action should parse");
        assert_eq!(action, AuditAction::Redeemed);
    }

    #[test]
    fn errors_on_invalid_enum() {
        let err = parse_enum::<Role>("dean", "role").expect_err("should fail");
        assert!(err.to_string().contains("invalid role 'dean'"));
    }

    #[test]
    fn instants_accept_both_forms() {
        let expected = Utc.with_ymd_and_hms(2026, 10, 15, 9, 0, 0).unwrap();
        assert_eq!(parse_instant("2026-10-15T09:00", "start").unwrap(), expected);
        assert_eq!(parse_instant("2026-10-15T11:00:00+02:00", "start").unwrap(), expected);
        let err = parse_instant("tomorrow", "end").expect_err("should fail");
        assert!(err.to_string().starts_with("invalid end"));
    }
}
