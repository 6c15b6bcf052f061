use chrono::{DateTime, NaiveDateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::SessionStatus;
use crate::errors::CoreError;

/// One scheduled meeting of a section.
///
/// The code verifier is owned by the session row in storage but is never part
/// of this struct, so no read path can hand it to a caller.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ClassSession {
    pub id: String,
    pub section_id: String,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    pub status: SessionStatus,
    pub opened_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ClassSession {
    /// Reject a schedule whose end is not strictly after its start.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if `end <= start`.
    pub fn validate_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), CoreError> {
        if end <= start {
            return Err(CoreError::Validation("End must be after start.".into()));
        }
        Ok(())
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == SessionStatus::Open
    }
}

/// Parse a schedule bound supplied by a caller.
///
/// Accepts RFC 3339 (`2026-10-15T09:00:00Z`) or the minute-precision local form
/// (`2026-10-15T09:00`), which is interpreted as UTC. Blank input is a
/// validation error rather than a parse error.
///
/// # Errors
///
/// Returns `CoreError::Validation` if the value is blank or unparseable.
pub fn parse_schedule_instant(raw: &str) -> Result<DateTime<Utc>, CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Start and end are required.".into()));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M")
        .map(|naive| naive.and_utc())
        .map_err(|e| CoreError::Validation(format!("Invalid date/time '{trimmed}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn window_requires_end_after_start() {
        let start = Utc.with_ymd_and_hms(2026, 10, 15, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 10, 15, 10, 0, 0).unwrap();
        assert!(ClassSession::validate_window(start, end).is_ok());
        assert!(matches!(
            ClassSession::validate_window(end, start),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            ClassSession::validate_window(start, start),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn parses_minute_precision_local_form() {
        let parsed = parse_schedule_instant("2026-10-15T09:30").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 10, 15, 9, 30, 0).unwrap());
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let parsed = parse_schedule_instant("2026-10-15T11:30:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 10, 15, 9, 30, 0).unwrap());
    }

    #[test]
    fn blank_bound_is_validation_error() {
        assert!(matches!(
            parse_schedule_instant("   "),
            Err(CoreError::Validation(msg)) if msg.contains("required")
        ));
    }

    #[test]
    fn garbage_bound_is_validation_error() {
        assert!(matches!(
            parse_schedule_instant("next tuesday"),
            Err(CoreError::Validation(_))
        ));
    }
}
