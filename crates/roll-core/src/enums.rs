//! Status enums, roles, entity types, and audit actions for Rollcall.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! `SessionStatus` provides `allowed_next_states()` to enforce valid transitions
//! at the application layer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Closed set of user roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Lecturer,
    Ta,
    Student,
}

impl Role {
    /// Return the string representation used in SQL storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Lecturer => "lecturer",
            Self::Ta => "ta",
            Self::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SessionStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a class session.
///
/// ```text
/// scheduled → open → closed
/// ```
///
/// `closed` is terminal and nothing re-enters `scheduled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Scheduled,
    Open,
    Closed,
}

impl SessionStatus {
    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Scheduled => &[Self::Open],
            Self::Open => &[Self::Closed],
            Self::Closed => &[],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AttendanceStatus
// ---------------------------------------------------------------------------

/// Derived attendance status of a student for one session.
///
/// Only `Present` is ever stored. `Absent` is the absence of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AuditAction
// ---------------------------------------------------------------------------

/// Type of action recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Created,
    Opened,
    Closed,
    Expired,
    Redeemed,
    Enrolled,
}

impl AuditAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Opened => "opened",
            Self::Closed => "closed",
            Self::Expired => "expired",
            Self::Redeemed => "redeemed",
            Self::Enrolled => "enrolled",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EntityType
// ---------------------------------------------------------------------------

/// Type of entity in the system, used in the audit trail and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    User,
    Course,
    Section,
    Enrollment,
    ClassSession,
    AttendanceRecord,
}

impl EntityType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Course => "course",
            Self::Section => "section",
            Self::Enrollment => "enrollment",
            Self::ClassSession => "class_session",
            Self::AttendanceRecord => "attendance_record",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_serde_roundtrip {
        ($name:ident, $ty:ty, $variant:expr, $expected:literal) => {
            #[test]
            fn $name() {
                let json = serde_json::to_string(&$variant).unwrap();
                assert_eq!(json, concat!("\"", $expected, "\""));
                let back: $ty = serde_json::from_str(&json).unwrap();
                assert_eq!(back, $variant);
            }
        };
    }

    test_serde_roundtrip!(role_ta, Role, Role::Ta, "ta");
    test_serde_roundtrip!(role_lecturer, Role, Role::Lecturer, "lecturer");
    test_serde_roundtrip!(
        session_scheduled,
        SessionStatus,
        SessionStatus::Scheduled,
        "scheduled"
    );
    test_serde_roundtrip!(
        attendance_absent,
        AttendanceStatus,
        AttendanceStatus::Absent,
        "absent"
    );
    test_serde_roundtrip!(
        entity_class_session,
        EntityType,
        EntityType::ClassSession,
        "class_session"
    );
    test_serde_roundtrip!(audit_redeemed, AuditAction, AuditAction::Redeemed, "redeemed");

    #[test]
    fn unknown_role_is_rejected() {
        assert!(serde_json::from_str::<Role>("\"superuser\"").is_err());
    }

    #[test]
    fn session_valid_transitions() {
        assert!(SessionStatus::Scheduled.can_transition_to(SessionStatus::Open));
        assert!(SessionStatus::Open.can_transition_to(SessionStatus::Closed));
    }

    #[test]
    fn session_invalid_transitions() {
        assert!(!SessionStatus::Scheduled.can_transition_to(SessionStatus::Closed));
        assert!(!SessionStatus::Open.can_transition_to(SessionStatus::Open));
        assert!(!SessionStatus::Open.can_transition_to(SessionStatus::Scheduled));
        assert!(!SessionStatus::Closed.can_transition_to(SessionStatus::Open));
        assert!(!SessionStatus::Closed.can_transition_to(SessionStatus::Scheduled));
    }

    #[test]
    fn session_closed_is_terminal() {
        assert!(SessionStatus::Closed.allowed_next_states().is_empty());
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(format!("{}", Role::Student), "student");
        assert_eq!(format!("{}", SessionStatus::Open), "open");
        assert_eq!(format!("{}", AttendanceStatus::Present), "present");
        assert_eq!(format!("{}", AuditAction::Expired), "expired");
        assert_eq!(format!("{}", EntityType::AttendanceRecord), "attendance_record");
    }
}
