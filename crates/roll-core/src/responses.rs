//! Composite return types for service operations.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::code::AccessCode;
use crate::entities::{AttendanceRecord, ClassSession};

/// Result of opening a session.
///
/// This is the only place the plaintext code ever appears; it is not
/// persisted and cannot be fetched again.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct OpenedSession {
    pub session: ClassSession,
    pub code: AccessCode,
    pub deadline: DateTime<Utc>,
    pub redemption_url: String,
}

/// Result of a successful redemption.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Redemption {
    pub record: AttendanceRecord,
    /// `true` when a record already existed and nothing was written.
    pub already_recorded: bool,
}

/// An open session visible to an enrolled student.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StudentOpenSession {
    pub session: ClassSession,
    pub section_code: String,
    pub course_code: String,
    pub deadline: DateTime<Utc>,
    pub already_redeemed: bool,
}
