use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::AttendanceStatus;

/// Proof that a student redeemed a session code. Unique per `(session, student)`.
///
/// Records are never mutated. `status` is always `Present` for stored rows.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AttendanceRecord {
    pub id: String,
    pub session_id: String,
    pub student_id: String,
    pub status: AttendanceStatus,
    pub recorded_at: DateTime<Utc>,
}
