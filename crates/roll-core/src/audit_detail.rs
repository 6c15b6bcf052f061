//! Typed audit detail payloads.
//!
//! Each audit action can carry a structured `detail` JSON blob. None of these
//! shapes has a field for code material.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Detail for `AuditAction::Opened`, `Closed`, and `Expired`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StatusChangedDetail {
    pub from: String,
    pub to: String,
    /// Redemption deadline in force at the time of the change.
    pub deadline: Option<DateTime<Utc>>,
}

/// Detail for `AuditAction::Created` on a class session.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ScheduledDetail {
    pub section_id: String,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
}

/// Detail for `AuditAction::Redeemed`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RedeemedDetail {
    pub session_id: String,
    pub student_id: String,
}

/// Detail for `AuditAction::Enrolled`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct EnrolledDetail {
    pub section_id: String,
    pub student_id: String,
}
