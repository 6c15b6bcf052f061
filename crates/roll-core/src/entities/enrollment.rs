use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A `(section, student)` membership. Unique per pair.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Enrollment {
    pub id: String,
    pub section_id: String,
    pub student_id: String,
    pub created_at: DateTime<Utc>,
}
