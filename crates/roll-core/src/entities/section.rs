use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A teaching unit of a course. `(course_id, section_code)` is unique.
///
/// Exactly one instructor owns a section; an assistant is optional.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Section {
    pub id: String,
    pub course_id: String,
    pub section_code: String,
    pub instructor_id: String,
    pub assistant_id: Option<String>,
    pub created_at: DateTime<Utc>,
}
