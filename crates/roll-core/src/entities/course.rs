use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Course {
    pub id: String,
    pub code: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}
