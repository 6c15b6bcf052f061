//! ID prefix constants.
//!
//! IDs are `{prefix}-{8 hex chars}`, generated in SQL by `RollDb::generate_id`.

pub const PREFIX_USER: &str = "usr";
pub const PREFIX_COURSE: &str = "crs";
pub const PREFIX_SECTION: &str = "sec";
pub const PREFIX_ENROLLMENT: &str = "enr";
pub const PREFIX_CLASS_SESSION: &str = "cls";
pub const PREFIX_ATTENDANCE: &str = "att";
pub const PREFIX_AUDIT: &str = "aud";

/// Every prefix in use, for exhaustive tests.
pub const ALL_PREFIXES: &[&str] = &[
    PREFIX_USER,
    PREFIX_COURSE,
    PREFIX_SECTION,
    PREFIX_ENROLLMENT,
    PREFIX_CLASS_SESSION,
    PREFIX_ATTENDANCE,
    PREFIX_AUDIT,
];
