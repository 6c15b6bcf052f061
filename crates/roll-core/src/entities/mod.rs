//! Entity structs for all Rollcall domain objects.
//!
//! Each entity maps to a table in the libSQL database (see
//! `roll-db/migrations/001_initial.sql`). All structs derive `Serialize`,
//! `Deserialize`, and `JsonSchema` for JSON output and schema validation.

mod attendance;
mod audit;
mod class_session;
mod course;
mod enrollment;
mod section;
mod user;

pub use attendance::AttendanceRecord;
pub use audit::AuditEntry;
pub use class_session::{ClassSession, parse_schedule_instant};
pub use course::Course;
pub use enrollment::Enrollment;
pub use section::Section;
pub use user::User;
