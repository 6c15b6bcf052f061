//! Authorization guard.
//!
//! Capabilities are decided by a single match over `(capability, role)`
//! against the actor's relations to a section. Relations are computed per
//! request from the section row and the enrollment lookup and are never cached.
//!
//! | capability        | admin | lecturer        | ta             | student  |
//! |-------------------|-------|-----------------|----------------|----------|
//! | `ManageSessions`  | no    | own instructor  | own assistant  | no       |
//! | `Redeem`          | no    | no              | no             | enrolled |
//! | `ViewReports`     | yes   | own instructor  | own assistant  | no       |

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Section, User};
use crate::enums::Role;
use crate::errors::CoreError;

/// The identity performing an operation, passed explicitly to every call.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

impl Actor {
    #[must_use]
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self::new(user.id.clone(), user.role)
    }
}

/// What the actor is trying to do with a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Create, open, and close class sessions.
    ManageSessions,
    /// Redeem an access code into an attendance record.
    Redeem,
    /// Read rosters, summaries, and exports.
    ViewReports,
}

/// The actor's relations to one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SectionRelations {
    pub instructor: bool,
    pub assistant: bool,
    pub enrolled: bool,
}

impl SectionRelations {
    /// Compute relations from the section row and an enrollment lookup.
    #[must_use]
    pub fn of(actor: &Actor, section: &Section, enrolled: bool) -> Self {
        Self {
            instructor: section.instructor_id == actor.id,
            assistant: section.assistant_id.as_deref() == Some(actor.id.as_str()),
            enrolled,
        }
    }
}

/// Decide whether `role` with `relations` holds `capability`.
#[must_use]
pub const fn permits(capability: Capability, role: Role, relations: SectionRelations) -> bool {
    match (capability, role) {
        (Capability::ManageSessions | Capability::ViewReports, Role::Lecturer) => {
            relations.instructor
        }
        (Capability::ManageSessions | Capability::ViewReports, Role::Ta) => relations.assistant,
        (Capability::ViewReports, Role::Admin) => true,
        (Capability::Redeem, Role::Student) => relations.enrolled,
        _ => false,
    }
}

/// Section-manager check: lecturer owning the section or its assigned assistant.
#[must_use]
pub fn is_section_manager(actor: &Actor, section: &Section) -> bool {
    permits(
        Capability::ManageSessions,
        actor.role,
        SectionRelations::of(actor, section, false),
    )
}

/// Enrollment check: a student with an enrollment row for the section.
#[must_use]
pub fn is_enrolled_student(actor: &Actor, enrolled: bool) -> bool {
    permits(
        Capability::Redeem,
        actor.role,
        SectionRelations {
            enrolled,
            ..SectionRelations::default()
        },
    )
}

/// Enforce a capability, yielding a generic denial on failure.
///
/// # Errors
///
/// Returns `CoreError::AccessDenied` when the capability is not held.
pub fn authorize(
    actor: &Actor,
    capability: Capability,
    relations: SectionRelations,
) -> Result<(), CoreError> {
    if permits(capability, actor.role, relations) {
        Ok(())
    } else {
        Err(CoreError::AccessDenied)
    }
}

/// A student's own attendance is readable by that student or an admin.
///
/// # Errors
///
/// Returns `CoreError::AccessDenied` for anyone else.
pub fn authorize_student_view(actor: &Actor, student_id: &str) -> Result<(), CoreError> {
    match actor.role {
        Role::Admin => Ok(()),
        Role::Student if actor.id == student_id => Ok(()),
        _ => Err(CoreError::AccessDenied),
    }
}
