//! Cross-cutting error types for Rollcall.
//!
//! `CoreError` is the taxonomy every lifecycle and redemption operation
//! reports. Storage errors are defined in `roll-db` and wrap this type; the CLI
//! converges everything into `anyhow`.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised by session lifecycle, redemption, and reporting operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// Input failed validation (schedule window, identifiers, uniqueness).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The actor may not perform this operation.
    ///
    /// The message is deliberately generic: it never says whether the role,
    /// the ownership, or the enrollment check failed.
    #[error("Access denied")]
    AccessDenied,

    /// A state machine transition was attempted that is not allowed.
    #[error("Invalid state transition: {entity_type} {id} from {from} to {to}")]
    InvalidTransition {
        entity_type: String,
        id: String,
        from: String,
        to: String,
    },

    /// The operation collides with concurrent state (e.g. another open session).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The session is not accepting redemptions.
    #[error("Session {session_id} is not open for marking")]
    NotOpen { session_id: String },

    /// The redemption deadline has passed.
    #[error("Session {session_id} expired for marking at {deadline}")]
    Expired {
        session_id: String,
        deadline: DateTime<Utc>,
    },

    /// The submitted code is malformed or does not match the verifier.
    #[error("Invalid attendance code")]
    InvalidCode,

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoreError {
    /// Shorthand for a `NotFound` error.
    #[must_use]
    pub fn not_found(entity_type: crate::enums::EntityType, id: &str) -> Self {
        Self::NotFound {
            entity_type: entity_type.as_str().to_string(),
            id: id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::EntityType;

    #[test]
    fn access_denied_message_is_generic() {
        assert_eq!(CoreError::AccessDenied.to_string(), "Access denied");
    }

    #[test]
    fn not_found_formats_entity() {
        let err = CoreError::not_found(EntityType::ClassSession, "cls-1");
        assert_eq!(err.to_string(), "Entity not found: class_session cls-1");
    }

    #[test]
    fn invalid_code_does_not_echo_input() {
        assert_eq!(CoreError::InvalidCode.to_string(), "Invalid attendance code");
    }
}
