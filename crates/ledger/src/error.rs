//! Credit ledger errors
//!
//! The boundary error taxonomy of the whole engine. Provider failures
//! are deliberately absent: they are handled inside the component that
//! made the call and never surface here.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CreditError {
    /// Malformed or out-of-bounds input; names the offending field.
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Illegal state transition attempted.
    #[error("Illegal {entity} transition for {id}: {current} -> {attempted}")]
    Conflict {
        entity: &'static str,
        id: String,
        current: String,
        attempted: String,
    },

    /// Unknown id for the requested entity.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
}

impl CreditError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CreditError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CreditError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// The field a validation error names, if any. Used by tests and
    /// callers that map errors onto form fields.
    pub fn field(&self) -> Option<&str> {
        match self {
            CreditError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}
