//! Fatal pipeline errors.
//!
//! Per-endpoint failures (timeouts, unreachable endpoints, malformed output)
//! are not errors at this level: they travel as [`crate::FailureKind`] inside
//! a [`crate::SpecialistResponse`]. Only the two variants below abort a pass,
//! and even they end in an escalated decision rather than a dropped event.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::DisruptionCategory;

/// Result type for orchestration operations
pub type Result<T, E = OrchestrationError> = std::result::Result<T, E>;

/// Errors that are fatal to a single orchestration pass
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrchestrationError {
    /// No registered endpoint carries any capability the category requires
    #[error("no endpoint covers the capabilities required for category '{category}'")]
    UnroutableEvent { category: DisruptionCategory },

    /// Caller misuse of the dispatch engine
    #[error("invalid dispatch: {0}")]
    InvalidDispatch(String),
}

impl OrchestrationError {
    /// Create an unroutable-event error
    pub fn unroutable(category: DisruptionCategory) -> Self {
        OrchestrationError::UnroutableEvent { category }
    }

    /// Create an invalid-dispatch error
    pub fn invalid_dispatch(reason: impl Into<String>) -> Self {
        OrchestrationError::InvalidDispatch(reason.into())
    }

    /// Stable code used in logs and decision diagnostics
    pub fn code(&self) -> &'static str {
        match self {
            OrchestrationError::UnroutableEvent { .. } => "UNROUTABLE_EVENT",
            OrchestrationError::InvalidDispatch(_) => "INVALID_DISPATCH",
        }
    }
}
