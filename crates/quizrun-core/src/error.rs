//! Engine error types.
//!
//! These errors are surfaced to the presentation layer, which decides whether
//! to show them to the user or treat them as its own bug.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the question bank loader and the session engine.
#[derive(Debug, Error)]
pub enum QuizError {
    /// A question source failed schema validation at load time.
    #[error("malformed question source {source_name}: {reason}")]
    MalformedSource { source_name: String, reason: String },

    /// An operation was invoked outside the state it is valid in.
    #[error("{operation} is not valid while {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    /// The question source could not be read.
    #[error("failed to read question source {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl QuizError {
    pub(crate) fn malformed(source_name: &str, reason: impl Into<String>) -> Self {
        QuizError::MalformedSource {
            source_name: source_name.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_state(operation: &'static str, state: &'static str) -> Self {
        QuizError::InvalidState { operation, state }
    }

    /// Returns `true` if the message is meant for the user rather than the
    /// adapter developer.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, QuizError::MalformedSource { .. } | QuizError::Io { .. })
    }
}
