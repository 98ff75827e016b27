//! Error types for state traversal and command handling.

use thiserror::Error;

/// Errors raised while parsing or evaluating path expressions and commands.
///
/// None of these are retried: a failed `get`/`put`/`remove` leaves the
/// original store untouched and the caller decides what to do next.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StateError {
    /// The path expression is malformed (no leading sigil, empty key, ...).
    #[error("malformed path expression {expression:?}: {reason}")]
    Parse { expression: String, reason: String },

    /// A segment addressed a node of the wrong shape.
    #[error("cannot traverse {expression:?} at segment {segment:?}: {reason}")]
    Traversal {
        expression: String,
        segment: String,
        reason: String,
    },

    /// A value could not be stored under the leaf's sigil.
    #[error("cannot store {value} under the '{sigil}' sigil")]
    Coercion { sigil: char, value: String },

    /// A scoped path named a scope that does not exist.
    #[error("unknown scope label {label:?}")]
    UnknownScope { label: String },

    /// A command string could not be parsed.
    #[error("malformed command {command:?}: {reason}")]
    Command { command: String, reason: String },

    /// A marker placeholder reached the store without being substituted.
    #[error("placeholder {placeholder} was never resolved")]
    UnresolvedMarker { placeholder: String },
}

impl StateError {
    pub(crate) fn parse(expression: &str, reason: impl Into<String>) -> Self {
        StateError::Parse {
            expression: expression.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn traversal(
        expression: impl ToString,
        segment: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        StateError::Traversal {
            expression: expression.to_string(),
            segment: segment.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn command(command: &str, reason: impl Into<String>) -> Self {
        StateError::Command {
            command: command.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for state operations.
pub type StateResult<T> = Result<T, StateError>;
