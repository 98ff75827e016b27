//! Error types for dictionary loading and payload resolution.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    #[error("payload placeholder {placeholder} has no captured value")]
    Payload { placeholder: String },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type LookupResult<T> = Result<T, LookupError>;
