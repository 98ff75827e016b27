//! Error types for the dialogue engine.

use std::path::PathBuf;

use parley_lookup::LookupError;
use parley_state::StateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("unknown goal {name:?}")]
    UnknownGoal { name: String },

    #[error("unknown action {name:?}")]
    UnknownAction { name: String },

    #[error("no {kind} is registered under {key:?}")]
    UnknownComponent { kind: &'static str, key: String },

    #[error("{component} requires the {property:?} property")]
    MissingProperty { component: String, property: String },

    #[error("unknown bot {name:?}")]
    UnknownBot { name: String },

    #[error("unknown conversation {id}")]
    UnknownConversation { id: String },

    #[error("bot {bot:?} has no workflow")]
    NoWorkflow { bot: String },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
