//! Scored candidate replies.

use std::sync::Arc;

use parley_state::{Command, Snapshot};

use crate::action::Action;
use crate::slots::NOT_UNDERSTOOD;

/// What one interpretation of an utterance would say and do.
///
/// `commands` and `actions` have not been applied to `snapshot` yet; the bot
/// applies them only for the winning candidate.
#[derive(Debug, Clone)]
pub struct Response {
    pub spoken: String,
    pub actions: Vec<Arc<dyn Action>>,
    pub commands: Vec<Command>,
    pub snapshot: Snapshot,
    pub score: f64,
}

impl Response {
    pub fn new(spoken: impl Into<String>, snapshot: Snapshot, score: f64) -> Self {
        Response {
            spoken: spoken.into(),
            actions: Vec::new(),
            commands: Vec::new(),
            snapshot,
            score,
        }
    }

    pub fn with_commands(mut self, commands: Vec<Command>) -> Self {
        self.commands = commands;
        self
    }

    pub fn with_actions(mut self, actions: Vec<Arc<dyn Action>>) -> Self {
        self.actions = actions;
        self
    }

    /// The fallback used when no interpretation matched.
    pub fn not_understood(snapshot: Snapshot) -> Self {
        Response::new(NOT_UNDERSTOOD, snapshot, 0.0)
    }
}
