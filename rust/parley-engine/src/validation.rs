//! Constraints on goal slots and the validators that check them.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use parley_state::{Node, ScopedPath, Snapshot, StateResult};

use crate::error::{EngineError, EngineResult};

/// Decides whether the value stored in a slot is acceptable.
pub trait Validator: Send + Sync + fmt::Debug {
    /// `value` is `None` when the slot is empty.
    fn accepts(&self, value: Option<&Node>) -> bool;
}

/// Accepts any stored value.
#[derive(Debug, Default, Clone, Copy)]
pub struct NotNull;

impl Validator for NotNull {
    fn accepts(&self, value: Option<&Node>) -> bool {
        value.is_some()
    }
}

/// Accepts values whose text contains a fixed substring.
#[derive(Debug, Clone)]
pub struct Contains {
    needle: String,
}

impl Contains {
    pub fn new(needle: impl Into<String>) -> Self {
        Contains {
            needle: needle.into(),
        }
    }
}

impl Validator for Contains {
    fn accepts(&self, value: Option<&Node>) -> bool {
        value.is_some_and(|value| value.to_string().contains(&self.needle))
    }
}

/// Accepts values equal to one of a fixed set of terms, ignoring ASCII case.
#[derive(Debug, Clone, Default)]
pub struct OneOf {
    terms: HashSet<String>,
}

impl OneOf {
    /// One term per line; blank lines are skipped.
    pub fn from_lines(text: &str) -> Self {
        let terms = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_ascii_lowercase)
            .collect();
        OneOf { terms }
    }

    pub fn load(path: &Path) -> EngineResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(OneOf::from_lines(&text))
    }
}

impl Validator for OneOf {
    fn accepts(&self, value: Option<&Node>) -> bool {
        value.is_some_and(|value| {
            self.terms
                .contains(&value.to_string().trim().to_ascii_lowercase())
        })
    }
}

/// A requirement on one slot of a goal.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub slot: ScopedPath,
    /// Asked when the slot is missing or rejected.
    pub prompt: String,
    pub error_message: Option<String>,
    pub validator: Arc<dyn Validator>,
}

/// A constraint that did not hold.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub slot: ScopedPath,
    pub prompt: String,
    pub message: Option<String>,
}

impl Constraint {
    pub fn new(slot: ScopedPath, prompt: impl Into<String>, validator: Arc<dyn Validator>) -> Self {
        Constraint {
            slot,
            prompt: prompt.into(),
            error_message: None,
            validator,
        }
    }

    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Checks the slot's current value in `snapshot`.
    pub fn check(&self, snapshot: &Snapshot) -> StateResult<Option<Violation>> {
        let value = snapshot.get(&self.slot)?;
        Ok(self.check_value(value.as_ref()))
    }

    /// Checks a candidate value without storing it.
    pub fn check_value(&self, value: Option<&Node>) -> Option<Violation> {
        if self.validator.accepts(value) {
            return None;
        }
        Some(Violation {
            slot: self.slot.clone(),
            prompt: self.prompt.clone(),
            message: self.error_message.clone(),
        })
    }
}
