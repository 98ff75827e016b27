//! Scope labels and scoped paths such as `conv:/prompt.question`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{StateError, StateResult};
use crate::path::PathExpr;

/// Which of the three stores a path addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Lives as long as the user.
    User,
    /// Lives as long as the conversation.
    Conversation,
    /// Discarded after each utterance.
    Utterance,
}

impl Scope {
    pub const ALL: [Scope; 3] = [Scope::User, Scope::Conversation, Scope::Utterance];

    pub fn label(self) -> &'static str {
        match self {
            Scope::User => "user",
            Scope::Conversation => "conv",
            Scope::Utterance => "utt",
        }
    }

    /// Parses a scope label. Labels are case-insensitive and may carry a
    /// leading `$`.
    pub fn parse(label: &str) -> StateResult<Self> {
        let trimmed = label.trim();
        let bare = trimmed.strip_prefix('$').unwrap_or(trimmed);
        match bare.to_ascii_lowercase().as_str() {
            "user" => Ok(Scope::User),
            "conv" => Ok(Scope::Conversation),
            "utt" => Ok(Scope::Utterance),
            _ => Err(StateError::UnknownScope {
                label: label.to_string(),
            }),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Scope {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scope::parse(s)
    }
}

/// A path expression bound to one scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopedPath {
    pub scope: Scope,
    pub path: PathExpr,
}

impl ScopedPath {
    pub fn new(scope: Scope, path: PathExpr) -> Self {
        ScopedPath { scope, path }
    }

    /// Parses `scope:expression`.
    pub fn parse(text: &str) -> StateResult<Self> {
        let Some((label, expression)) = text.trim().split_once(':') else {
            return Err(StateError::parse(text, "expected `scope:expression`"));
        };
        Ok(ScopedPath {
            scope: Scope::parse(label)?,
            path: PathExpr::parse(expression)?,
        })
    }

    /// The same scope with `suffix` appended to the path.
    pub fn join(&self, suffix: &PathExpr) -> StateResult<ScopedPath> {
        Ok(ScopedPath {
            scope: self.scope,
            path: self.path.join(suffix)?,
        })
    }
}

impl fmt::Display for ScopedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scope, self.path)
    }
}

impl FromStr for ScopedPath {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScopedPath::parse(s)
    }
}

impl Serialize for ScopedPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ScopedPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        ScopedPath::parse(&text).map_err(serde::de::Error::custom)
    }
}
