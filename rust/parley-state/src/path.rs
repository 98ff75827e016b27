//! Path expressions: `SIGIL key (SIGIL key)*`.
//!
//! | sigil | meaning                                   |
//! |-------|-------------------------------------------|
//! | `/`   | map child (created as an empty map)       |
//! | `|`   | list child (created as an empty list)     |
//! | `.`   | string leaf                               |
//! | `#`   | number leaf                               |
//! | `?`   | boolean leaf                              |
//!
//! Under a list, a segment's key is read as a zero-based index, so
//! `|previousIntents.0` addresses the first string in `previousIntents`.
//! Scalar sigils may only close an expression.

use std::fmt;
use std::str::FromStr;

use crate::error::{StateError, StateResult};

/// One of the five path sigils.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sigil {
    /// `/`
    Map,
    /// `|`
    List,
    /// `.`
    Str,
    /// `#`
    Num,
    /// `?`
    Bool,
}

impl Sigil {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '/' => Some(Sigil::Map),
            '|' => Some(Sigil::List),
            '.' => Some(Sigil::Str),
            '#' => Some(Sigil::Num),
            '?' => Some(Sigil::Bool),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Sigil::Map => '/',
            Sigil::List => '|',
            Sigil::Str => '.',
            Sigil::Num => '#',
            Sigil::Bool => '?',
        }
    }

    /// Returns `true` for the three leaf sigils.
    pub fn is_scalar(self) -> bool {
        matches!(self, Sigil::Str | Sigil::Num | Sigil::Bool)
    }
}

impl fmt::Display for Sigil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A single `(sigil, key)` step.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    pub sigil: Sigil,
    pub key: String,
}

impl Segment {
    pub fn new(sigil: Sigil, key: impl Into<String>) -> Self {
        Segment {
            sigil,
            key: key.into(),
        }
    }

    /// The key read as a list index.
    pub fn index(&self) -> Option<usize> {
        self.key.parse().ok()
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.sigil, self.key)
    }
}

/// A parsed, non-empty path expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathExpr {
    segments: Vec<Segment>,
}

impl PathExpr {
    /// Parses an expression such as `/objects/ticket.title`.
    pub fn parse(expression: &str) -> StateResult<Self> {
        let text = expression.trim();
        let mut chars = text.chars();
        let Some(first) = chars.next() else {
            return Err(StateError::parse(expression, "expression is empty"));
        };
        let Some(mut sigil) = Sigil::from_char(first) else {
            return Err(StateError::parse(
                expression,
                format!("expression must start with a sigil, found '{first}'"),
            ));
        };

        let mut segments = Vec::new();
        let mut key = String::new();
        for c in chars {
            match Sigil::from_char(c) {
                Some(next) => {
                    segments.push(Segment::new(sigil, std::mem::take(&mut key)));
                    sigil = next;
                }
                None => key.push(c),
            }
        }
        segments.push(Segment::new(sigil, key));

        PathExpr::from_segments(segments).map_err(|reason| StateError::parse(expression, reason))
    }

    fn from_segments(segments: Vec<Segment>) -> Result<Self, String> {
        let last = segments.len() - 1;
        for (i, segment) in segments.iter().enumerate() {
            if segment.key.is_empty() {
                return Err(format!("segment {} has an empty key", i + 1));
            }
            if segment.sigil.is_scalar() && i != last {
                return Err(format!(
                    "'{}' may only appear in the final segment",
                    segment.sigil
                ));
            }
        }
        Ok(PathExpr { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The final segment, which decides the shape of the value read or written.
    pub fn leaf(&self) -> &Segment {
        &self.segments[self.segments.len() - 1]
    }

    /// Appends `suffix` to this expression, e.g. `/objects` + `/ticket`.
    pub fn join(&self, suffix: &PathExpr) -> StateResult<PathExpr> {
        let mut segments = self.segments.clone();
        segments.extend(suffix.segments.iter().cloned());
        PathExpr::from_segments(segments)
            .map_err(|reason| StateError::parse(&format!("{self}{suffix}"), reason))
    }
}

impl FromStr for PathExpr {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PathExpr::parse(s)
    }
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_mixed_sigils() {
        let path = PathExpr::parse("/objects/ticket.title").unwrap();
        assert_eq!(
            path.segments(),
            &[
                Segment::new(Sigil::Map, "objects"),
                Segment::new(Sigil::Map, "ticket"),
                Segment::new(Sigil::Str, "title"),
            ]
        );
        assert_eq!(path.to_string(), "/objects/ticket.title");
    }

    #[test]
    fn parses_list_index() {
        let path = PathExpr::parse("|previousIntents.0").unwrap();
        assert_eq!(path.leaf().index(), Some(0));
        assert_eq!(path.segments()[0].sigil, Sigil::List);
    }

    #[test]
    fn rejects_missing_sigil() {
        assert!(matches!(
            PathExpr::parse("objects/ticket"),
            Err(StateError::Parse { .. })
        ));
        assert!(matches!(PathExpr::parse(""), Err(StateError::Parse { .. })));
    }

    #[test]
    fn rejects_empty_keys_and_inner_scalars() {
        assert!(PathExpr::parse("/objects//ticket").is_err());
        assert!(PathExpr::parse("/").is_err());
        assert!(PathExpr::parse(".name/child").is_err());
    }

    #[test]
    fn joins_expressions() {
        let base = PathExpr::parse("/objects").unwrap();
        let slot = PathExpr::parse("/ticket").unwrap();
        assert_eq!(base.join(&slot).unwrap().to_string(), "/objects/ticket");
    }
}
