//! The value tree held by every scoped store.
//!
//! Containers are reference counted, so cloning a [`Node`] is cheap and two
//! versions of a tree share every container that was not on the path of an
//! edit.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A tagged value: a map, a list, or one of three scalar kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Bool(bool),
    Num(f64),
    Str(Arc<str>),
    List(Arc<Vec<Node>>),
    Map(Arc<BTreeMap<String, Node>>),
}

impl Node {
    /// An empty map.
    pub fn map() -> Self {
        Node::Map(Arc::default())
    }

    /// An empty list.
    pub fn list() -> Self {
        Node::List(Arc::default())
    }

    /// A string scalar.
    pub fn str(value: impl AsRef<str>) -> Self {
        Node::Str(Arc::from(value.as_ref()))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Node::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Node>> {
        match self {
            Node::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Node]> {
        match self {
            Node::List(list) => Some(list),
            _ => None,
        }
    }

    /// Returns `true` for maps and lists.
    pub fn is_container(&self) -> bool {
        matches!(self, Node::Map(_) | Node::List(_))
    }

    /// Short name of the node's shape, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Bool(_) => "boolean",
            Node::Num(_) => "number",
            Node::Str(_) => "string",
            Node::List(_) => "list",
            Node::Map(_) => "map",
        }
    }

    /// Returns `true` when both nodes are the same allocation (containers) or
    /// equal scalars. Used to observe structural sharing.
    pub fn shares_with(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Map(a), Node::Map(b)) => Arc::ptr_eq(a, b),
            (Node::List(a), Node::List(b)) => Arc::ptr_eq(a, b),
            (a, b) => a == b,
        }
    }
}

impl Default for Node {
    fn default() -> Self {
        Node::map()
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::str(value)
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::Str(Arc::from(value))
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Bool(value)
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Node::Num(value)
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Node::Num(value as f64)
    }
}

impl From<Vec<Node>> for Node {
    fn from(value: Vec<Node>) -> Self {
        Node::List(Arc::new(value))
    }
}

impl From<BTreeMap<String, Node>> for Node {
    fn from(value: BTreeMap<String, Node>) -> Self {
        Node::Map(Arc::new(value))
    }
}

/// Formats a number without a trailing `.0` when it holds an integer.
pub(crate) fn format_num(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Bool(b) => write!(f, "{b}"),
            Node::Num(n) => write!(f, "{}", format_num(*n)),
            Node::Str(s) => write!(f, "{s}"),
            Node::List(_) | Node::Map(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                write!(f, "{json}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_numbers_display_without_fraction() {
        assert_eq!(Node::from(10.0).to_string(), "10");
        assert_eq!(Node::from(2.5).to_string(), "2.5");
        assert_eq!(Node::from(-3i64).to_string(), "-3");
    }

    #[test]
    fn containers_display_as_json() {
        let mut map = BTreeMap::new();
        map.insert("name".to_string(), Node::str("hello"));
        map.insert("tags".to_string(), Node::from(vec![Node::from(true)]));
        assert_eq!(
            Node::from(map).to_string(),
            r#"{"name":"hello","tags":[true]}"#
        );
    }

    #[test]
    fn clones_share_containers() {
        let node = Node::from(vec![Node::str("a")]);
        let copy = node.clone();
        assert!(node.shares_with(&copy));
        assert!(!node.shares_with(&Node::from(vec![Node::str("a")])));
    }

    #[test]
    fn deserializes_untagged_json() {
        let node: Node = serde_json::from_str(r#"{"a":[1,"two",false]}"#).unwrap();
        let list = node.as_map().unwrap()["a"].as_list().unwrap().to_vec();
        assert_eq!(list, vec![Node::Num(1.0), Node::str("two"), Node::Bool(false)]);
    }
}
