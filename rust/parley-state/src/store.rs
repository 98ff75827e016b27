//! Copy-on-write evaluation of path expressions over a store root.
//!
//! Writes descend the expression while recording one [`Frame`] per
//! container they pass through, then fold the frames right to left so that
//! every ancestor of the change is rebuilt exactly once and everything off
//! the path keeps pointing at the original allocations.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{StateError, StateResult};
use crate::node::{Node, format_num};
use crate::path::{PathExpr, Segment, Sigil};

/// Where a child sits inside its parent.
#[derive(Debug, Clone)]
enum Slot {
    Key(String),
    Index(usize),
}

/// A container passed on the way down, captured so it can be rebuilt on the
/// way back up.
#[derive(Debug)]
struct Frame {
    parent: Node,
    slot: Slot,
}

/// One scoped store: a map root edited only through path expressions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Store {
    root: Node,
}

impl Store {
    /// An empty store.
    pub fn new() -> Self {
        Store::default()
    }

    /// Wraps an existing map as a store root.
    pub fn from_map(map: BTreeMap<String, Node>) -> Self {
        Store {
            root: Node::from(map),
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Raw access to a top-level key, for diagnostics and tests.
    pub fn raw(&self, key: &str) -> Option<&Node> {
        self.root.as_map().and_then(|map| map.get(key))
    }

    pub fn is_empty(&self) -> bool {
        self.root.as_map().is_none_or(|map| map.is_empty())
    }

    /// Parses `expression` and reads it.
    pub fn get(&self, expression: &str) -> StateResult<Option<Node>> {
        self.read(&PathExpr::parse(expression)?)
    }

    /// Parses `expression` and writes `value` at it.
    pub fn put(&self, expression: &str, value: impl Into<Option<Node>>) -> StateResult<Store> {
        self.write(&PathExpr::parse(expression)?, value.into())
    }

    /// Parses `expression` and deletes it.
    pub fn remove(&self, expression: &str) -> StateResult<Store> {
        self.delete(&PathExpr::parse(expression)?)
    }

    /// Reads the value at `path`. Missing keys yield `None`; reads never
    /// create structure.
    pub fn read(&self, path: &PathExpr) -> StateResult<Option<Node>> {
        let mut current = &self.root;
        for segment in path.segments() {
            let slot = slot_in(current, segment, path)?;
            let Some(child) = child_at(current, &slot) else {
                return Ok(None);
            };
            expect_shape(child, segment, path)?;
            current = child;
        }
        Ok(Some(current.clone()))
    }

    /// Writes `value` at `path` and returns the new store.
    ///
    /// Missing intermediate containers are created. The final segment
    /// decides what happens to `value`:
    ///
    /// * `/` replaces the child with `value` (which must be a map), or
    ///   ensures an empty map when `value` is `None`;
    /// * `|` appends `value` to the list, creating it if needed (a list
    ///   value stored into an absent slot becomes the list itself);
    /// * `.`, `#` and `?` coerce `value` to a string, number or boolean;
    ///   `None` removes the leaf.
    pub fn write(&self, path: &PathExpr, value: Option<Node>) -> StateResult<Store> {
        let Some((leaf, inner)) = path.segments().split_last() else {
            return Ok(self.clone());
        };

        let mut frames = Vec::with_capacity(path.len());
        let mut current = self.root.clone();
        for segment in inner {
            let slot = slot_in(&current, segment, path)?;
            let child = match child_at(&current, &slot) {
                Some(child) => {
                    expect_shape(child, segment, path)?;
                    child.clone()
                }
                None => empty_container(segment.sigil),
            };
            frames.push(Frame {
                parent: current,
                slot,
            });
            current = child;
        }

        let slot = slot_in(&current, leaf, path)?;
        let replacement = leaf_value(path, leaf, child_at(&current, &slot), value)?;
        let rebuilt = with_child(&current, &slot, replacement);
        Ok(Store {
            root: unwind(frames, rebuilt),
        })
    }

    /// Deletes the key or index named by the final segment of `path`.
    ///
    /// Deleting below a missing intermediate is a no-op.
    pub fn delete(&self, path: &PathExpr) -> StateResult<Store> {
        let Some((leaf, inner)) = path.segments().split_last() else {
            return Ok(self.clone());
        };

        let mut frames = Vec::with_capacity(path.len());
        let mut current = self.root.clone();
        for segment in inner {
            let slot = slot_in(&current, segment, path)?;
            let child = match child_at(&current, &slot) {
                Some(child) => {
                    expect_shape(child, segment, path)?;
                    child.clone()
                }
                None => return Ok(self.clone()),
            };
            frames.push(Frame {
                parent: current,
                slot,
            });
            current = child;
        }

        let slot = slot_in(&current, leaf, path)?;
        if child_at(&current, &slot).is_none() {
            return Ok(self.clone());
        }
        let rebuilt = with_child(&current, &slot, None);
        Ok(Store {
            root: unwind(frames, rebuilt),
        })
    }

    /// A printable tree view of the store.
    pub fn tree(&self) -> TreeView<'_> {
        TreeView { store: self }
    }
}

/// Re-plugs each rebuilt child into its captured parent, innermost first.
fn unwind(mut frames: Vec<Frame>, mut latest: Node) -> Node {
    while let Some(Frame { parent, slot }) = frames.pop() {
        latest = with_child(&parent, &slot, Some(latest));
    }
    latest
}

fn slot_in(container: &Node, segment: &Segment, path: &PathExpr) -> StateResult<Slot> {
    match container {
        Node::Map(_) => Ok(Slot::Key(segment.key.clone())),
        Node::List(_) => segment.index().map(Slot::Index).ok_or_else(|| {
            StateError::traversal(path, segment, "list index must be a non-negative integer")
        }),
        other => Err(StateError::traversal(
            path,
            segment,
            format!("cannot descend into a {}", other.kind()),
        )),
    }
}

fn child_at<'a>(container: &'a Node, slot: &Slot) -> Option<&'a Node> {
    match (container, slot) {
        (Node::Map(map), Slot::Key(key)) => map.get(key),
        (Node::List(list), Slot::Index(index)) => list.get(*index),
        _ => None,
    }
}

/// Returns a copy of `container` with the slot set to `child`, or removed
/// when `child` is `None`. Only the container itself is copied.
fn with_child(container: &Node, slot: &Slot, child: Option<Node>) -> Node {
    match (container, slot) {
        (Node::Map(map), Slot::Key(key)) => {
            if child.is_none() && !map.contains_key(key) {
                return container.clone();
            }
            let mut map = map.as_ref().clone();
            match child {
                Some(child) => {
                    map.insert(key.clone(), child);
                }
                None => {
                    map.remove(key);
                }
            }
            Node::Map(Arc::new(map))
        }
        (Node::List(list), Slot::Index(index)) => {
            let index = *index;
            if child.is_none() && index >= list.len() {
                return container.clone();
            }
            let mut list = list.as_ref().clone();
            match child {
                Some(child) if index < list.len() => list[index] = child,
                Some(child) => list.push(child),
                None => {
                    list.remove(index);
                }
            }
            Node::List(Arc::new(list))
        }
        _ => container.clone(),
    }
}

fn empty_container(sigil: Sigil) -> Node {
    match sigil {
        Sigil::List => Node::list(),
        _ => Node::map(),
    }
}

fn has_shape(node: &Node, sigil: Sigil) -> bool {
    matches!(
        (sigil, node),
        (Sigil::Map, Node::Map(_))
            | (Sigil::List, Node::List(_))
            | (Sigil::Str, Node::Str(_))
            | (Sigil::Num, Node::Num(_))
            | (Sigil::Bool, Node::Bool(_))
    )
}

fn shape_name(sigil: Sigil) -> &'static str {
    match sigil {
        Sigil::Map => "map",
        Sigil::List => "list",
        Sigil::Str => "string",
        Sigil::Num => "number",
        Sigil::Bool => "boolean",
    }
}

fn expect_shape(node: &Node, segment: &Segment, path: &PathExpr) -> StateResult<()> {
    if has_shape(node, segment.sigil) {
        Ok(())
    } else {
        Err(StateError::traversal(
            path,
            segment,
            format!(
                "expected a {} but found a {}",
                shape_name(segment.sigil),
                node.kind()
            ),
        ))
    }
}

fn leaf_value(
    path: &PathExpr,
    leaf: &Segment,
    existing: Option<&Node>,
    value: Option<Node>,
) -> StateResult<Option<Node>> {
    match leaf.sigil {
        Sigil::Map => match (value, existing) {
            (Some(value @ Node::Map(_)), _) => Ok(Some(value)),
            (Some(value), _) => Err(coercion(Sigil::Map, &value)),
            (None, None) => Ok(Some(Node::map())),
            (None, Some(existing)) => {
                expect_shape(existing, leaf, path)?;
                Ok(Some(existing.clone()))
            }
        },
        Sigil::List => match (existing, value) {
            (None, Some(list @ Node::List(_))) => Ok(Some(list)),
            (None, Some(item)) => Ok(Some(Node::from(vec![item]))),
            (None, None) => Ok(Some(Node::list())),
            (Some(Node::List(items)), Some(item)) => {
                let mut items = items.as_ref().clone();
                items.push(item);
                Ok(Some(Node::from(items)))
            }
            (Some(existing), _) => {
                expect_shape(existing, leaf, path)?;
                Ok(Some(existing.clone()))
            }
        },
        scalar => value.map(|value| coerce(scalar, value)).transpose(),
    }
}

fn coercion(sigil: Sigil, value: &Node) -> StateError {
    StateError::Coercion {
        sigil: sigil.as_char(),
        value: value.to_string(),
    }
}

/// Converts `value` to the scalar kind named by `sigil`.
///
/// `?` parses text the lenient way: only a case-insensitive `true` is true.
pub fn coerce(sigil: Sigil, value: Node) -> StateResult<Node> {
    match (sigil, value) {
        (Sigil::Str, value @ Node::Str(_)) => Ok(value),
        (Sigil::Str, Node::Num(n)) => Ok(Node::str(format_num(n))),
        (Sigil::Str, Node::Bool(b)) => Ok(Node::str(b.to_string())),
        (Sigil::Num, value @ Node::Num(_)) => Ok(value),
        (Sigil::Num, Node::Str(s)) => s
            .trim()
            .parse::<f64>()
            .map(Node::Num)
            .map_err(|_| coercion(Sigil::Num, &Node::Str(s))),
        (Sigil::Bool, value @ Node::Bool(_)) => Ok(value),
        (Sigil::Bool, Node::Str(s)) => Ok(Node::Bool(s.trim().eq_ignore_ascii_case("true"))),
        (Sigil::Bool, Node::Num(_)) => Ok(Node::Bool(false)),
        (sigil, value) => Err(coercion(sigil, &value)),
    }
}

/// Renders a store as an indented tree rooted at `ROOT`.
pub struct TreeView<'a> {
    store: &'a Store,
}

impl TreeView<'_> {
    fn write_node(
        f: &mut fmt::Formatter<'_>,
        node: &Node,
        prefix: &str,
        name: &str,
        is_last: bool,
    ) -> fmt::Result {
        let branch = if is_last { "└── " } else { "├── " };
        if node.is_container() {
            writeln!(f, "{prefix}{branch}{name}")?;
        } else {
            writeln!(f, "{prefix}{branch}{name} = {node}")?;
        }

        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
        match node {
            Node::Map(map) => {
                let count = map.len();
                for (i, (key, child)) in map.iter().enumerate() {
                    Self::write_node(f, child, &child_prefix, key, i + 1 == count)?;
                }
            }
            Node::List(list) => {
                let count = list.len();
                for (i, child) in list.iter().enumerate() {
                    Self::write_node(f, child, &child_prefix, &i.to_string(), i + 1 == count)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

impl fmt::Display for TreeView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Self::write_node(f, &self.store.root, "", "ROOT", true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn store(entries: &[(&str, Node)]) -> Store {
        entries
            .iter()
            .fold(Store::new(), |store, (path, value)| {
                store.put(path, value.clone()).unwrap()
            })
    }

    #[test]
    fn writes_and_reads_nested_scalars() {
        let s = store(&[
            ("/objects/ticket.title", Node::str("hello")),
            ("/objects/ticket#estimate", Node::str("10")),
            ("/intent?validated", Node::str("TRUE")),
        ]);
        assert_eq!(s.get("/objects/ticket.title").unwrap(), Some(Node::str("hello")));
        assert_eq!(s.get("/objects/ticket#estimate").unwrap(), Some(Node::Num(10.0)));
        assert_eq!(s.get("/intent?validated").unwrap(), Some(Node::Bool(true)));
        assert_eq!(s.get("/objects/missing.title").unwrap(), None);
    }

    #[test]
    fn reads_never_create_structure() {
        let s = Store::new();
        assert_eq!(s.get("/a/b/c.d").unwrap(), None);
        assert!(s.is_empty());
    }

    #[test]
    fn read_type_mismatch_is_an_error() {
        let s = store(&[("/intent.name", Node::str("createTicket"))]);
        assert!(matches!(
            s.get("/intent#name"),
            Err(StateError::Traversal { .. })
        ));
        assert!(matches!(
            s.get("|intent.name"),
            Err(StateError::Traversal { .. })
        ));
        assert!(matches!(
            s.get("/intent/name.x"),
            Err(StateError::Traversal { .. })
        ));
    }

    #[test]
    fn number_leaf_rejects_non_numeric_text() {
        let err = Store::new().put("/ticket#estimate", Node::str("ten")).unwrap_err();
        assert!(matches!(err, StateError::Coercion { sigil: '#', .. }));
    }

    #[test]
    fn pipe_appends_and_creates_lists() {
        let s = store(&[
            ("|previousIntents", Node::str("a")),
            ("|previousIntents", Node::str("b")),
        ]);
        assert_eq!(
            s.get("|previousIntents").unwrap(),
            Some(Node::from(vec![Node::str("a"), Node::str("b")]))
        );
        assert_eq!(s.get("|previousIntents.1").unwrap(), Some(Node::str("b")));

        let ensured = Store::new().put("|empty", None::<Node>).unwrap();
        assert_eq!(ensured.get("|empty").unwrap(), Some(Node::list()));
    }

    #[test]
    fn list_index_writes_replace_in_place() {
        let s = store(&[
            ("|names", Node::str("a")),
            ("|names", Node::str("b")),
            ("|names", Node::str("c")),
        ]);
        let s = s.put("|names.1", Node::str("B")).unwrap();
        assert_eq!(
            s.get("|names").unwrap(),
            Some(Node::from(vec![Node::str("a"), Node::str("B"), Node::str("c")]))
        );
        let s = s.put("|names.7", Node::str("d")).unwrap();
        assert_eq!(s.get("|names.3").unwrap(), Some(Node::str("d")));
    }

    #[test]
    fn list_index_must_be_an_integer() {
        let s = store(&[("|names", Node::str("a"))]);
        assert!(matches!(
            s.get("|names.first"),
            Err(StateError::Traversal { .. })
        ));
        assert!(matches!(
            s.put("|names.first", Node::str("x")),
            Err(StateError::Traversal { .. })
        ));
    }

    #[test]
    fn maps_inside_lists() {
        let s = store(&[("|tickets/0.title", Node::str("first"))]);
        assert_eq!(s.get("|tickets/0.title").unwrap(), Some(Node::str("first")));
        let s = s.put("|tickets/1.title", Node::str("second")).unwrap();
        assert_eq!(s.get("|tickets").unwrap().unwrap().as_list().unwrap().len(), 2);
    }

    #[test]
    fn slash_replaces_with_map_or_keeps_existing() {
        let s = store(&[("/objects/ticket.title", Node::str("hello"))]);
        let kept = s.put("/objects", None::<Node>).unwrap();
        assert_eq!(kept, s);

        let mut replacement = BTreeMap::new();
        replacement.insert("other".to_string(), Node::str("x"));
        let replaced = s.put("/objects", Node::from(replacement)).unwrap();
        assert_eq!(replaced.get("/objects/ticket").unwrap(), None);
        assert_eq!(replaced.get("/objects.other").unwrap(), Some(Node::str("x")));

        assert!(matches!(
            s.put("/objects", Node::str("flat")),
            Err(StateError::Coercion { sigil: '/', .. })
        ));
    }

    #[test]
    fn writing_none_to_a_scalar_removes_it() {
        let s = store(&[("/prompt.value", Node::str("yes"))]);
        let s = s.put("/prompt.value", None::<Node>).unwrap();
        assert_eq!(s.get("/prompt.value").unwrap(), None);
        assert_eq!(s.get("/prompt").unwrap(), Some(Node::map()));
    }

    #[test]
    fn untouched_siblings_are_shared() {
        let s = store(&[
            ("/objects/ticket.title", Node::str("hello")),
            ("/prompt.question", Node::str("Who?")),
        ]);
        let edited = s.put("/objects/ticket.assignee", Node::str("matt")).unwrap();
        let before = s.raw("prompt").unwrap();
        let after = edited.raw("prompt").unwrap();
        assert!(before.shares_with(after));
        assert!(!s.raw("objects").unwrap().shares_with(edited.raw("objects").unwrap()));
    }

    #[test]
    fn delete_removes_keys_and_indices() {
        let s = store(&[
            ("/prompt.question", Node::str("Who?")),
            ("/prompt.slot", Node::str("utt:/objects/ticket.assignee")),
            ("|previousIntents", Node::str("a")),
            ("|previousIntents", Node::str("b")),
        ]);
        let s = s.remove("|previousIntents.1").unwrap();
        assert_eq!(
            s.get("|previousIntents").unwrap(),
            Some(Node::from(vec![Node::str("a")]))
        );
        let s = s.remove("/prompt").unwrap();
        assert_eq!(s.get("/prompt").unwrap(), None);
    }

    #[test]
    fn delete_below_missing_intermediate_is_a_noop() {
        let s = store(&[("/a.b", Node::str("x"))]);
        let same = s.remove("/missing/deeper.key").unwrap();
        assert!(same.root().shares_with(s.root()));
    }

    #[test]
    fn prints_tree() {
        let s = store(&[
            ("/intent.name", Node::str("createTicket")),
            ("|previousIntents", Node::str("changeTicket")),
        ]);
        assert_eq!(
            s.tree().to_string(),
            "└── ROOT\n    \
             ├── intent\n    \
             │   └── name = createTicket\n    \
             └── previousIntents\n        \
             └── 0 = changeTicket\n"
        );
    }

    fn key() -> impl Strategy<Value = String> {
        prop_oneof![Just("a"), Just("b"), Just("c")].prop_map(str::to_string)
    }

    fn path_and_value() -> impl Strategy<Value = (String, Node)> {
        let inner = prop::collection::vec(key(), 0..4);
        let leaf = prop_oneof![
            any::<String>().prop_map(|s| ('.', Node::str(s))),
            (-1_000_000i64..1_000_000).prop_map(|n| ('#', Node::from(n))),
            any::<bool>().prop_map(|b| ('?', Node::Bool(b))),
            Just(('/', Node::map())),
            prop::collection::vec(any::<bool>().prop_map(Node::Bool), 0..3)
                .prop_map(|items| ('|', Node::from(items))),
        ];
        (inner, key(), leaf).prop_map(|(inner, last, (sigil, value))| {
            let mut path: String = inner.iter().map(|k| format!("/{k}")).collect();
            path.push(sigil);
            path.push_str("leaf_");
            path.push_str(&last);
            (path, value)
        })
    }

    fn seeded_store() -> impl Strategy<Value = Store> {
        prop::collection::vec(path_and_value(), 0..6).prop_map(|writes| {
            writes.into_iter().fold(Store::new(), |store, (path, value)| {
                store.put(&path, value).unwrap_or(store)
            })
        })
    }

    proptest! {
        #[test]
        fn round_trip((path, value) in path_and_value(), base in seeded_store()) {
            let base = base.remove(&path).unwrap_or(base);
            if let Ok(written) = base.put(&path, value.clone()) {
                prop_assert_eq!(written.get(&path).unwrap(), Some(value));
            }
        }

        #[test]
        fn writes_do_not_disturb_other_branches(
            (path, value) in path_and_value(),
            (other, _) in path_and_value(),
            base in seeded_store(),
        ) {
            let first = |p: &str| p.split(['/', '|', '.', '#', '?']).nth(1).map(str::to_string);
            prop_assume!(first(&path) != first(&other));
            if let Ok(written) = base.put(&path, value) {
                prop_assert_eq!(base.get(&other).ok(), written.get(&other).ok());
            }
        }

        #[test]
        fn delete_then_read_is_empty((path, value) in path_and_value(), base in seeded_store()) {
            if let Ok(written) = base.put(&path, value) {
                let deleted = written.remove(&path).unwrap();
                prop_assert_eq!(deleted.get(&path).unwrap(), None);
            }
        }

        #[test]
        fn delete_is_idempotent((path, _) in path_and_value(), base in seeded_store()) {
            if let Ok(once) = base.remove(&path) {
                let twice = once.remove(&path).unwrap();
                prop_assert_eq!(once, twice);
            }
        }
    }
}
