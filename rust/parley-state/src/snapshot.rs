//! The user / conversation / utterance triple read during one utterance.

use crate::command::Command;
use crate::error::StateResult;
use crate::node::Node;
use crate::scope::{Scope, ScopedPath};
use crate::store::Store;

/// An immutable triple of scoped stores.
///
/// Every edit returns a new snapshot in which only the addressed store was
/// replaced; the other two are the same values as before.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    user: Store,
    conversation: Store,
    utterance: Store,
}

impl Snapshot {
    pub fn new(user: Store, conversation: Store, utterance: Store) -> Self {
        Snapshot {
            user,
            conversation,
            utterance,
        }
    }

    pub fn user(&self) -> &Store {
        &self.user
    }

    pub fn conversation(&self) -> &Store {
        &self.conversation
    }

    pub fn utterance(&self) -> &Store {
        &self.utterance
    }

    pub fn store(&self, scope: Scope) -> &Store {
        match scope {
            Scope::User => &self.user,
            Scope::Conversation => &self.conversation,
            Scope::Utterance => &self.utterance,
        }
    }

    /// Returns a snapshot with the store for `scope` replaced.
    pub fn with_store(&self, scope: Scope, store: Store) -> Snapshot {
        let mut next = self.clone();
        match scope {
            Scope::User => next.user = store,
            Scope::Conversation => next.conversation = store,
            Scope::Utterance => next.utterance = store,
        }
        next
    }

    /// Splits the snapshot back into `(user, conversation, utterance)`.
    pub fn into_stores(self) -> (Store, Store, Store) {
        (self.user, self.conversation, self.utterance)
    }

    pub fn get(&self, path: &ScopedPath) -> StateResult<Option<Node>> {
        self.store(path.scope).read(&path.path)
    }

    /// Reads `path`, falling back to `default` when nothing is stored there.
    pub fn get_or(&self, path: &ScopedPath, default: Node) -> StateResult<Node> {
        Ok(self.get(path)?.unwrap_or(default))
    }

    pub fn put(&self, path: &ScopedPath, value: impl Into<Option<Node>>) -> StateResult<Snapshot> {
        let store = self.store(path.scope).write(&path.path, value.into())?;
        Ok(self.with_store(path.scope, store))
    }

    pub fn remove(&self, path: &ScopedPath) -> StateResult<Snapshot> {
        let store = self.store(path.scope).delete(&path.path)?;
        Ok(self.with_store(path.scope, store))
    }

    /// Parses `scoped` (e.g. `utt:/intent.name`) and reads it.
    pub fn get_at(&self, scoped: &str) -> StateResult<Option<Node>> {
        self.get(&ScopedPath::parse(scoped)?)
    }

    /// Reads `scoped` and returns the display text of whatever is there.
    pub fn text_at(&self, scoped: &str) -> StateResult<Option<String>> {
        Ok(self.get_at(scoped)?.map(|node| node.to_string()))
    }

    /// Parses `scoped` and writes `value` at it.
    pub fn put_at(&self, scoped: &str, value: impl Into<Option<Node>>) -> StateResult<Snapshot> {
        self.put(&ScopedPath::parse(scoped)?, value)
    }

    /// Parses `scoped` and removes it.
    pub fn remove_at(&self, scoped: &str) -> StateResult<Snapshot> {
        self.remove(&ScopedPath::parse(scoped)?)
    }

    /// Folds `commands` into the snapshot left to right, running each
    /// command's pre-hook, the command itself, then its post-hook.
    pub fn update(&self, commands: &[Command]) -> StateResult<Snapshot> {
        commands.iter().try_fold(self.clone(), |snapshot, command| {
            tracing::trace!(command = %command, "applying command");
            let snapshot = command.pre(&snapshot)?;
            let snapshot = command.apply(&snapshot)?;
            command.post(&snapshot)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StateError;
    use pretty_assertions::assert_eq;

    #[test]
    fn dispatches_to_the_addressed_store() {
        let snapshot = Snapshot::default()
            .put_at("conv:/prompt.question", Node::str("Who?"))
            .unwrap();
        assert_eq!(
            snapshot.get_at("conv:/prompt.question").unwrap(),
            Some(Node::str("Who?"))
        );
        assert_eq!(snapshot.get_at("utt:/prompt.question").unwrap(), None);
        assert!(snapshot.user().is_empty());
        assert!(snapshot.utterance().is_empty());
    }

    #[test]
    fn unaffected_stores_are_reused() {
        let before = Snapshot::default()
            .put_at("user:/profile.name", Node::str("ana"))
            .unwrap();
        let after = before.put_at("utt:/intent.name", Node::str("x")).unwrap();
        assert!(before.user().root().shares_with(after.user().root()));
    }

    #[test]
    fn get_or_falls_back() {
        let snapshot = Snapshot::default();
        let path = ScopedPath::parse("utt:/intent?confirmed").unwrap();
        assert_eq!(snapshot.get_or(&path, Node::Bool(false)).unwrap(), Node::Bool(false));
    }

    #[test]
    fn unknown_scope_is_an_error() {
        assert!(matches!(
            Snapshot::default().get_at("session:/x"),
            Err(StateError::UnknownScope { .. })
        ));
    }

    #[test]
    fn update_folds_in_order() {
        let commands = crate::command::parse_commands(
            "utt:/objects/ticket.title -> hello; \
             conv:/partials -> {utt:/objects}; \
             -! utt:/objects/ticket.title",
        )
        .unwrap();
        let snapshot = Snapshot::default().update(&commands).unwrap();
        assert_eq!(snapshot.get_at("utt:/objects/ticket.title").unwrap(), None);
        assert_eq!(
            snapshot.get_at("conv:/partials/ticket.title").unwrap(),
            Some(Node::str("hello"))
        );
    }
}
