//! Typed state-change commands and their textual forms.
//!
//! A command renders either as `scope:path -> value` or as `-! scope:path`.
//! A value wrapped in braces, `{scope:path}`, is fetched from the snapshot at
//! the moment the command is applied. Two commands carry hooks that maintain
//! a goal history in the conversation store:
//!
//! * `SwitchGoal` remembers the goal it replaces and pushes it onto
//!   `conv:|previousIntents`;
//! * `CompleteGoal` pops the most recent entry back into `utt:/intent.name`.

use std::fmt;

use crate::error::{StateError, StateResult};
use crate::node::Node;
use crate::path::PathExpr;
use crate::scope::{Scope, ScopedPath};
use crate::snapshot::Snapshot;

/// Active goal name, relative to a scope root.
pub const INTENT_NAME: &str = "/intent.name";
/// Goal history kept by the conversation.
pub const PREVIOUS_INTENTS: &str = "conv:|previousIntents";
/// Transient slot holding the goal a `SwitchGoal` is replacing.
pub const PREVIOUS_INTENT: &str = "utt:.previousIntent";
/// Transient slot holding the goal a `CompleteGoal` is returning to.
pub const NEXT_INTENT: &str = "utt:.nextIntent";

/// A dynamic placeholder inside a dictionary payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Marker {
    /// `WC_<n>`: the n-th wildcard consumed by a match.
    Wildcard(usize),
    /// `<ALIAS>_MKR_<n>`: the n-th entity with that alias.
    Entity { alias: String, index: usize },
}

impl Marker {
    /// Recognizes `WC_<n>` and `<ALIAS>_MKR_<n>`.
    pub fn parse(text: &str) -> Option<Marker> {
        if let Some(index) = text.strip_prefix("WC_") {
            return index.parse().ok().map(Marker::Wildcard);
        }
        let (alias, index) = text.rsplit_once("_MKR_")?;
        if alias.is_empty() {
            return None;
        }
        Some(Marker::Entity {
            alias: alias.to_string(),
            index: index.parse().ok()?,
        })
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Marker::Wildcard(index) => write!(f, "WC_{index}"),
            Marker::Entity { alias, index } => write!(f, "{alias}_MKR_{index}"),
        }
    }
}

/// The right-hand side of a set command.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotValue {
    Literal(Node),
    /// Resolved by the matcher before the command is applied.
    Marker(Marker),
    /// Copies whatever is stored at the path when the command runs.
    Fetch(ScopedPath),
}

impl SlotValue {
    fn parse(text: &str) -> StateResult<SlotValue> {
        if let Some(inner) = text.strip_prefix('{').and_then(|t| t.strip_suffix('}')) {
            return Ok(SlotValue::Fetch(ScopedPath::parse(inner)?));
        }
        Ok(match Marker::parse(text) {
            Some(marker) => SlotValue::Marker(marker),
            None => SlotValue::Literal(Node::str(text)),
        })
    }
}

impl fmt::Display for SlotValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotValue::Literal(node) => write!(f, "{node}"),
            SlotValue::Marker(marker) => write!(f, "{marker}"),
            SlotValue::Fetch(path) => write!(f, "{{{path}}}"),
        }
    }
}

/// A state-change operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Set { target: ScopedPath, value: SlotValue },
    Remove { target: ScopedPath },
    SwitchGoal { scope: Scope, goal: String },
    CompleteGoal,
}

fn scoped(text: &str) -> StateResult<ScopedPath> {
    ScopedPath::parse(text)
}

fn intent_name(scope: Scope) -> StateResult<ScopedPath> {
    Ok(ScopedPath::new(scope, PathExpr::parse(INTENT_NAME)?))
}

impl Command {
    pub fn set(target: ScopedPath, value: impl Into<Node>) -> Command {
        Command::Set {
            target,
            value: SlotValue::Literal(value.into()),
        }
    }

    pub fn fetch(target: ScopedPath, source: ScopedPath) -> Command {
        Command::Set {
            target,
            value: SlotValue::Fetch(source),
        }
    }

    pub fn remove(target: ScopedPath) -> Command {
        Command::Remove { target }
    }

    pub fn switch_goal(scope: Scope, goal: impl Into<String>) -> Command {
        Command::SwitchGoal {
            scope,
            goal: goal.into(),
        }
    }

    /// Parses one command in either textual form.
    ///
    /// A set whose target is `<scope>:/intent.name` with a literal value
    /// becomes a [`Command::SwitchGoal`].
    pub fn parse(text: &str) -> StateResult<Command> {
        let text = text.trim();
        if let Some(target) = text.strip_prefix("-!") {
            return Ok(Command::Remove {
                target: scoped(target)?,
            });
        }
        let Some((lhs, rhs)) = text.split_once("->") else {
            return Err(StateError::command(text, "expected `->` or a leading `-!`"));
        };
        let target = scoped(lhs)?;
        let value = SlotValue::parse(rhs.trim())?;
        match value {
            SlotValue::Literal(Node::Str(goal)) if target.path.to_string() == INTENT_NAME => {
                Ok(Command::SwitchGoal {
                    scope: target.scope,
                    goal: goal.to_string(),
                })
            }
            value => Ok(Command::Set { target, value }),
        }
    }

    /// The textual form, or `None` for commands that only run hooks.
    pub fn render(&self) -> Option<String> {
        match self {
            Command::Set { target, value } => Some(format!("{target} -> {value}")),
            Command::Remove { target } => Some(format!("-! {target}")),
            Command::SwitchGoal { scope, goal } => Some(format!("{scope}:{INTENT_NAME} -> {goal}")),
            Command::CompleteGoal => None,
        }
    }

    /// Runs before the command is applied.
    pub fn pre(&self, snapshot: &Snapshot) -> StateResult<Snapshot> {
        match self {
            Command::SwitchGoal { goal, .. } => {
                let previous = scoped(PREVIOUS_INTENT)?;
                let snapshot = snapshot.remove(&previous)?;
                match snapshot.get(&intent_name(Scope::Utterance)?)? {
                    Some(Node::Str(current)) if current.as_ref() != goal.as_str() => {
                        snapshot.put(&previous, Node::Str(current))
                    }
                    _ => Ok(snapshot),
                }
            }
            Command::CompleteGoal => {
                let next = scoped(NEXT_INTENT)?;
                let snapshot = snapshot.remove(&next)?;
                let last = snapshot
                    .get(&scoped(PREVIOUS_INTENTS)?)?
                    .and_then(|history| history.as_list().and_then(|l| l.last().cloned()));
                match last {
                    Some(goal) => snapshot.put(&next, goal),
                    None => Ok(snapshot),
                }
            }
            _ => Ok(snapshot.clone()),
        }
    }

    /// Applies the command itself.
    pub fn apply(&self, snapshot: &Snapshot) -> StateResult<Snapshot> {
        match self {
            Command::Set { target, value } => {
                let value = match value {
                    SlotValue::Literal(node) => Some(node.clone()),
                    SlotValue::Fetch(source) => snapshot.get(source)?,
                    SlotValue::Marker(marker) => {
                        return Err(StateError::UnresolvedMarker {
                            placeholder: marker.to_string(),
                        });
                    }
                };
                snapshot.put(target, value)
            }
            Command::Remove { target } => snapshot.remove(target),
            Command::SwitchGoal { scope, goal } => {
                snapshot.put(&intent_name(*scope)?, Node::str(goal))
            }
            Command::CompleteGoal => Ok(snapshot.clone()),
        }
    }

    /// Runs after the command is applied.
    pub fn post(&self, snapshot: &Snapshot) -> StateResult<Snapshot> {
        match self {
            Command::SwitchGoal { .. } => {
                let previous = scoped(PREVIOUS_INTENT)?;
                match snapshot.get(&previous)? {
                    Some(goal) => snapshot
                        .put(&scoped(PREVIOUS_INTENTS)?, goal)?
                        .remove(&previous),
                    None => Ok(snapshot.clone()),
                }
            }
            Command::CompleteGoal => {
                let next = scoped(NEXT_INTENT)?;
                let Some(goal) = snapshot.get(&next)? else {
                    return Ok(snapshot.clone());
                };
                let history = scoped(PREVIOUS_INTENTS)?;
                let depth = snapshot
                    .get(&history)?
                    .and_then(|h| h.as_list().map(|l| l.len()))
                    .unwrap_or(0);
                let mut snapshot = snapshot.put(&intent_name(Scope::Utterance)?, goal)?;
                if depth > 0 {
                    snapshot = snapshot.remove_at(&format!("{PREVIOUS_INTENTS}.{}", depth - 1))?;
                }
                snapshot.remove(&next)
            }
            _ => Ok(snapshot.clone()),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.render() {
            Some(text) => f.write_str(&text),
            None => f.write_str("(complete goal)"),
        }
    }
}

/// Parses a `;`-separated command string, skipping empty clauses.
pub fn parse_commands(text: &str) -> StateResult<Vec<Command>> {
    text.split(';')
        .map(str::trim)
        .filter(|clause| !clause.is_empty())
        .map(Command::parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn intent(snapshot: &Snapshot) -> Option<Node> {
        snapshot.get_at("utt:/intent.name").unwrap()
    }

    #[test]
    fn parses_both_forms() {
        let commands = parse_commands(
            "utt:/intent.name -> createTicket; \
             utt:/objects/ticket.assignee -> EMP_MKR_0; \
             utt:/objects/ticket.title -> WC_1; \
             conv:/partials -> {utt:/objects}; \
             -! conv:/prompt;",
        )
        .unwrap();
        assert_eq!(commands.len(), 5);
        assert_eq!(commands[0], Command::switch_goal(Scope::Utterance, "createTicket"));
        assert!(matches!(
            &commands[1],
            Command::Set { value: SlotValue::Marker(Marker::Entity { alias, index: 0 }), .. } if alias == "EMP"
        ));
        assert!(matches!(
            &commands[2],
            Command::Set { value: SlotValue::Marker(Marker::Wildcard(1)), .. }
        ));
        assert!(matches!(&commands[3], Command::Set { value: SlotValue::Fetch(_), .. }));
        assert!(matches!(&commands[4], Command::Remove { .. }));
    }

    #[test]
    fn renders_textual_forms() {
        let target = ScopedPath::parse("utt:/objects/ticket.title").unwrap();
        assert_eq!(
            Command::set(target.clone(), "hello").render().unwrap(),
            "utt:/objects/ticket.title -> hello"
        );
        assert_eq!(
            Command::fetch(
                ScopedPath::parse("conv:/partials").unwrap(),
                ScopedPath::parse("utt:/objects").unwrap()
            )
            .render()
            .unwrap(),
            "conv:/partials -> {utt:/objects}"
        );
        assert_eq!(Command::remove(target).render().unwrap(), "-! utt:/objects/ticket.title");
        assert_eq!(Command::CompleteGoal.render(), None);
    }

    #[test]
    fn missing_arrow_is_an_error() {
        assert!(matches!(
            Command::parse("utt:/objects/ticket.title hello"),
            Err(StateError::Command { .. })
        ));
    }

    #[test]
    fn applying_an_unresolved_marker_fails() {
        let command = Command::parse("utt:/objects/ticket.title -> WC_0").unwrap();
        assert!(matches!(
            Snapshot::default().update(&[command]),
            Err(StateError::UnresolvedMarker { .. })
        ));
    }

    #[test]
    fn goal_history_round_trip() {
        let snapshot = Snapshot::default()
            .update(&[
                Command::switch_goal(Scope::Utterance, "A"),
                Command::switch_goal(Scope::Utterance, "B"),
            ])
            .unwrap();
        assert_eq!(intent(&snapshot), Some(Node::str("B")));
        assert_eq!(
            snapshot.get_at(PREVIOUS_INTENTS).unwrap(),
            Some(Node::from(vec![Node::str("A")]))
        );
        assert_eq!(snapshot.get_at(PREVIOUS_INTENT).unwrap(), None);

        let snapshot = snapshot.update(&[Command::CompleteGoal]).unwrap();
        assert_eq!(intent(&snapshot), Some(Node::str("A")));
        assert_eq!(snapshot.get_at(PREVIOUS_INTENTS).unwrap(), Some(Node::list()));
        assert_eq!(snapshot.get_at(NEXT_INTENT).unwrap(), None);

        let snapshot = snapshot.update(&[Command::CompleteGoal]).unwrap();
        assert_eq!(intent(&snapshot), Some(Node::str("A")));
    }

    #[test]
    fn switching_to_the_active_goal_keeps_history() {
        let snapshot = Snapshot::default()
            .update(&[
                Command::switch_goal(Scope::Utterance, "A"),
                Command::switch_goal(Scope::Utterance, "A"),
            ])
            .unwrap();
        assert_eq!(snapshot.get_at(PREVIOUS_INTENTS).unwrap(), None);
    }

    proptest! {
        #[test]
        fn complete_goal_unwinds_switches(goals in prop::collection::vec("[a-e]", 1..6)) {
            let switches: Vec<Command> = goals
                .iter()
                .map(|goal| Command::switch_goal(Scope::Utterance, goal.clone()))
                .collect();
            let snapshot = Snapshot::default().update(&switches).unwrap();

            let mut expected: Vec<String> = Vec::new();
            for goal in &goals {
                if let Some(last) = expected.last() {
                    if last == goal {
                        continue;
                    }
                }
                expected.push(goal.clone());
            }

            let mut snapshot = snapshot;
            while expected.len() > 1 {
                expected.pop();
                snapshot = snapshot.update(&[Command::CompleteGoal]).unwrap();
                prop_assert_eq!(intent(&snapshot), expected.last().map(Node::str));
            }
        }
    }
}
