//! Filling the slot a pending prompt asked about.

use std::fmt;

use parley_state::{Node, Snapshot};

use crate::error::EngineResult;
use crate::slots::{UTT_PROMPT_BOOLEAN, UTT_PROMPT_SLOT, UTT_PROMPT_VALUE, flag, slot};

/// Applies an answer to the question asked on the previous turn.
pub trait PromptHandler: Send + Sync + fmt::Debug {
    fn handle(&self, snapshot: &Snapshot) -> EngineResult<Snapshot>;
}

/// Copies `utt:/prompt.value` into the slot named by `utt:/prompt.slot`.
///
/// When `utt:/prompt?boolean` is set the answer is read as yes or no first;
/// answers that are neither leave the slot alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultPromptHandler;

const TRUE_WORDS: &[&str] = &["yes", "sure", "ok", "true", "y", "okay", "yup", "yeah", "ya"];
const FALSE_WORDS: &[&str] = &["false", "no", "nay", "not", "never", "no way", "negatory"];

pub fn booleanize(answer: &str) -> Option<bool> {
    let answer = answer.trim();
    if TRUE_WORDS.contains(&answer) {
        Some(true)
    } else if FALSE_WORDS.contains(&answer) {
        Some(false)
    } else {
        None
    }
}

impl PromptHandler for DefaultPromptHandler {
    fn handle(&self, snapshot: &Snapshot) -> EngineResult<Snapshot> {
        let Some(answer) = snapshot.text_at(UTT_PROMPT_VALUE)? else {
            return Ok(snapshot.clone());
        };
        let Some(target) = snapshot.text_at(UTT_PROMPT_SLOT)? else {
            return Ok(snapshot.clone());
        };
        let value = if flag(snapshot, UTT_PROMPT_BOOLEAN)? {
            match booleanize(&answer) {
                Some(yes) => Node::Bool(yes),
                None => {
                    tracing::debug!(answer = %answer, "answer is neither yes nor no");
                    return Ok(snapshot.clone());
                }
            }
        } else {
            Node::str(&answer)
        };
        tracing::debug!(slot = %target, value = %value, "filling prompted slot");
        Ok(snapshot.put(&slot(&target)?, value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn prompted(slot: &str, value: &str, boolean: bool) -> Snapshot {
        Snapshot::default()
            .put_at(UTT_PROMPT_SLOT, Node::str(slot))
            .unwrap()
            .put_at(UTT_PROMPT_VALUE, Node::str(value))
            .unwrap()
            .put_at(UTT_PROMPT_BOOLEAN, Node::Bool(boolean))
            .unwrap()
    }

    #[test]
    fn fills_the_prompted_slot() {
        let snapshot = prompted("utt:/objects/ticket.title", "hello", false);
        let handled = DefaultPromptHandler.handle(&snapshot).unwrap();
        assert_eq!(
            handled.get_at("utt:/objects/ticket.title").unwrap(),
            Some(Node::str("hello"))
        );
    }

    #[test]
    fn accepts_dollar_prefixed_slots() {
        let snapshot = prompted("$utt:/objects/ticket.title", "hello", false);
        let handled = DefaultPromptHandler.handle(&snapshot).unwrap();
        assert_eq!(
            handled.text_at("utt:/objects/ticket.title").unwrap().as_deref(),
            Some("hello")
        );
    }

    #[test]
    fn booleanizes_confirmations() {
        for (answer, expected) in [("yup", true), ("no way", false), ("no", false)] {
            let snapshot = prompted("utt:/intent?confirmed", answer, true);
            let handled = DefaultPromptHandler.handle(&snapshot).unwrap();
            assert_eq!(
                handled.get_at("utt:/intent?confirmed").unwrap(),
                Some(Node::Bool(expected)),
                "{answer}"
            );
        }
    }

    #[test]
    fn unclear_confirmations_leave_the_slot_empty() {
        let snapshot = prompted("utt:/intent?confirmed", "maybe later", true);
        let handled = DefaultPromptHandler.handle(&snapshot).unwrap();
        assert_eq!(handled.get_at("utt:/intent?confirmed").unwrap(), None);
    }

    #[test]
    fn nothing_happens_without_an_answer() {
        let snapshot = Snapshot::default()
            .put_at(UTT_PROMPT_SLOT, Node::str("utt:/objects/ticket.title"))
            .unwrap();
        assert_eq!(DefaultPromptHandler.handle(&snapshot).unwrap(), snapshot);
    }
}
