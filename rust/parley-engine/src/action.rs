//! Business actions and the processors that run them.

use std::fmt;

use parley_state::{Command, Node, Snapshot};

use crate::bot::Bot;
use crate::error::EngineResult;
use crate::slots::{ACTION_SPOKEN, INTENT_NAME, INTENT_VALIDATED, OBJECTS, flag, slot};

/// A side effect run once a goal is satisfied.
///
/// Actions report back through state: they return commands, and text they
/// want spoken goes into `utt:/action.spoken`.
pub trait Action: Send + Sync + fmt::Debug {
    fn act(&self, snapshot: &Snapshot, bot: &Bot) -> EngineResult<Vec<Command>>;
}

/// The state after an action ran, and what it said.
#[derive(Debug, Clone)]
pub struct ActionResponse {
    pub spoken: Option<String>,
    pub snapshot: Snapshot,
}

/// Runs actions against a snapshot.
pub trait ActionProcessor: Send + Sync + fmt::Debug {
    fn process(&self, action: &dyn Action, snapshot: &Snapshot, bot: &Bot)
    -> EngineResult<ActionResponse>;
}

fn run(action: &dyn Action, snapshot: &Snapshot, bot: &Bot) -> EngineResult<Snapshot> {
    let snapshot = snapshot.remove_at(ACTION_SPOKEN)?;
    let commands = action.act(&snapshot, bot)?;
    tracing::debug!(action = ?action, commands = commands.len(), "action ran");
    Ok(snapshot.update(&commands)?)
}

/// Applies the action's commands and nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainProcessor;

impl ActionProcessor for PlainProcessor {
    fn process(
        &self,
        action: &dyn Action,
        snapshot: &Snapshot,
        bot: &Bot,
    ) -> EngineResult<ActionResponse> {
        let snapshot = run(action, snapshot, bot)?;
        Ok(ActionResponse {
            spoken: snapshot.text_at(ACTION_SPOKEN)?,
            snapshot,
        })
    }
}

/// Re-resolves the active goal when an action changed it.
///
/// The new goal's resolver response is spoken after the action's own text
/// and its actions run in turn. Once the active goal is validated the
/// object slots it owns are cleared.
#[derive(Debug, Default, Clone, Copy)]
pub struct RevalidatingProcessor;

impl ActionProcessor for RevalidatingProcessor {
    fn process(
        &self,
        action: &dyn Action,
        snapshot: &Snapshot,
        bot: &Bot,
    ) -> EngineResult<ActionResponse> {
        let before = snapshot.text_at(INTENT_NAME)?;
        let mut snapshot = run(action, snapshot, bot)?;
        let after = snapshot.text_at(INTENT_NAME)?;

        if let (Some(before), Some(after)) = (&before, &after) {
            if before != after {
                tracing::debug!(from = %before, to = %after, "goal changed by action");
                snapshot = self.revalidate(after, snapshot, bot)?;
            }
        }

        if flag(&snapshot, INTENT_VALIDATED)? {
            if let Some(goal) = after.as_deref().and_then(|name| bot.goal(name)) {
                let objects = slot(OBJECTS)?;
                for owned in &goal.object_slots {
                    snapshot = snapshot.remove(&objects.join(owned)?)?;
                }
            }
        }

        Ok(ActionResponse {
            spoken: snapshot.text_at(ACTION_SPOKEN)?,
            snapshot,
        })
    }
}

impl RevalidatingProcessor {
    fn revalidate(&self, goal: &str, snapshot: Snapshot, bot: &Bot) -> EngineResult<Snapshot> {
        let goal = bot.require_goal(goal)?;
        let resolver = bot.workflow()?.goal_resolver();
        let response = resolver.resolve(&goal, bot, &snapshot)?;

        let mut snapshot = response.snapshot.update(&response.commands)?;
        let mut spoken = snapshot.text_at(ACTION_SPOKEN)?.unwrap_or_default();
        if !response.spoken.is_empty() {
            spoken.push('\n');
            spoken.push_str(&response.spoken);
        }

        let processor = bot.action_processor();
        for nested in &response.actions {
            let outcome = processor.process(nested.as_ref(), &snapshot, bot)?;
            snapshot = outcome.snapshot;
            if let Some(text) = outcome.spoken {
                spoken.push('\n');
                spoken.push_str(&text);
            }
        }
        Ok(snapshot.put_at(ACTION_SPOKEN, Node::str(spoken))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{self, Record};
    use pretty_assertions::assert_eq;

    #[derive(Debug)]
    struct Finish;

    impl Action for Finish {
        fn act(&self, _snapshot: &Snapshot, _bot: &Bot) -> EngineResult<Vec<Command>> {
            Ok(vec![Command::CompleteGoal])
        }
    }

    fn interrupted() -> Snapshot {
        Snapshot::default()
            .put_at("conv:|previousIntents", Node::str("createTicket"))
            .unwrap()
            .put_at("utt:/intent.name", Node::str("changeTicket"))
            .unwrap()
            .put_at("utt:/objects/ticket.title", Node::str("hello"))
            .unwrap()
            .put_at("utt:/objects/ticket.assignee", Node::str("matt"))
            .unwrap()
    }

    #[test_log::test]
    fn plain_processor_reports_the_action_text() {
        let bot = fixture::ticket_bot();
        let outcome = PlainProcessor.process(&Record, &interrupted(), &bot).unwrap();
        assert_eq!(outcome.spoken.as_deref(), Some("Recorded hello"));
    }

    #[test_log::test]
    fn plain_processor_does_not_revalidate() {
        let bot = fixture::ticket_bot();
        let outcome = PlainProcessor.process(&Finish, &interrupted(), &bot).unwrap();
        assert_eq!(outcome.spoken, None);
        assert_eq!(
            outcome.snapshot.text_at("utt:/intent.name").unwrap().as_deref(),
            Some("createTicket")
        );
    }

    #[test_log::test]
    fn revalidates_the_goal_an_action_returns_to() {
        let bot = fixture::ticket_bot();
        let outcome = RevalidatingProcessor.process(&Finish, &interrupted(), &bot).unwrap();
        assert_eq!(
            outcome.spoken.as_deref(),
            Some("\nTicket hello for matt.\nIs that okay?")
        );
        assert_eq!(
            outcome.snapshot.text_at("conv:/prompt.slot").unwrap().as_deref(),
            Some("utt:/intent?confirmed")
        );
    }

    #[test_log::test]
    fn validated_goals_release_their_objects() {
        let bot = fixture::ticket_bot();
        let snapshot = interrupted()
            .put_at("utt:/intent.name", Node::str("createTicket"))
            .unwrap()
            .put_at("utt:/intent?validated", Node::Bool(true))
            .unwrap();
        let outcome = RevalidatingProcessor.process(&Record, &snapshot, &bot).unwrap();
        assert_eq!(outcome.spoken.as_deref(), Some("Recorded hello"));
        assert_eq!(outcome.snapshot.get_at("utt:/objects/ticket").unwrap(), None);
    }
}
