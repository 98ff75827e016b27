//! Choosing the active goal and deciding what it needs next.

use std::fmt;
use std::sync::Arc;

use parley_state::{Command, Scope, Snapshot};

use crate::action::Action;
use crate::bot::Bot;
use crate::error::{EngineError, EngineResult};
use crate::goal::Goal;
use crate::response::Response;
use crate::slots::{
    CONFIRMATION_QUESTION, INTENT_CONFIRMED, INTENT_NAME, INTENT_VALIDATED, PROMPT,
    PROMPT_BOOLEAN, PROMPT_INTENT, PROMPT_QUESTION, PROMPT_SLOT, slot,
};
use crate::validation::Violation;

/// Picks the goal an interpretation is about.
pub trait GoalMatcher: Send + Sync + fmt::Debug {
    /// `Ok(None)` drops the interpretation.
    fn assign(&self, snapshot: &Snapshot, bot: &Bot) -> EngineResult<Option<Arc<Goal>>>;
}

/// Uses the goal named in `utt:/intent.name`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExplicitGoalMatcher;

impl GoalMatcher for ExplicitGoalMatcher {
    fn assign(&self, snapshot: &Snapshot, bot: &Bot) -> EngineResult<Option<Arc<Goal>>> {
        let Some(name) = snapshot.text_at(INTENT_NAME)? else {
            return Ok(None);
        };
        match bot.goal(&name) {
            Some(goal) => Ok(Some(goal)),
            None => Err(EngineError::UnknownGoal { name }),
        }
    }
}

/// Scores a goal against the snapshot and decides what to say.
pub trait GoalResolver: Send + Sync + fmt::Debug {
    fn resolve(&self, goal: &Goal, bot: &Bot, snapshot: &Snapshot) -> EngineResult<Response>;
}

/// Validates the goal's constraints and walks the confirmation steps.
///
/// The score is the share of constraints that hold. While some are violated
/// the first one is asked about. Once all hold the goal either succeeds
/// directly or, when it asks for confirmation, waits for a yes or no in
/// `utt:/intent?confirmed`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ValidatingResolver;

impl GoalResolver for ValidatingResolver {
    fn resolve(&self, goal: &Goal, bot: &Bot, snapshot: &Snapshot) -> EngineResult<Response> {
        let violations = goal.violations(snapshot)?;
        let total = goal.constraints.len();
        let score = if total == 0 {
            1.0
        } else {
            (total - violations.len()) as f64 / total as f64
        };
        tracing::debug!(
            goal = %goal.name,
            violations = violations.len(),
            score,
            "validated goal"
        );
        match violations.first() {
            Some(violation) => prompt_for(goal, violation, snapshot, score),
            None => succeed(goal, bot, snapshot),
        }
    }
}

fn prompt_for(
    goal: &Goal,
    violation: &Violation,
    snapshot: &Snapshot,
    score: f64,
) -> EngineResult<Response> {
    let commands = vec![
        Command::remove(slot(PROMPT)?),
        Command::set(slot(PROMPT_QUESTION)?, violation.prompt.as_str()),
        Command::set(slot(PROMPT_SLOT)?, violation.slot.to_string()),
        Command::set(slot(PROMPT_INTENT)?, goal.name.as_str()),
        Command::set(slot(INTENT_VALIDATED)?, false),
    ];
    Ok(Response::new(violation.prompt.as_str(), snapshot.clone(), score).with_commands(commands))
}

fn succeed(goal: &Goal, bot: &Bot, snapshot: &Snapshot) -> EngineResult<Response> {
    let summary = goal.render_success(snapshot)?;

    if !goal.confirm_on_valid {
        let commands = vec![
            Command::remove(slot(PROMPT)?),
            Command::set(slot(INTENT_VALIDATED)?, true),
        ];
        return Ok(Response::new(summary, snapshot.clone(), 1.0)
            .with_commands(commands)
            .with_actions(success_actions(goal, bot)?));
    }

    let confirmed = snapshot
        .get_at(INTENT_CONFIRMED)?
        .and_then(|node| node.as_bool());
    match confirmed {
        None => {
            let commands = vec![
                Command::remove(slot(PROMPT)?),
                Command::set(slot(PROMPT_QUESTION)?, CONFIRMATION_QUESTION),
                Command::set(slot(PROMPT_SLOT)?, INTENT_CONFIRMED),
                Command::set(slot(PROMPT_BOOLEAN)?, true),
                Command::set(slot(PROMPT_INTENT)?, goal.name.as_str()),
                Command::set(slot(INTENT_VALIDATED)?, false),
            ];
            let spoken = format!("{summary}\n{CONFIRMATION_QUESTION}");
            Ok(Response::new(spoken, snapshot.clone(), 1.0).with_commands(commands))
        }
        Some(false) => {
            let deny = goal
                .deny_goal
                .as_deref()
                .ok_or_else(|| EngineError::MissingProperty {
                    component: format!("goal {}", goal.name),
                    property: "denyGoal".into(),
                })?;
            let deny = bot.require_goal(deny)?;
            let commands = vec![
                Command::switch_goal(Scope::Utterance, deny.name.as_str()),
                Command::set(slot(INTENT_VALIDATED)?, false),
            ];
            let spoken = deny.initial_response_prompt.clone().unwrap_or_default();
            Ok(Response::new(spoken, snapshot.clone(), 1.0).with_commands(commands))
        }
        Some(true) => {
            let commands = vec![
                Command::CompleteGoal,
                Command::set(slot(INTENT_VALIDATED)?, true),
                Command::remove(slot(PROMPT)?),
            ];
            Ok(Response::new("", snapshot.clone(), 1.0)
                .with_commands(commands)
                .with_actions(success_actions(goal, bot)?))
        }
    }
}

fn success_actions(goal: &Goal, bot: &Bot) -> EngineResult<Vec<Arc<dyn Action>>> {
    goal.success_actions
        .iter()
        .map(|name| bot.action(name))
        .collect()
}
