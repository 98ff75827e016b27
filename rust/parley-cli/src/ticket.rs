//! Demo actions for a ticket tracker.

use std::sync::atomic::{AtomicU32, Ordering};

use parley_engine::{Action, Bot, EngineResult, slots};
use parley_state::{Command, ScopedPath, Snapshot};

/// Files a ticket and reports its number.
#[derive(Debug, Default)]
pub struct CreateTicket {
    issued: AtomicU32,
}

impl CreateTicket {
    pub fn new() -> Self {
        CreateTicket::default()
    }
}

impl Action for CreateTicket {
    fn act(&self, _snapshot: &Snapshot, _bot: &Bot) -> EngineResult<Vec<Command>> {
        let number = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let id = format!("ABC-{number:03}");
        tracing::info!(ticket = %id, "created ticket");
        Ok(vec![
            Command::set(slots::slot("utt:/objects/ticket.number")?, id.as_str()),
            Command::set(
                slots::slot(slots::ACTION_SPOKEN)?,
                format!("Created ticket {id} in JIRA"),
            ),
        ])
    }
}

/// Goal whose constraints vet a changed value.
pub const TICKET_GOAL: &str = "createTicket";
/// Slot naming the ticket slot being changed.
pub const CHANGED_PROPERTY: &str = "utt:/objects/changeTicket.property";
/// The new value for it.
pub const CHANGED_VALUE: &str = "utt:/objects/changeTicket.value";

/// Changes one slot of the ticket being created, then returns to the
/// interrupted goal.
///
/// The new value must satisfy the ticket goal's constraints on that slot;
/// otherwise their error messages are spoken and nothing changes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChangeTicket;

impl Action for ChangeTicket {
    fn act(&self, snapshot: &Snapshot, bot: &Bot) -> EngineResult<Vec<Command>> {
        let Some(property) = snapshot.text_at(CHANGED_PROPERTY)? else {
            return Ok(Vec::new());
        };
        let property = ScopedPath::parse(&property)?;
        let value = snapshot.get_at(CHANGED_VALUE)?;

        let ticket = bot.require_goal(TICKET_GOAL)?;
        let errors: Vec<String> = ticket
            .constraints_for(&property)
            .filter_map(|constraint| constraint.check_value(value.as_ref()))
            .map(|violation| violation.message.unwrap_or(violation.prompt))
            .collect();
        if !errors.is_empty() {
            return Ok(vec![Command::set(
                slots::slot(slots::ACTION_SPOKEN)?,
                errors.join(" "),
            )]);
        }

        let Some(value) = value else {
            return Ok(Vec::new());
        };
        Ok(vec![Command::set(property, value), Command::CompleteGoal])
    }
}
