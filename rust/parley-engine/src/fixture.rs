//! A small ticket bot shared by the unit tests.

use std::sync::Arc;

use parley_lookup::{Dictionary, Gazetteer, Matcher};
use parley_state::{Command, Node, PathExpr, ScopedPath, Snapshot};

use crate::action::Action;
use crate::bot::Bot;
use crate::error::EngineResult;
use crate::goal::Goal;
use crate::preprocess::EntityExtractor;
use crate::slots::{ACTION_SPOKEN, slot};
use crate::validation::{Constraint, NotNull};
use crate::workflow::Workflow;

pub const ROWS: &str = "\
* open a ticket,utt:/intent.name -> createTicket
open a ticket called *,utt:/intent.name -> createTicket; utt:/objects/ticket.title -> WC_0
*,utt:/prompt.value -> WC_0
EMP_MKR,utt:/prompt.value -> EMP_MKR_0
";

/// Speaks `Recorded <title>`.
#[derive(Debug)]
pub struct Record;

impl Action for Record {
    fn act(&self, snapshot: &Snapshot, _bot: &Bot) -> EngineResult<Vec<Command>> {
        let title = snapshot
            .text_at("utt:/objects/ticket.title")?
            .unwrap_or_default();
        Ok(vec![Command::set(
            slot(ACTION_SPOKEN)?,
            Node::str(format!("Recorded {title}")),
        )])
    }
}

fn scoped(text: &str) -> ScopedPath {
    ScopedPath::parse(text).unwrap()
}

pub fn create_ticket() -> Goal {
    Goal {
        constraints: vec![
            Constraint::new(
                scoped("utt:/objects/ticket.title"),
                "What should we call this ticket?",
                Arc::new(NotNull),
            ),
            Constraint::new(
                scoped("utt:/objects/ticket.assignee"),
                "Who should we assign this ticket to?",
                Arc::new(NotNull),
            ),
        ],
        success_template: vec![
            "Ticket <utt:/objects/ticket.title> ".into(),
            "for <utt:/objects/ticket.assignee>.".into(),
        ],
        success_actions: vec!["record".into()],
        confirm_on_valid: true,
        deny_goal: Some("changeTicket".into()),
        object_slots: vec![PathExpr::parse("/ticket").unwrap()],
        ..Goal::new("createTicket")
    }
}

pub fn change_ticket() -> Goal {
    Goal {
        initial_response_prompt: Some("What would you like to change?".into()),
        ..Goal::new("changeTicket")
    }
}

pub fn ticket_bot() -> Bot {
    let matcher = Matcher::new(Dictionary::from_rows(ROWS).unwrap());
    let employees = EntityExtractor::new("EMP", Gazetteer::from_terms("matt\nsteve\n"));
    Bot::new("tickets", matcher)
        .with_workflow(Workflow::new("default").with_utterance_processor(Arc::new(employees)))
        .with_action("record", Arc::new(Record))
        .with_goal(create_ticket())
        .with_goal(change_ticket())
}
