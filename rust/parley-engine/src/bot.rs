//! A bot: one dictionary, its goals and actions, and the workflows that
//! answer with them.

use std::collections::HashMap;
use std::sync::Arc;

use parley_lookup::{Matcher, Utterance};
use parley_state::{Command, Snapshot, Store};

use crate::action::{Action, ActionProcessor, RevalidatingProcessor};
use crate::error::{EngineError, EngineResult};
use crate::goal::Goal;
use crate::slots::{
    CONV_INTENT, CONV_INTENT_NAME, INTENT, INTENT_NAME, OBJECTS, PARTIALS, PROMPT, UTT_PROMPT,
    slot,
};
use crate::workflow::Workflow;

#[derive(Debug)]
pub struct Bot {
    name: String,
    matcher: Matcher,
    workflows: Vec<Workflow>,
    action_processors: Vec<Arc<dyn ActionProcessor>>,
    actions: HashMap<String, Arc<dyn Action>>,
    goals: HashMap<String, Arc<Goal>>,
}

/// The outcome of one utterance: the reply and the stores to keep.
#[derive(Debug, Clone)]
pub struct Turn {
    pub reply: String,
    pub user: Store,
    pub conversation: Store,
}

impl Bot {
    pub fn new(name: impl Into<String>, matcher: Matcher) -> Self {
        Bot {
            name: name.into(),
            matcher,
            workflows: Vec::new(),
            action_processors: Vec::new(),
            actions: HashMap::new(),
            goals: HashMap::new(),
        }
    }

    pub fn with_workflow(mut self, workflow: Workflow) -> Self {
        self.workflows.push(workflow);
        self
    }

    pub fn with_action_processor(mut self, processor: Arc<dyn ActionProcessor>) -> Self {
        self.action_processors.push(processor);
        self
    }

    pub fn with_action(mut self, name: impl Into<String>, action: Arc<dyn Action>) -> Self {
        self.actions.insert(name.into(), action);
        self
    }

    pub fn with_goal(mut self, goal: Goal) -> Self {
        self.goals.insert(goal.name.clone(), Arc::new(goal));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn goal(&self, name: &str) -> Option<Arc<Goal>> {
        self.goals.get(name).cloned()
    }

    pub fn require_goal(&self, name: &str) -> EngineResult<Arc<Goal>> {
        self.goal(name).ok_or_else(|| EngineError::UnknownGoal {
            name: name.to_string(),
        })
    }

    pub fn goals(&self) -> impl Iterator<Item = &Arc<Goal>> {
        self.goals.values()
    }

    pub fn action(&self, name: &str) -> EngineResult<Arc<dyn Action>> {
        self.actions
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::UnknownAction {
                name: name.to_string(),
            })
    }

    pub fn has_action(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// The workflow every utterance goes through.
    pub fn workflow(&self) -> EngineResult<&Workflow> {
        self.workflows.first().ok_or_else(|| EngineError::NoWorkflow {
            bot: self.name.clone(),
        })
    }

    pub fn action_processor(&self) -> Arc<dyn ActionProcessor> {
        match self.action_processors.first() {
            Some(processor) => processor.clone(),
            None => Arc::new(RevalidatingProcessor),
        }
    }

    /// Answers `input` given the user's and the conversation's stores.
    ///
    /// A fresh utterance store is seeded from the conversation (pending
    /// objects, the active goal and the open prompt). The winning response's
    /// commands are applied and its actions run; their spoken text follows
    /// the response's own, one per line. Objects and the active goal are
    /// then carried back into the conversation store.
    pub fn answer(&self, input: &str, user: &Store, conversation: &Store) -> EngineResult<Turn> {
        let utterance = Utterance::parse(input);
        let seeded = Snapshot::new(user.clone(), conversation.clone(), Store::new()).update(&[
            Command::fetch(slot(OBJECTS)?, slot(PARTIALS)?),
            Command::fetch(slot(INTENT)?, slot(CONV_INTENT)?),
            Command::fetch(slot(UTT_PROMPT)?, slot(PROMPT)?),
        ])?;

        let response = self.workflow()?.process(&utterance, &seeded, self)?;
        tracing::debug!(bot = %self.name, score = response.score, "picked response");

        let mut reply = response.spoken;
        let mut snapshot = response.snapshot.update(&response.commands)?;
        let processor = self.action_processor();
        for action in &response.actions {
            let outcome = processor.process(action.as_ref(), &snapshot, self)?;
            snapshot = outcome.snapshot;
            if let Some(spoken) = outcome.spoken.filter(|spoken| !spoken.is_empty()) {
                if !reply.is_empty() {
                    reply.push('\n');
                }
                reply.push_str(&spoken);
            }
        }

        let mut carry = vec![Command::fetch(slot(PARTIALS)?, slot(OBJECTS)?)];
        if let Some(goal) = snapshot.get_at(INTENT_NAME)? {
            carry.push(Command::set(slot(CONV_INTENT_NAME)?, goal));
        }
        let (user, conversation, _) = snapshot.update(&carry)?.into_stores();
        Ok(Turn {
            reply,
            user,
            conversation,
        })
    }
}
