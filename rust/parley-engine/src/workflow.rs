//! The per-utterance pipeline: readings, matching, scoring.

use std::sync::Arc;

use parley_lookup::Utterance;
use parley_state::{Snapshot, parse_commands};

use crate::bot::Bot;
use crate::error::{EngineError, EngineResult};
use crate::preprocess::UtteranceProcessor;
use crate::prompt::{DefaultPromptHandler, PromptHandler};
use crate::resolver::{ExplicitGoalMatcher, GoalMatcher, GoalResolver, ValidatingResolver};
use crate::response::Response;

/// A configured pipeline. Each stage uses its first component, falling back
/// to the built-in one when none was configured.
#[derive(Debug)]
pub struct Workflow {
    name: String,
    utterance_processors: Vec<Arc<dyn UtteranceProcessor>>,
    goal_matchers: Vec<Arc<dyn GoalMatcher>>,
    goal_resolvers: Vec<Arc<dyn GoalResolver>>,
    prompt_handlers: Vec<Arc<dyn PromptHandler>>,
}

impl Workflow {
    pub fn new(name: impl Into<String>) -> Self {
        Workflow {
            name: name.into(),
            utterance_processors: Vec::new(),
            goal_matchers: Vec::new(),
            goal_resolvers: Vec::new(),
            prompt_handlers: Vec::new(),
        }
    }

    pub fn with_utterance_processor(mut self, processor: Arc<dyn UtteranceProcessor>) -> Self {
        self.utterance_processors.push(processor);
        self
    }

    pub fn with_goal_matcher(mut self, matcher: Arc<dyn GoalMatcher>) -> Self {
        self.goal_matchers.push(matcher);
        self
    }

    pub fn with_goal_resolver(mut self, resolver: Arc<dyn GoalResolver>) -> Self {
        self.goal_resolvers.push(resolver);
        self
    }

    pub fn with_prompt_handler(mut self, handler: Arc<dyn PromptHandler>) -> Self {
        self.prompt_handlers.push(handler);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn goal_matcher(&self) -> Arc<dyn GoalMatcher> {
        match self.goal_matchers.first() {
            Some(matcher) => matcher.clone(),
            None => Arc::new(ExplicitGoalMatcher),
        }
    }

    pub fn goal_resolver(&self) -> Arc<dyn GoalResolver> {
        match self.goal_resolvers.first() {
            Some(resolver) => resolver.clone(),
            None => Arc::new(ValidatingResolver),
        }
    }

    pub fn prompt_handler(&self) -> Arc<dyn PromptHandler> {
        match self.prompt_handlers.first() {
            Some(handler) => handler.clone(),
            None => Arc::new(DefaultPromptHandler),
        }
    }

    /// Runs the utterance processors in order, each over every reading the
    /// previous one produced. Duplicate readings are dropped; the order of
    /// first appearance is kept.
    pub fn readings(&self, input: &Utterance) -> EngineResult<Vec<Utterance>> {
        let mut readings = vec![input.clone()];
        for processor in &self.utterance_processors {
            let mut next: Vec<Utterance> = Vec::new();
            for reading in &readings {
                for produced in processor.process(reading)? {
                    if !next.contains(&produced) {
                        next.push(produced);
                    }
                }
            }
            readings = next;
        }
        Ok(readings)
    }

    /// Scores every reading of `input` and returns the best response.
    ///
    /// `snapshot` holds the user and conversation stores plus the seeded
    /// utterance store; each reading starts from it. Readings that match
    /// nothing, name no goal, or fail to apply are dropped. Among equal
    /// scores the earliest reading wins.
    pub fn process(&self, input: &Utterance, snapshot: &Snapshot, bot: &Bot) -> EngineResult<Response> {
        let readings = self.readings(input)?;
        tracing::debug!(workflow = %self.name, readings = readings.len(), "generated readings");

        let mut best: Option<Response> = None;
        for reading in &readings {
            let candidate = match self.candidate(reading, snapshot, bot) {
                Ok(Some(candidate)) => candidate,
                Ok(None) => continue,
                Err(EngineError::UnknownGoal { name }) => {
                    tracing::warn!(reading = %reading, goal = %name, "reading names an unknown goal");
                    continue;
                }
                Err(err @ (EngineError::State(_) | EngineError::Lookup(_))) => {
                    tracing::warn!(reading = %reading, error = %err, "dropping reading");
                    continue;
                }
                Err(err) => return Err(err),
            };
            tracing::debug!(
                reading = %reading,
                score = candidate.score,
                spoken = %candidate.spoken,
                "scored reading"
            );
            let better = match &best {
                Some(best) => candidate.score > best.score,
                None => true,
            };
            if better {
                best = Some(candidate);
            }
        }

        Ok(best.unwrap_or_else(|| Response::not_understood(snapshot.clone())))
    }

    fn candidate(
        &self,
        reading: &Utterance,
        snapshot: &Snapshot,
        bot: &Bot,
    ) -> EngineResult<Option<Response>> {
        let Some(payload) = bot.matcher().lookup(reading)? else {
            return Ok(None);
        };
        let snapshot = snapshot.update(&parse_commands(&payload)?)?;
        let Some(goal) = self.goal_matcher().assign(&snapshot, bot)? else {
            tracing::debug!(reading = %reading, "no active goal");
            return Ok(None);
        };
        let snapshot = self.prompt_handler().handle(&snapshot)?;
        self.goal_resolver().resolve(&goal, bot, &snapshot).map(Some)
    }
}
