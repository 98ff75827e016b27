//! Named factories for every pluggable component kind, and assembling bots
//! from configuration with them.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use parley_lookup::{Dictionary, Gazetteer, Matcher};
use parley_state::{PathExpr, ScopedPath};

use crate::action::{Action, ActionProcessor, PlainProcessor, RevalidatingProcessor};
use crate::bot::Bot;
use crate::config::{BotConfig, ComponentConfig, GoalConfig, Props, resolve};
use crate::error::{EngineError, EngineResult};
use crate::goal::Goal;
use crate::preprocess::{EntityExtractor, UtteranceProcessor};
use crate::prompt::{DefaultPromptHandler, PromptHandler};
use crate::resolver::{ExplicitGoalMatcher, GoalMatcher, GoalResolver, ValidatingResolver};
use crate::validation::{Constraint, Contains, NotNull, OneOf, Validator};
use crate::workflow::Workflow;

type Factory<T> = Box<dyn Fn(&Props<'_>) -> EngineResult<Arc<T>> + Send + Sync>;

struct Factories<T: ?Sized> {
    kind: &'static str,
    makers: HashMap<String, Factory<T>>,
}

impl<T: ?Sized> Factories<T> {
    fn new(kind: &'static str) -> Self {
        Factories {
            kind,
            makers: HashMap::new(),
        }
    }

    fn insert<F>(&mut self, key: impl Into<String>, factory: F)
    where
        F: Fn(&Props<'_>) -> EngineResult<Arc<T>> + Send + Sync + 'static,
    {
        self.makers.insert(key.into(), Box::new(factory));
    }

    fn build(&self, key: &str, props: &Props<'_>) -> EngineResult<Arc<T>> {
        let factory = self
            .makers
            .get(key)
            .ok_or_else(|| EngineError::UnknownComponent {
                kind: self.kind,
                key: key.to_string(),
            })?;
        factory(props)
    }

    fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.makers.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

/// Maps configuration keys to component factories.
pub struct Registry {
    utterance_processors: Factories<dyn UtteranceProcessor>,
    goal_matchers: Factories<dyn GoalMatcher>,
    goal_resolvers: Factories<dyn GoalResolver>,
    prompt_handlers: Factories<dyn PromptHandler>,
    action_processors: Factories<dyn ActionProcessor>,
    validators: Factories<dyn Validator>,
    actions: Factories<dyn Action>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("utterance_processors", &self.utterance_processors.keys())
            .field("goal_matchers", &self.goal_matchers.keys())
            .field("goal_resolvers", &self.goal_resolvers.keys())
            .field("prompt_handlers", &self.prompt_handlers.keys())
            .field("action_processors", &self.action_processors.keys())
            .field("validators", &self.validators.keys())
            .field("actions", &self.actions.keys())
            .finish()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl Registry {
    /// A registry with no factories at all.
    pub fn empty() -> Self {
        Registry {
            utterance_processors: Factories::new("utterance processor"),
            goal_matchers: Factories::new("goal matcher"),
            goal_resolvers: Factories::new("goal resolver"),
            prompt_handlers: Factories::new("prompt handler"),
            action_processors: Factories::new("action processor"),
            validators: Factories::new("validator"),
            actions: Factories::new("action"),
        }
    }

    /// A registry with the built-in components. Applications add their
    /// actions with [`Registry::register_action`].
    pub fn with_builtins() -> Self {
        let mut registry = Registry::empty();
        registry.register_utterance_processor("entityExtractor", |props| {
            let gazetteer = Gazetteer::load(&props.path("dict")?)?;
            Ok(Arc::new(EntityExtractor::new(props.require("alias")?, gazetteer)))
        });
        registry.register_goal_matcher("explicit", |_| Ok(Arc::new(ExplicitGoalMatcher)));
        registry.register_goal_resolver("validating", |_| Ok(Arc::new(ValidatingResolver)));
        registry.register_prompt_handler("default", |_| Ok(Arc::new(DefaultPromptHandler)));
        registry.register_action_processor("plain", |_| Ok(Arc::new(PlainProcessor)));
        registry.register_action_processor("revalidating", |_| Ok(Arc::new(RevalidatingProcessor)));
        registry.register_validator("notNull", |_| Ok(Arc::new(NotNull)));
        registry.register_validator("contains", |props| {
            Ok(Arc::new(Contains::new(props.require("match")?)))
        });
        registry.register_validator("oneOf", |props| Ok(Arc::new(OneOf::load(&props.path("dict")?)?)));
        registry
    }

    pub fn register_utterance_processor<F>(&mut self, key: impl Into<String>, factory: F)
    where
        F: Fn(&Props<'_>) -> EngineResult<Arc<dyn UtteranceProcessor>> + Send + Sync + 'static,
    {
        self.utterance_processors.insert(key, factory);
    }

    pub fn register_goal_matcher<F>(&mut self, key: impl Into<String>, factory: F)
    where
        F: Fn(&Props<'_>) -> EngineResult<Arc<dyn GoalMatcher>> + Send + Sync + 'static,
    {
        self.goal_matchers.insert(key, factory);
    }

    pub fn register_goal_resolver<F>(&mut self, key: impl Into<String>, factory: F)
    where
        F: Fn(&Props<'_>) -> EngineResult<Arc<dyn GoalResolver>> + Send + Sync + 'static,
    {
        self.goal_resolvers.insert(key, factory);
    }

    pub fn register_prompt_handler<F>(&mut self, key: impl Into<String>, factory: F)
    where
        F: Fn(&Props<'_>) -> EngineResult<Arc<dyn PromptHandler>> + Send + Sync + 'static,
    {
        self.prompt_handlers.insert(key, factory);
    }

    pub fn register_action_processor<F>(&mut self, key: impl Into<String>, factory: F)
    where
        F: Fn(&Props<'_>) -> EngineResult<Arc<dyn ActionProcessor>> + Send + Sync + 'static,
    {
        self.action_processors.insert(key, factory);
    }

    pub fn register_validator<F>(&mut self, key: impl Into<String>, factory: F)
    where
        F: Fn(&Props<'_>) -> EngineResult<Arc<dyn Validator>> + Send + Sync + 'static,
    {
        self.validators.insert(key, factory);
    }

    pub fn register_action<F>(&mut self, key: impl Into<String>, factory: F)
    where
        F: Fn(&Props<'_>) -> EngineResult<Arc<dyn Action>> + Send + Sync + 'static,
    {
        self.actions.insert(key, factory);
    }

    /// Builds a bot, checking that every action and deny goal its goals
    /// name exists.
    pub fn build_bot(&self, config: &BotConfig, base_dir: &Path) -> EngineResult<Bot> {
        let dictionary = Dictionary::load(&resolve(base_dir, &config.lookup.dict))?;
        let mut bot = Bot::new(config.name.as_str(), Matcher::new(dictionary));

        for workflow in &config.workflows {
            let mut built = Workflow::new(workflow.name.as_str());
            for component in &workflow.utterance_processors {
                built = built.with_utterance_processor(build(&self.utterance_processors, component, base_dir)?);
            }
            for component in &workflow.goal_matchers {
                built = built.with_goal_matcher(build(&self.goal_matchers, component, base_dir)?);
            }
            for component in &workflow.goal_resolvers {
                built = built.with_goal_resolver(build(&self.goal_resolvers, component, base_dir)?);
            }
            for component in &workflow.prompt_handlers {
                built = built.with_prompt_handler(build(&self.prompt_handlers, component, base_dir)?);
            }
            bot = bot.with_workflow(built);
        }
        for component in &config.action_processors {
            bot = bot.with_action_processor(build(&self.action_processors, component, base_dir)?);
        }
        for action in &config.actions {
            let props = Props::new(&action.name, &action.props, base_dir);
            bot = bot.with_action(action.name.as_str(), self.actions.build(&action.kind, &props)?);
        }
        for goal in &config.goals {
            bot = bot.with_goal(self.build_goal(goal, base_dir)?);
        }

        for goal in bot.goals() {
            for action in &goal.success_actions {
                if !bot.has_action(action) {
                    return Err(EngineError::UnknownAction {
                        name: action.clone(),
                    });
                }
            }
            if let Some(deny) = &goal.deny_goal {
                bot.require_goal(deny)?;
            }
        }
        tracing::info!(
            bot = %config.name,
            patterns = bot.matcher().dictionary().len(),
            goals = config.goals.len(),
            "loaded bot"
        );
        Ok(bot)
    }

    fn build_goal(&self, config: &GoalConfig, base_dir: &Path) -> EngineResult<Goal> {
        let mut constraints = Vec::with_capacity(config.constraints.len());
        for constraint in &config.constraints {
            let props = Props::new(&constraint.validator, &constraint.validator_params, base_dir);
            let validator = self.validators.build(&constraint.validator, &props)?;
            let mut built = Constraint::new(
                ScopedPath::parse(&constraint.slot)?,
                constraint.prompt.as_str(),
                validator,
            );
            built.error_message = constraint.error_message.clone();
            constraints.push(built);
        }
        let object_slots = config
            .object_slots
            .iter()
            .map(|slot| PathExpr::parse(slot))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Goal {
            name: config.name.clone(),
            constraints,
            success_template: config.success_template.clone(),
            success_actions: config.success_actions.clone(),
            confirm_on_valid: config.confirm_on_valid,
            initial_response_prompt: config.initial_response_prompt.clone(),
            deny_goal: config.deny_goal.clone(),
            object_slots,
        })
    }
}

fn build<T: ?Sized>(
    factories: &Factories<T>,
    component: &ComponentConfig,
    base_dir: &Path,
) -> EngineResult<Arc<T>> {
    let props = Props::new(&component.kind, &component.props, base_dir);
    factories.build(&component.kind, &props)
}
