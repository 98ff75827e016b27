//! JSON bot configuration.
//!
//! ```json
//! { "bots": [ { "name": "default", "lookup": { "dict": "tickets.csv" },
//!               "workflows": [ { "name": "main",
//!                                "utteranceProcessors": [ { "kind": "entityExtractor",
//!                                                           "props": { "alias": "EMP", "dict": "employees.csv" } } ] } ],
//!               "actions": [ { "name": "createTicket", "kind": "createTicket" } ],
//!               "goals": [ ... ] } ] }
//! ```
//!
//! Relative file properties resolve against the directory holding the
//! configuration file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub bots: Vec<BotConfig>,
    /// Directory relative file properties resolve against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Config {
    pub fn from_json(text: &str, base_dir: impl Into<PathBuf>) -> EngineResult<Self> {
        let mut config: Config = serde_json::from_str(text)?;
        config.base_dir = base_dir.into();
        Ok(config)
    }

    pub fn load(path: &Path) -> EngineResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Config::from_json(&text, base_dir)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotConfig {
    pub name: String,
    pub lookup: LookupConfig,
    #[serde(default)]
    pub workflows: Vec<WorkflowConfig>,
    #[serde(default)]
    pub action_processors: Vec<ComponentConfig>,
    #[serde(default)]
    pub actions: Vec<ActionConfig>,
    #[serde(default)]
    pub goals: Vec<GoalConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupConfig {
    /// `pattern,payload` rows.
    pub dict: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowConfig {
    pub name: String,
    #[serde(default)]
    pub utterance_processors: Vec<ComponentConfig>,
    #[serde(default)]
    pub goal_matchers: Vec<ComponentConfig>,
    #[serde(default)]
    pub goal_resolvers: Vec<ComponentConfig>,
    #[serde(default)]
    pub prompt_handlers: Vec<ComponentConfig>,
}

/// A registered component kind and its string properties.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentConfig {
    pub kind: String,
    #[serde(default)]
    pub props: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionConfig {
    pub name: String,
    pub kind: String,
    #[serde(default)]
    pub props: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalConfig {
    pub name: String,
    #[serde(default)]
    pub constraints: Vec<ConstraintConfig>,
    #[serde(default)]
    pub success_template: Vec<String>,
    #[serde(default)]
    pub success_actions: Vec<String>,
    #[serde(default)]
    pub confirm_on_valid: bool,
    #[serde(default)]
    pub initial_response_prompt: Option<String>,
    #[serde(default)]
    pub deny_goal: Option<String>,
    #[serde(default)]
    pub object_slots: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintConfig {
    pub slot: String,
    pub prompt: String,
    #[serde(default)]
    pub error_message: Option<String>,
    pub validator: String,
    #[serde(default)]
    pub validator_params: BTreeMap<String, String>,
}

/// Properties handed to a component factory.
#[derive(Debug, Clone, Copy)]
pub struct Props<'a> {
    component: &'a str,
    values: &'a BTreeMap<String, String>,
    base_dir: &'a Path,
}

impl<'a> Props<'a> {
    pub fn new(component: &'a str, values: &'a BTreeMap<String, String>, base_dir: &'a Path) -> Self {
        Props {
            component,
            values,
            base_dir,
        }
    }

    pub fn component(&self) -> &str {
        self.component
    }

    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn require(&self, key: &str) -> EngineResult<&'a str> {
        self.get(key).ok_or_else(|| EngineError::MissingProperty {
            component: self.component.to_string(),
            property: key.to_string(),
        })
    }

    /// A required file property, resolved against the configuration
    /// directory when relative.
    pub fn path(&self, key: &str) -> EngineResult<PathBuf> {
        Ok(resolve(self.base_dir, self.require(key)?))
    }
}

pub(crate) fn resolve(base_dir: &Path, file: &str) -> PathBuf {
    let file = Path::new(file);
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        base_dir.join(file)
    }
}
