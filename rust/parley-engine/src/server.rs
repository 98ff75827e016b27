//! The top-level entry point: bots, users and conversations.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use ulid::Ulid;

use crate::bot::Bot;
use crate::config::Config;
use crate::conversation::{Conversation, User};
use crate::error::{EngineError, EngineResult};
use crate::registry::Registry;

/// A reply and the conversation it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    pub conversation: Ulid,
}

/// Holds the bots plus every user and conversation seen so far.
///
/// Utterances in different conversations may be answered concurrently;
/// within one conversation they are answered one at a time.
#[derive(Debug, Default)]
pub struct Server {
    bots: HashMap<String, Arc<Bot>>,
    users: RwLock<HashMap<String, Arc<User>>>,
    conversations: RwLock<HashMap<Ulid, Arc<Conversation>>>,
}

impl Server {
    pub fn new(bots: impl IntoIterator<Item = Bot>) -> Self {
        Server {
            bots: bots
                .into_iter()
                .map(|bot| (bot.name().to_string(), Arc::new(bot)))
                .collect(),
            ..Server::default()
        }
    }

    pub fn from_config(config: &Config, registry: &Registry) -> EngineResult<Self> {
        let bots = config
            .bots
            .iter()
            .map(|bot| registry.build_bot(bot, &config.base_dir))
            .collect::<EngineResult<Vec<_>>>()?;
        Ok(Server::new(bots))
    }

    pub fn load(path: &Path, registry: &Registry) -> EngineResult<Self> {
        Server::from_config(&Config::load(path)?, registry)
    }

    pub fn bot(&self, name: &str) -> EngineResult<Arc<Bot>> {
        self.bots
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::UnknownBot {
                name: name.to_string(),
            })
    }

    pub fn bot_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.bots.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The user registered under `id`, created on first sight.
    pub fn user(&self, id: &str) -> Arc<User> {
        if let Some(user) = self.users.read().get(id) {
            return user.clone();
        }
        self.users
            .write()
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(User::new(id)))
            .clone()
    }

    pub fn conversation(&self, id: Ulid) -> EngineResult<Arc<Conversation>> {
        self.conversations
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| EngineError::UnknownConversation { id: id.to_string() })
    }

    pub fn start_conversation(&self, user: &str, bot: &str) -> EngineResult<Arc<Conversation>> {
        self.bot(bot)?;
        let id = Ulid::new();
        let conversation = Arc::new(Conversation::new(id, bot, self.user(user)));
        self.conversations.write().insert(id, conversation.clone());
        tracing::info!(conversation = %id, user, bot, "started conversation");
        Ok(conversation)
    }

    /// Answers `input` from `user` in the given conversation, or in a new
    /// one when `conversation` is `None`.
    pub fn speak(
        &self,
        input: &str,
        user: &str,
        conversation: Option<Ulid>,
        bot: &str,
    ) -> EngineResult<Answer> {
        let conversation = match conversation {
            Some(id) => self.conversation(id)?,
            None => self.start_conversation(user, bot)?,
        };
        let bot = self.bot(bot)?;

        let _turn = conversation.begin_turn();
        let owner = conversation.user();
        let turn = bot.answer(input, &owner.store(), &conversation.store())?;
        owner.replace(turn.user);
        conversation.replace(turn.conversation);

        Ok(Answer {
            text: turn.reply,
            conversation: conversation.id(),
        })
    }
}
