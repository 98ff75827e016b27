//! Users and conversations: the owners of the long-lived stores.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard, RwLock};
use parley_state::Store;
use ulid::Ulid;

/// Someone talking to a bot. The user store outlives their conversations.
#[derive(Debug)]
pub struct User {
    id: String,
    store: RwLock<Store>,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        User {
            id: id.into(),
            store: RwLock::new(Store::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn store(&self) -> Store {
        self.store.read().clone()
    }

    pub fn replace(&self, store: Store) {
        *self.store.write() = store;
    }
}

/// One conversation between a user and a bot.
///
/// Stores are values; they are swapped in whole after each utterance.
/// [`Conversation::begin_turn`] serializes utterances within the
/// conversation.
#[derive(Debug)]
pub struct Conversation {
    id: Ulid,
    bot: String,
    user: Arc<User>,
    store: RwLock<Store>,
    turn: Mutex<()>,
}

impl Conversation {
    pub fn new(id: Ulid, bot: impl Into<String>, user: Arc<User>) -> Self {
        Conversation {
            id,
            bot: bot.into(),
            user,
            store: RwLock::new(Store::new()),
            turn: Mutex::new(()),
        }
    }

    pub fn id(&self) -> Ulid {
        self.id
    }

    /// Name of the bot this conversation talks to.
    pub fn bot(&self) -> &str {
        &self.bot
    }

    pub fn user(&self) -> &Arc<User> {
        &self.user
    }

    pub fn store(&self) -> Store {
        self.store.read().clone()
    }

    pub fn replace(&self, store: Store) {
        *self.store.write() = store;
    }

    /// Held for the duration of one utterance.
    pub fn begin_turn(&self) -> MutexGuard<'_, ()> {
        self.turn.lock()
    }
}
