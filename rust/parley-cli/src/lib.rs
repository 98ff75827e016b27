//! # Parley CLI
//!
//! A terminal front end for Parley bots, plus the demo ticket actions the
//! bundled bot uses.
//!
//! ```bash
//! parley --config rust/parley-cli/fixtures/bot.json --bot default
//! ```
//!
//! Lines typed at the prompt are sent to the bot. `:state` prints the
//! conversation store, `:new` starts over and `:quit` exits.

use std::path::PathBuf;
use std::sync::Arc;

use parley_engine::Registry;

mod cli;
pub mod logging;
mod ticket;

pub use cli::*;
pub use ticket::*;

/// The built-in components plus the ticket actions.
pub fn registry() -> Registry {
    let mut registry = Registry::with_builtins();
    registry.register_action("createTicket", |_| Ok(Arc::new(CreateTicket::new())));
    registry.register_action("changeTicket", |_| Ok(Arc::new(ChangeTicket)));
    registry
}

/// The bundled ticket bot configuration.
pub fn default_config() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/bot.json")
}
