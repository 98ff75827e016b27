//! Goal-directed dialogue on top of [`parley_state`] and [`parley_lookup`].
//!
//! A [`Server`] holds [`Bot`]s and the users and conversations talking to
//! them. Each utterance goes through the bot's [`Workflow`]:
//!
//! 1. utterance processors fan the input out into readings;
//! 2. every reading is matched against the bot's dictionary and the
//!    resulting commands are folded into a fresh [`parley_state::Snapshot`];
//! 3. a [`GoalMatcher`] picks the active [`Goal`], a [`PromptHandler`]
//!    fills any slot the previous turn asked about, and a [`GoalResolver`]
//!    scores the goal and decides what to say;
//! 4. the best-scoring [`Response`] wins; its commands are applied and its
//!    [`Action`]s run through an [`ActionProcessor`].
//!
//! Components are plugged in by name through a [`Registry`], usually from a
//! JSON [`Config`].

mod action;
mod bot;
mod config;
mod conversation;
mod error;
mod goal;
mod preprocess;
mod prompt;
mod registry;
mod resolver;
mod response;
mod server;
pub mod slots;
mod validation;
mod workflow;

#[cfg(test)]
mod fixture;

pub use action::*;
pub use bot::*;
pub use config::*;
pub use conversation::*;
pub use error::*;
pub use goal::*;
pub use preprocess::*;
pub use prompt::*;
pub use registry::*;
pub use resolver::*;
pub use response::*;
pub use server::*;
pub use validation::*;
pub use workflow::*;
