//! Conversation state for parley.
//!
//! State lives in three [`Store`]s (user, conversation, utterance), each a
//! copy-on-write [`Node`] tree addressed with a small path language:
//!
//! ```
//! use parley_state::{Node, Snapshot};
//!
//! let snapshot = Snapshot::default()
//!     .put_at("utt:/objects/ticket.title", Node::str("hello"))
//!     .unwrap();
//! assert_eq!(
//!     snapshot.text_at("utt:/objects/ticket.title").unwrap().as_deref(),
//!     Some("hello")
//! );
//! ```
//!
//! Edits are expressed as [`Command`]s, which can be parsed from and
//! rendered to their textual `target -> value` / `-! target` forms and folded
//! into a [`Snapshot`] with [`Snapshot::update`].

mod command;
mod error;
mod node;
mod path;
mod scope;
mod snapshot;
mod store;

pub use command::*;
pub use error::*;
pub use node::Node;
pub use path::*;
pub use scope::*;
pub use snapshot::*;
pub use store::*;
