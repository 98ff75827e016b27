//! Turning raw text into dictionary matches.
//!
//! ```text
//! text ─tokenize─▶ Utterance ─Gazetteer─▶ entity readings ─Matcher─▶ payload
//! ```
//!
//! A [`Dictionary`] maps phrase patterns (words, `*` wildcards and
//! `<ALIAS>_MKR` entity slots) to payload strings. The [`Matcher`] finds the
//! pattern an utterance spells and substitutes the captured wildcard and
//! entity text into the payload. Entity readings come from [`Gazetteer`]s:
//! each combination of non-overlapping term occurrences yields one more
//! reading of the same input.

mod dictionary;
mod error;
mod gazetteer;
mod matcher;
mod span;
mod token;
mod utterance;

pub use dictionary::*;
pub use error::*;
pub use gazetteer::*;
pub use matcher::*;
pub use span::*;
pub use token::*;
pub use utterance::*;
