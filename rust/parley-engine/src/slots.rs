//! Well-known slots the engine reads and writes.

use parley_state::{ScopedPath, Snapshot, StateResult};

pub const INTENT: &str = "utt:/intent";
pub const INTENT_NAME: &str = "utt:/intent.name";
pub const INTENT_VALIDATED: &str = "utt:/intent?validated";
pub const INTENT_CONFIRMED: &str = "utt:/intent?confirmed";

/// Text an action wants spoken.
pub const ACTION_SPOKEN: &str = "utt:/action.spoken";

/// Slots filled during the current utterance.
pub const OBJECTS: &str = "utt:/objects";
/// Slots carried between utterances.
pub const PARTIALS: &str = "conv:/partials";

pub const PROMPT: &str = "conv:/prompt";
pub const PROMPT_QUESTION: &str = "conv:/prompt.question";
pub const PROMPT_SLOT: &str = "conv:/prompt.slot";
pub const PROMPT_INTENT: &str = "conv:/prompt.intent";
pub const PROMPT_BOOLEAN: &str = "conv:/prompt?boolean";

/// The pending prompt as seen from inside an utterance.
pub const UTT_PROMPT: &str = "utt:/prompt";
pub const UTT_PROMPT_VALUE: &str = "utt:/prompt.value";
pub const UTT_PROMPT_SLOT: &str = "utt:/prompt.slot";
pub const UTT_PROMPT_BOOLEAN: &str = "utt:/prompt?boolean";

pub const CONV_INTENT: &str = "conv:/intent";
pub const CONV_INTENT_NAME: &str = "conv:/intent.name";

pub const CONFIRMATION_QUESTION: &str = "Is that okay?";
pub const NOT_UNDERSTOOD: &str = "Sorry, I didn't understand";

pub fn slot(text: &str) -> StateResult<ScopedPath> {
    ScopedPath::parse(text)
}

/// Reads a boolean slot; anything but a stored `true` is false.
pub(crate) fn flag(snapshot: &Snapshot, at: &str) -> StateResult<bool> {
    Ok(snapshot
        .get_at(at)?
        .and_then(|node| node.as_bool())
        .unwrap_or(false))
}
