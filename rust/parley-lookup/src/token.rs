//! Tokens and the tokenizer that produces them from raw text.

use std::borrow::Cow;
use std::fmt;

/// The dictionary spelling of a wildcard position.
pub const WILDCARD: &str = "*";

/// Suffix appended to an entity alias to form its dictionary spelling.
pub const MARKER_SUFFIX: &str = "_MKR";

/// A single unit of an utterance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    /// A word as typed, lowercased.
    Literal(String),
    /// A recognized entity. `value` keeps the matched text, which may span
    /// several words.
    Entity { alias: String, value: String },
}

impl Token {
    pub fn literal(value: impl Into<String>) -> Self {
        Token::Literal(value.into())
    }

    pub fn entity(alias: impl Into<String>, value: impl Into<String>) -> Self {
        Token::Entity {
            alias: alias.into(),
            value: value.into(),
        }
    }

    /// The token's text.
    pub fn value(&self) -> &str {
        match self {
            Token::Literal(value) | Token::Entity { value, .. } => value,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Token::Literal(_))
    }

    /// How the token is spelled inside dictionary patterns: the word itself
    /// for literals, `<ALIAS>_MKR` for entities.
    pub fn lookup_spelling(&self) -> Cow<'_, str> {
        match self {
            Token::Literal(value) => Cow::Borrowed(value),
            Token::Entity { alias, .. } => Cow::Owned(format!("{alias}{MARKER_SUFFIX}")),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Literal(value) => write!(f, "{value}"),
            Token::Entity { alias, value } => write!(f, "[{alias}: {value}]"),
        }
    }
}

/// Splits `text` into lowercased literal tokens.
///
/// Words are runs of alphanumeric characters and `_`; an apostrophe is kept
/// when it sits between two word characters (`don't`). Everything else
/// separates words and is dropped.
pub fn tokenize(text: &str) -> Vec<Token> {
    let chars: Vec<char> = text.to_lowercase().chars().collect();
    let mut tokens = Vec::new();
    let mut word = String::new();

    for (i, &c) in chars.iter().enumerate() {
        let in_word_apostrophe = c == '\''
            && !word.is_empty()
            && chars.get(i + 1).is_some_and(|next| next.is_alphanumeric());
        if c.is_alphanumeric() || c == '_' || in_word_apostrophe {
            word.push(c);
        } else if !word.is_empty() {
            tokens.push(Token::Literal(std::mem::take(&mut word)));
        }
    }
    if !word.is_empty() {
        tokens.push(Token::Literal(word));
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<String> {
        tokenize(text).iter().map(|t| t.value().to_string()).collect()
    }

    #[test]
    fn splits_and_lowercases() {
        assert_eq!(words("I want to Open a ticket"), ["i", "want", "to", "open", "a", "ticket"]);
    }

    #[test]
    fn drops_punctuation() {
        assert_eq!(words("matt, joe and steve!"), ["matt", "joe", "and", "steve"]);
        assert_eq!(words("  10 hours. "), ["10", "hours"]);
    }

    #[test]
    fn keeps_in_word_apostrophes() {
        assert_eq!(words("don't 'quote'"), ["don't", "quote"]);
    }

    #[test]
    fn entity_spelling_uses_marker_suffix() {
        assert_eq!(Token::entity("EMP", "matt").lookup_spelling(), "EMP_MKR");
        assert_eq!(Token::literal("open").lookup_spelling(), "open");
    }
}
