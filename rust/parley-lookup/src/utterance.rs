//! Utterances: one reading of what the user typed.

use std::fmt;

use crate::span::Span;
use crate::token::{Token, tokenize};

/// A token sequence together with the text it came from.
///
/// Preprocessing produces several utterances for the same input, each a
/// different reading (for example with or without a recognized entity).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Utterance {
    tokens: Vec<Token>,
    original: String,
}

/// A maximal run of literal tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralSpan {
    /// Token offset of the first word within the utterance.
    pub start: usize,
    pub words: Vec<String>,
}

impl LiteralSpan {
    /// The token range covered by this run.
    pub fn span(&self) -> Span {
        Span::new(self.start, self.start + self.words.len())
    }
}

impl Utterance {
    /// Tokenizes `text`.
    pub fn parse(text: &str) -> Self {
        Utterance {
            tokens: tokenize(text),
            original: text.to_string(),
        }
    }

    pub fn from_tokens(tokens: Vec<Token>, original: impl Into<String>) -> Self {
        Utterance {
            tokens,
            original: original.into(),
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// The input as typed, before any processing.
    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Groups consecutive literal tokens into runs, skipping entities.
    pub fn literal_spans(&self) -> Vec<LiteralSpan> {
        let mut spans = Vec::new();
        let mut current: Option<LiteralSpan> = None;

        for (i, token) in self.tokens.iter().enumerate() {
            match token {
                Token::Literal(word) => current
                    .get_or_insert_with(|| LiteralSpan {
                        start: i,
                        words: Vec::new(),
                    })
                    .words
                    .push(word.clone()),
                Token::Entity { .. } => spans.extend(current.take()),
            }
        }
        spans.extend(current);
        spans
    }
}

impl fmt::Display for Utterance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{token}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn finds_literal_runs_around_entities() {
        let utterance = Utterance::from_tokens(
            vec![
                Token::literal("give"),
                Token::entity("EMP", "matt"),
                Token::literal("a"),
                Token::literal("ticket"),
            ],
            "give matt a ticket",
        );
        let spans = utterance.literal_spans();
        assert_eq!(
            spans,
            vec![
                LiteralSpan {
                    start: 0,
                    words: vec!["give".into()]
                },
                LiteralSpan {
                    start: 2,
                    words: vec!["a".into(), "ticket".into()]
                },
            ]
        );
        assert_eq!(spans[1].span(), Span::new(2, 4));
    }

    #[test]
    fn displays_entities_in_brackets() {
        let utterance =
            Utterance::from_tokens(vec![Token::entity("EMP", "matt"), Token::literal("gets")], "");
        assert_eq!(utterance.to_string(), "[EMP: matt] gets");
    }
}
