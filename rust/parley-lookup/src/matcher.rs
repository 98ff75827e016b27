//! Matching utterances against a phrase dictionary.
//!
//! The matcher walks the tokens once, keeping the words matched so far. When
//! a literal word is not a valid continuation it opens a wildcard at the
//! miss and slides it left until the dictionary accepts the prefix again,
//! then lets the wildcard swallow following words until one of them is a
//! valid continuation. It never revisits a wildcard boundary once the
//! dictionary has accepted it, so the shortest wildcard always wins.
//!
//! A successful match resolves the pattern's payload by substituting
//! `WC_<n>` with the n-th captured wildcard text and `<ALIAS>_MKR_<n>` with
//! the n-th entity captured under that alias.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parley_state::Marker;

use crate::dictionary::Dictionary;
use crate::error::{LookupError, LookupResult};
use crate::token::{Token, WILDCARD};
use crate::utterance::Utterance;

/// Text captured while matching.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Captures {
    /// Wildcard texts in order of appearance.
    pub wildcards: Vec<String>,
    /// Entity texts per alias, in order of appearance.
    pub entities: HashMap<String, Vec<String>>,
}

impl Captures {
    fn entity(&mut self, alias: &str, value: &str) {
        self.entities
            .entry(alias.to_string())
            .or_default()
            .push(value.to_string());
    }

    fn resolve(&self, marker: &Marker) -> Option<&str> {
        let value = match marker {
            Marker::Wildcard(index) => self.wildcards.get(*index),
            Marker::Entity { alias, index } => self.entities.get(alias)?.get(*index),
        };
        value.map(String::as_str)
    }
}

/// A complete match: the pattern that matched and what it captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub pattern: Vec<String>,
    pub captures: Captures,
}

/// Looks utterances up in a shared [`Dictionary`].
#[derive(Debug, Clone)]
pub struct Matcher {
    dictionary: Arc<Dictionary>,
}

impl Matcher {
    pub fn new(dictionary: impl Into<Arc<Dictionary>>) -> Self {
        Matcher {
            dictionary: dictionary.into(),
        }
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Matches `utterance` and returns its resolved payload, or `None` when
    /// no complete pattern matches.
    pub fn lookup(&self, utterance: &Utterance) -> LookupResult<Option<String>> {
        let Some(found) = self.find(utterance.tokens()) else {
            tracing::debug!(utterance = %utterance, "no dictionary match");
            return Ok(None);
        };
        let payload = self.dictionary.payload(&found.pattern).unwrap_or_default();
        let resolved = resolve_payload(payload, &found.captures)?;
        tracing::debug!(
            utterance = %utterance,
            pattern = %found.pattern.join(" "),
            payload = %resolved,
            "dictionary match"
        );
        Ok(Some(resolved))
    }

    /// Runs the matching pass without resolving the payload.
    pub fn find(&self, tokens: &[Token]) -> Option<Match> {
        let dictionary = &self.dictionary;
        let mut captures = Captures::default();
        let mut so_far: Vec<String> = Vec::new();
        let mut matched: Vec<String> = Vec::new();
        // Words before this position are entities or wildcards and are
        // never absorbed into a later wildcard.
        let mut pinned = 0;
        let mut tokens = tokens.iter();

        while let Some(token) = tokens.next() {
            let word = match token {
                Token::Entity { alias, value } => {
                    captures.entity(alias, value);
                    so_far.push(token.lookup_spelling().into_owned());
                    pinned = so_far.len();
                    if !dictionary.has_prefix(&so_far) {
                        return None;
                    }
                    matched.clone_from(&so_far);
                    continue;
                }
                Token::Literal(word) => word,
            };

            so_far.push(word.clone());
            if dictionary.has_prefix(&so_far) {
                matched.clone_from(&so_far);
                continue;
            }

            // Replace the missed word with a wildcard, sliding it left over
            // earlier words until the prefix is accepted.
            let mut absorbed = VecDeque::new();
            absorbed.extend(so_far.pop());
            so_far.push(WILDCARD.to_string());
            while !dictionary.has_prefix(&so_far) {
                if so_far.len() < pinned + 2 {
                    return None;
                }
                so_far.pop();
                if let Some(word) = so_far.pop() {
                    absorbed.push_front(word);
                }
                so_far.push(WILDCARD.to_string());
            }
            pinned = so_far.len();

            let mut wildcard = Vec::from(absorbed).join(" ");
            let mut recorded = false;
            for next in tokens.by_ref() {
                match next {
                    Token::Literal(word) => {
                        so_far.push(word.clone());
                        if dictionary.has_prefix(&so_far) {
                            captures.wildcards.push(std::mem::take(&mut wildcard));
                            recorded = true;
                            break;
                        }
                        so_far.pop();
                        wildcard.push(' ');
                        wildcard.push_str(word);
                    }
                    Token::Entity { alias, value } => {
                        captures.entity(alias, value);
                        so_far.push(next.lookup_spelling().into_owned());
                        pinned = so_far.len();
                        break;
                    }
                }
            }

            if !dictionary.has_prefix(&so_far) {
                return None;
            }
            if !recorded {
                captures.wildcards.push(wildcard);
            }
            matched.clone_from(&so_far);
        }

        if !dictionary.is_complete(&matched) {
            return None;
        }
        Some(Match {
            pattern: matched,
            captures,
        })
    }
}

/// Substitutes captured text into a payload template.
///
/// The payload is split on whitespace; a token ending in `;` keeps the `;`
/// after substitution. Tokens that are not placeholders pass through.
pub fn resolve_payload(payload: &str, captures: &Captures) -> LookupResult<String> {
    let resolved = payload
        .split_whitespace()
        .map(|token| {
            let (body, ending) = match token.strip_suffix(';') {
                Some(body) => (body, ";"),
                None => (token, ""),
            };
            let Some(marker) = Marker::parse(body) else {
                return Ok(token.to_string());
            };
            let value = captures
                .resolve(&marker)
                .ok_or_else(|| LookupError::Payload {
                    placeholder: marker.to_string(),
                })?;
            Ok(format!("{value}{ending}"))
        })
        .collect::<LookupResult<Vec<_>>>()?;
    Ok(resolved.join(" "))
}
