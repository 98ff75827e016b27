//! Term lists for entity extraction.

use std::fs;
use std::path::Path;

use crate::dictionary::Dictionary;
use crate::error::{LookupError, LookupResult};
use crate::span::{Span, compatible_subsets};
use crate::token::{Token, tokenize};
use crate::utterance::Utterance;

/// A term found inside a run of words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Found {
    pub span: Span,
    pub term: String,
}

/// A list of known terms, possibly multi-word, one per line.
#[derive(Debug, Default, Clone)]
pub struct Gazetteer {
    terms: Dictionary,
}

impl Gazetteer {
    /// Builds a gazetteer from one term per line. Terms are tokenized the
    /// same way utterances are; blank and `#` lines are skipped.
    pub fn from_terms(text: &str) -> Self {
        let mut terms = Dictionary::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let words: Vec<String> = tokenize(line)
                .into_iter()
                .map(|token| token.value().to_string())
                .collect();
            if !words.is_empty() {
                let term = words.join(" ");
                terms.insert(&words, term);
            }
        }
        Gazetteer { terms }
    }

    pub fn load(path: &Path) -> LookupResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| LookupError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let gazetteer = Gazetteer::from_terms(&text);
        tracing::info!(path = %path.display(), terms = gazetteer.len(), "loaded gazetteer");
        Ok(gazetteer)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn contains(&self, term: &str) -> bool {
        let words: Vec<String> = tokenize(term)
            .into_iter()
            .map(|token| token.value().to_string())
            .collect();
        !words.is_empty() && self.terms.is_complete(&words)
    }

    /// Every occurrence of every term in `words`, including overlapping
    /// ones, ordered by start then end.
    pub fn find<S: AsRef<str>>(&self, words: &[S]) -> Vec<Found> {
        let mut found = Vec::new();
        for start in 0..words.len() {
            for end in start + 1..=words.len() {
                let candidate = &words[start..end];
                if !self.terms.has_prefix(candidate) {
                    break;
                }
                if let Some(term) = self.terms.payload(candidate) {
                    found.push(Found {
                        span: Span::new(start, end),
                        term: term.to_string(),
                    });
                }
            }
        }
        found
    }

    /// Every reading of `utterance` obtained by turning a compatible set of
    /// term occurrences into `alias` entities.
    ///
    /// Terms are only searched inside runs of literal tokens, so entities
    /// found by an earlier pass are kept as they are. The first reading is
    /// always the utterance unchanged.
    pub fn readings(&self, utterance: &Utterance, alias: &str) -> Vec<Utterance> {
        let mut found = Vec::new();
        for run in utterance.literal_spans() {
            found.extend(self.find(&run.words).into_iter().map(|hit| Found {
                span: hit.span.offset(run.start),
                term: hit.term,
            }));
        }
        let spans: Vec<Span> = found.iter().map(|hit| hit.span).collect();

        compatible_subsets(&spans)
            .into_iter()
            .map(|chosen| {
                let mut tokens = Vec::with_capacity(utterance.len());
                let mut i = 0;
                while i < utterance.len() {
                    let hit = found
                        .iter()
                        .find(|hit| hit.span.start == i && chosen.contains(&hit.span));
                    match hit {
                        Some(hit) => {
                            tokens.push(Token::entity(alias, hit.term.clone()));
                            i = hit.span.end;
                        }
                        None => {
                            tokens.push(utterance.tokens()[i].clone());
                            i += 1;
                        }
                    }
                }
                Utterance::from_tokens(tokens, utterance.original())
            })
            .collect()
    }
}
