//! A token-level trie mapping phrase patterns to payload strings.
//!
//! Patterns are sequences of words in which `*` stands for a wildcard and
//! `<ALIAS>_MKR` for an entity. The dictionary answers two questions for the
//! matcher: is this sequence a prefix of some pattern, and is it a complete
//! pattern.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{LookupError, LookupResult};

#[derive(Debug, Default, Clone)]
struct TrieNode {
    children: HashMap<String, TrieNode>,
    payload: Option<String>,
}

/// A read-only phrase dictionary once loaded.
#[derive(Debug, Default, Clone)]
pub struct Dictionary {
    root: TrieNode,
    len: usize,
}

impl Dictionary {
    pub fn new() -> Self {
        Dictionary::default()
    }

    /// Adds a pattern. Returns `false` (and keeps the existing payload) when
    /// the pattern was already present.
    pub fn insert<S: AsRef<str>>(&mut self, pattern: &[S], payload: impl Into<String>) -> bool {
        let mut node = &mut self.root;
        for word in pattern {
            node = node.children.entry(word.as_ref().to_string()).or_default();
        }
        if node.payload.is_some() {
            return false;
        }
        node.payload = Some(payload.into());
        self.len += 1;
        true
    }

    fn node<S: AsRef<str>>(&self, words: &[S]) -> Option<&TrieNode> {
        words
            .iter()
            .try_fold(&self.root, |node, word| node.children.get(word.as_ref()))
    }

    /// Whether some pattern starts with `words`.
    pub fn has_prefix<S: AsRef<str>>(&self, words: &[S]) -> bool {
        self.node(words).is_some()
    }

    /// Whether `words` is itself a pattern.
    pub fn is_complete<S: AsRef<str>>(&self, words: &[S]) -> bool {
        self.payload(words).is_some()
    }

    pub fn payload<S: AsRef<str>>(&self, words: &[S]) -> Option<&str> {
        self.node(words).and_then(|node| node.payload.as_deref())
    }

    /// Number of patterns.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Parses `pattern,payload` rows.
    ///
    /// Each row is split on its first comma; the pattern is split on
    /// whitespace. Blank lines and lines starting with `#` are skipped.
    pub fn from_rows(text: &str) -> LookupResult<Self> {
        let mut dictionary = Dictionary::new();
        for (i, line) in text.lines().enumerate() {
            let row = line.trim();
            if row.is_empty() || row.starts_with('#') {
                continue;
            }
            let Some((pattern, payload)) = row.split_once(',') else {
                return Err(LookupError::MalformedRow {
                    line: i + 1,
                    reason: "expected `pattern,payload`".into(),
                });
            };
            let words: Vec<&str> = pattern.split_whitespace().collect();
            if words.is_empty() {
                return Err(LookupError::MalformedRow {
                    line: i + 1,
                    reason: "empty pattern".into(),
                });
            }
            if !dictionary.insert(&words, payload.trim()) {
                tracing::debug!(line = i + 1, pattern, "duplicate pattern ignored");
            }
        }
        Ok(dictionary)
    }

    /// Reads and parses a rows file.
    pub fn load(path: &Path) -> LookupResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| LookupError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dictionary = Dictionary::from_rows(&text)?;
        tracing::info!(path = %path.display(), patterns = dictionary.len(), "loaded dictionary");
        Ok(dictionary)
    }
}
