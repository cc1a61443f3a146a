//! Bidirectional word/index mapping with occurrence counts
//!
//! Atom and bond vocabularies are built by feeding every symbol seen in a dataset through
//! [`Dictionary::add_word`], then optionally pruned to frequent words. Pruning renumbers the
//! surviving words, so any index stored elsewhere must be re-encoded afterwards.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use thiserror::Error;
use tracing::*;

/// A word or index isn't in the dictionary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("index {index} is out of range for a dictionary of {len} words")]
    Index { index: usize, len: usize },
    #[error("{0:?} is not in the dictionary")]
    Word(String),
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Dictionary {
    word2idx: AHashMap<String, usize>,
    idx2word: Vec<String>,
    word2num_occurence: AHashMap<String, usize>,
    idx2num_occurence: Vec<usize>,
}
impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `word` if it's new, and count one more occurence of it. Returns its index.
    pub fn add_word(&mut self, word: &str) -> usize {
        let idx = match self.word2idx.get(word) {
            Some(&idx) => idx,
            None => {
                let idx = self.idx2word.len();
                self.idx2word.push(word.to_string());
                self.word2idx.insert(word.to_string(), idx);
                self.idx2num_occurence.push(0);
                self.word2num_occurence.insert(word.to_string(), 0);
                trace!(word, idx, "new word");
                idx
            }
        };
        if let Some(n) = self.word2num_occurence.get_mut(word) {
            *n += 1;
        }
        self.idx2num_occurence[idx] += 1;
        idx
    }

    /// Drop every word seen fewer than `min_occurence` times, renumbering the rest in order.
    #[instrument(level = "debug", skip(self), fields(len = self.len()))]
    pub fn prune(&mut self, min_occurence: usize) {
        let idx2word = self
            .idx2word
            .iter()
            .filter(|w| self.occurence(w) >= min_occurence)
            .cloned()
            .collect::<Vec<_>>();
        let dropped = self.idx2word.len() - idx2word.len();
        if dropped > 0 {
            warn!(dropped, min_occurence, "pruned rare words, stored indices are invalidated");
        }
        let word2idx = idx2word
            .iter()
            .enumerate()
            .map(|(i, w)| (w.clone(), i))
            .collect();
        let idx2num_occurence = idx2word
            .iter()
            .map(|w| self.occurence(w))
            .collect::<Vec<_>>();
        let word2num_occurence = idx2word
            .iter()
            .zip(&idx2num_occurence)
            .map(|(w, &n)| (w.clone(), n))
            .collect();
        self.word2idx = word2idx;
        self.idx2word = idx2word;
        self.word2num_occurence = word2num_occurence;
        self.idx2num_occurence = idx2num_occurence;
    }

    pub fn len(&self) -> usize {
        self.idx2word.len()
    }
    pub fn is_empty(&self) -> bool {
        self.idx2word.is_empty()
    }

    pub fn word(&self, index: usize) -> Result<&str, LookupError> {
        self.idx2word
            .get(index)
            .map(String::as_str)
            .ok_or(LookupError::Index {
                index,
                len: self.len(),
            })
    }
    pub fn index(&self, word: &str) -> Result<usize, LookupError> {
        self.word2idx
            .get(word)
            .copied()
            .ok_or_else(|| LookupError::Word(word.to_string()))
    }
    pub fn contains(&self, word: &str) -> bool {
        self.word2idx.contains_key(word)
    }

    /// Number of times `word` was added, zero if it's unknown.
    pub fn occurence(&self, word: &str) -> usize {
        self.word2num_occurence.get(word).copied().unwrap_or(0)
    }
    pub fn occurence_at(&self, index: usize) -> Result<usize, LookupError> {
        self.idx2num_occurence
            .get(index)
            .copied()
            .ok_or(LookupError::Index {
                index,
                len: self.len(),
            })
    }

    /// Iterate over `(index, word, occurences)` in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str, usize)> + '_ {
        self.idx2word
            .iter()
            .zip(&self.idx2num_occurence)
            .enumerate()
            .map(|(i, (w, &n))| (i, w.as_str(), n))
    }
}

/// One line per word: index, word, and occurence count
impl Display for Dictionary {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (idx, word, n) in self.iter() {
            writeln!(f, "{idx}\t{word}\t number of occurences = {n}")?;
        }
        Ok(())
    }
}
