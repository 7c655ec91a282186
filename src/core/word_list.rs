// src/core/word_list.rs
use crate::core::types::WordEntry;

/// An ordered, append-only collection of entries produced by a loader.
///
/// Insertion order is preserved so that re-serializing a list is
/// deterministic and so that "first entry for a word" is well defined.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordList {
    entries: Vec<WordEntry>,
}

impl WordList {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: Vec::with_capacity(capacity) }
    }

    /// Appends an entry. Duplicates are kept.
    pub fn add(&mut self, entry: WordEntry) {
        self.entries.push(entry);
    }

    /// Entries in insertion order. Each call starts a fresh iteration.
    pub fn entries(&self) -> std::slice::Iter<'_, WordEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn into_entries(self) -> Vec<WordEntry> {
        self.entries
    }
}

impl FromIterator<WordEntry> for WordList {
    fn from_iter<I: IntoIterator<Item = WordEntry>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

impl Extend<WordEntry> for WordList {
    fn extend<I: IntoIterator<Item = WordEntry>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl<'a> IntoIterator for &'a WordList {
    type Item = &'a WordEntry;
    type IntoIter = std::slice::Iter<'a, WordEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries()
    }
}
