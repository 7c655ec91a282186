// src/core/types.rs
use crate::core::phonetics;
use crate::error::{Result, RhymeError};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Position of an entry in its word list, in insertion order.
pub type EntryId = usize;

/// An immutable sequence of phonetic symbol codes, leading to trailing.
///
/// Comparison for indexing is done on the reversed sequence, see
/// [`PronunciationKey::cmp_reversed`]; the reversed form is never stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PronunciationKey {
    symbols: Box<[u8]>,
}

impl PronunciationKey {
    /// Parses a transcription such as `"h a u s"` or `"ˈhaʊs"`.
    pub fn parse(transcription: &str) -> Result<Self> {
        let codes = phonetics::encode_transcription(transcription)?;
        Ok(Self { symbols: codes.into_boxed_slice() })
    }

    /// Builds a key from raw symbol codes, as stored in the compiled format.
    pub fn from_codes(codes: &[u8]) -> Result<Self> {
        if let Some(&bad) = codes.iter().find(|&&c| !phonetics::is_valid_code(c)) {
            return Err(RhymeError::CorruptData(format!("unknown phonetic symbol code {bad}")));
        }
        Ok(Self { symbols: codes.into() })
    }

    pub fn codes(&self) -> &[u8] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols from the last sound backwards.
    pub fn reversed(&self) -> impl Iterator<Item = u8> + '_ {
        self.symbols.iter().rev().copied()
    }

    /// Number of trailing symbols `a` and `b` have in common.
    pub fn common_suffix_length(a: &Self, b: &Self) -> usize {
        a.reversed().zip(b.reversed()).take_while(|(x, y)| x == y).count()
    }

    /// Lexicographic order over the reversed symbol sequences, so keys that
    /// end in the same sounds sort next to each other.
    pub fn cmp_reversed(&self, other: &Self) -> Ordering {
        self.reversed().cmp(other.reversed())
    }
}

impl fmt::Display for PronunciationKey {
    /// Canonical transcription: one space between symbols.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, &code) in self.symbols.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            let c = phonetics::symbol_char(code).ok_or(fmt::Error)?;
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl Serialize for PronunciationKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One dictionary record.
/// Homographs and homophones are separate entries and are never merged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordEntry {
    pub word: String,
    pub pronunciation: PronunciationKey,
    /// Relative usage weight; larger means more common.
    pub frequency: f64,
}

impl WordEntry {
    pub fn new(word: impl Into<String>, pronunciation: PronunciationKey, frequency: f64) -> Self {
        Self { word: word.into(), pronunciation, frequency }
    }

    /// Convenience constructor that parses the transcription.
    pub fn parse(word: &str, transcription: &str, frequency: f64) -> Result<Self> {
        Ok(Self::new(word, PronunciationKey::parse(transcription)?, frequency))
    }
}

/// A ranked query result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RhymeMatch {
    pub entry: WordEntry,
    pub shared_suffix_length: usize,
}
