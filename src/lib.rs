// src/lib.rs
//! Phonetic rhyme lookup.
//!
//! A loader turns a dictionary file into a [`WordList`], [`RhymeIndex::build`]
//! sorts it by reversed pronunciation once, and queries walk outward from the
//! query's position in that order. [`RhymeEngine`] holds the current index
//! and swaps in rebuilt ones without blocking readers.

pub mod codec;
pub mod config;
pub mod core;
pub mod error;
pub mod loaders;
pub mod persistence;

pub use crate::config::RhymeConfig;
pub use crate::core::engine::{find_rhymes, find_rhymes_by_pronunciation, Query, QueryOptions, RhymeEngine};
pub use crate::core::index::RhymeIndex;
pub use crate::core::types::{PronunciationKey, RhymeMatch, WordEntry};
pub use crate::core::word_list::WordList;
pub use crate::error::{Result, RhymeError};
pub use crate::loaders::{DictionarySource, LoadReport, SourceFormat};
