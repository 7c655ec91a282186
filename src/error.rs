//! Error types for the rhyme engine.

use thiserror::Error;

/// The error type for every fallible operation in this crate.
#[derive(Debug, Error)]
pub enum RhymeError {
    /// A transcription contained a character outside the phonetic alphabet.
    #[error("invalid transcription {input:?}: unknown symbol {symbol:?}")]
    InvalidTranscription { input: String, symbol: char },

    /// The query word has no entry in the loaded dictionary.
    #[error("word not found in dictionary: {0:?}")]
    WordNotFound(String),

    /// A caller-supplied argument is out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A compiled dictionary is truncated or structurally malformed.
    #[error("corrupt dictionary data: {0}")]
    CorruptData(String),

    /// The configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// An error originating from reading or writing a dictionary file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` type alias using [`RhymeError`].
pub type Result<T> = std::result::Result<T, RhymeError>;
