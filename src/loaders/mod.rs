// File: src/loaders/mod.rs
//! Dictionary sources.
//!
//! A source is anything that can produce a [`WordList`]. The three shipped
//! formats are independent implementations of [`DictionarySource`], chosen
//! through the closed [`SourceFormat`] enum.

pub mod affix;
pub mod binary;
pub mod plain;

use crate::config::RhymeConfig;
use crate::core::types::{PronunciationKey, WordEntry};
use crate::core::word_list::WordList;
use crate::error::{Result, RhymeError};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

pub use affix::{AffixRules, AffixSource};
pub use binary::BinarySource;
pub use plain::PlainTextSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// `word<TAB>transcription[<TAB>frequency]` lines.
    Plain,
    /// Plain lines with `/FLAGS`, expanded through an affix rule file.
    Affix,
    /// The compiled format from [`crate::codec`].
    Binary,
}

impl SourceFormat {
    /// Guesses a format from a file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("bin") | Some("rhy") => SourceFormat::Binary,
            Some("dic") => SourceFormat::Affix,
            _ => SourceFormat::Plain,
        }
    }
}

impl FromStr for SourceFormat {
    type Err = RhymeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "plain" => Ok(SourceFormat::Plain),
            "affix" => Ok(SourceFormat::Affix),
            "binary" => Ok(SourceFormat::Binary),
            other => Err(RhymeError::InvalidArgument(format!(
                "unknown dictionary format {other:?} (expected plain, affix or binary)"
            ))),
        }
    }
}

/// The result of a load: the entries plus how many rows had to be dropped.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub list: WordList,
    pub skipped: usize,
}

/// Something that can produce a finite, repeatable sequence of entries.
pub trait DictionarySource {
    fn format(&self) -> SourceFormat;

    /// Reads the whole source. Each call reads it afresh.
    fn load(&self) -> Result<LoadReport>;
}

/// Opens the source the config describes.
pub fn open_source(config: &RhymeConfig) -> Result<Box<dyn DictionarySource>> {
    config.validate()?;
    let path = config
        .dictionary
        .clone()
        .ok_or_else(|| RhymeError::InvalidArgument("no dictionary configured".into()))?;
    Ok(match config.resolved_format() {
        SourceFormat::Plain => Box::new(PlainTextSource::new(path)),
        SourceFormat::Binary => Box::new(BinarySource::new(path)),
        SourceFormat::Affix => {
            let rules = config
                .affix
                .clone()
                .ok_or_else(|| RhymeError::InvalidArgument("the affix format needs an affix rule file".into()))?;
            Box::new(AffixSource::new(path, rules))
        }
    })
}

/// One parsed data row, before any affix expansion.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Row<'a> {
    pub word: &'a str,
    pub pronunciation: PronunciationKey,
    pub frequency: f64,
}

/// Splits a `word<TAB>transcription[<TAB>frequency]` line.
/// Returns `Ok(None)` for blank and comment lines and `Err(reason)` for bad rows.
pub(crate) fn parse_row(line: &str) -> std::result::Result<Option<Row<'_>>, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() || line.trim_start().starts_with('#') {
        return Ok(None);
    }
    let mut fields = line.split('\t');
    let word = fields.next().unwrap_or_default().trim();
    let transcription = fields.next().ok_or("missing transcription column")?;
    let frequency = match fields.next().map(str::trim) {
        None | Some("") => 1.0,
        Some(text) => text.parse::<f64>().map_err(|e| format!("bad frequency {text:?}: {e}"))?,
    };
    if fields.next().is_some() {
        return Err("too many columns".into());
    }
    if word.is_empty() {
        return Err("empty word".into());
    }
    if !frequency.is_finite() || frequency < 0.0 {
        return Err(format!("frequency must be a non-negative number, got {frequency}"));
    }
    let pronunciation = PronunciationKey::parse(transcription).map_err(|e| e.to_string())?;
    if pronunciation.is_empty() {
        return Err("empty transcription".into());
    }
    Ok(Some(Row { word, pronunciation, frequency }))
}

/// Writes `list` in the plain text format.
pub fn write_plain<W: Write>(list: &WordList, writer: &mut W) -> Result<()> {
    for WordEntry { word, pronunciation, frequency } in list.entries() {
        writeln!(writer, "{word}\t{pronunciation}\t{frequency}")?;
    }
    writer.flush()?;
    Ok(())
}
