// File: src/config.rs
//! Dictionary and query settings, read from a JSON file.
//!
//! Every field has a default, so a config file only names what it changes:
//!
//! ```json
//! { "dictionary": "de.dic", "format": "affix", "affix": "de.aff", "limit": 10 }
//! ```

use crate::error::{Result, RhymeError};
use crate::loaders::SourceFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RhymeConfig {
    /// Dictionary file to load.
    pub dictionary: Option<PathBuf>,
    /// How to read `dictionary`. When absent it is inferred from the file extension.
    pub format: Option<SourceFormat>,
    /// Rule file for the `affix` format.
    pub affix: Option<PathBuf>,
    pub limit: usize,
    pub min_shared_suffix: usize,
    pub exclude_query_word: bool,
}

impl Default for RhymeConfig {
    fn default() -> Self {
        Self {
            dictionary: None,
            format: None,
            affix: None,
            limit: 20,
            min_shared_suffix: 1,
            exclude_query_word: true,
        }
    }
}

impl RhymeConfig {
    /// Parses and validates a complete config.
    pub fn from_json(json: &str) -> Result<Self> {
        let config = Self::parse(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let config = Self::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses without validating, for callers that layer overrides on top
    /// and call [`RhymeConfig::validate`] afterwards.
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| RhymeError::Config(e.to_string()))
    }

    pub fn read_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::parse(&json)
    }

    /// The format to load `dictionary` with: explicit, or guessed from its extension.
    pub fn resolved_format(&self) -> SourceFormat {
        match (&self.format, &self.dictionary) {
            (Some(format), _) => *format,
            (None, Some(path)) => SourceFormat::from_path(path),
            (None, None) => SourceFormat::Plain,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(RhymeError::InvalidArgument("limit must be at least 1".into()));
        }
        if self.min_shared_suffix == 0 {
            return Err(RhymeError::InvalidArgument("min_shared_suffix must be at least 1".into()));
        }
        if self.resolved_format() == SourceFormat::Affix && self.affix.is_none() {
            return Err(RhymeError::InvalidArgument("the affix format needs an affix rule file".into()));
        }
        Ok(())
    }
}
