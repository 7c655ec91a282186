// File: src/loaders/binary.rs
use super::{DictionarySource, LoadReport, SourceFormat};
use crate::error::Result;
use crate::persistence::load_from_disk;
use log::info;
use std::path::PathBuf;

/// A dictionary precompiled with [`crate::persistence::save_to_disk`].
///
/// Corruption is fatal here: a compiled file has no rows to skip.
#[derive(Debug, Clone)]
pub struct BinarySource {
    path: PathBuf,
}

impl BinarySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DictionarySource for BinarySource {
    fn format(&self) -> SourceFormat {
        SourceFormat::Binary
    }

    fn load(&self) -> Result<LoadReport> {
        let list = load_from_disk(&self.path)?;
        info!("loaded {} compiled entries from {}", list.len(), self.path.display());
        Ok(LoadReport { list, skipped: 0 })
    }
}
