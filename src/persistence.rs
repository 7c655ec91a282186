// File: src/persistence.rs
use crate::codec;
use crate::core::word_list::WordList;
use crate::error::Result;
use log::debug;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Writes `list` in the compiled format.
///
/// The bytes go to a temporary file next to `path` which then replaces
/// `path`, so readers never see a half-written dictionary.
pub fn save_to_disk(list: &WordList, path: &Path) -> Result<()> {
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;

    let bytes = codec::encode(list)?;
    let mut temp_file = NamedTempFile::new_in(parent_dir)?;
    temp_file.write_all(&bytes)?;
    temp_file.as_file().sync_all()?;
    temp_file.persist(path).map_err(|e| e.error)?;
    debug!("saved {} entries ({} bytes) to {}", list.len(), bytes.len(), path.display());
    Ok(())
}

pub fn load_from_disk(path: &Path) -> Result<WordList> {
    let bytes = fs::read(path)?;
    codec::decode(&bytes)
}
