// File: src/loaders/plain.rs
use super::{parse_row, DictionarySource, LoadReport, SourceFormat};
use crate::core::types::WordEntry;
use crate::core::word_list::WordList;
use crate::error::Result;
use log::{info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

/// A tab-separated word/transcription/frequency file.
#[derive(Debug, Clone)]
pub struct PlainTextSource {
    path: PathBuf,
}

impl PlainTextSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DictionarySource for PlainTextSource {
    fn format(&self) -> SourceFormat {
        SourceFormat::Plain
    }

    fn load(&self) -> Result<LoadReport> {
        let reader = BufReader::new(File::open(&self.path)?);
        let report = read_plain(reader)?;
        info!(
            "loaded {} entries from {} ({} skipped)",
            report.list.len(),
            self.path.display(),
            report.skipped
        );
        Ok(report)
    }
}

/// Reads plain rows. Bad rows are logged and counted, never fatal; only an
/// I/O failure aborts.
pub fn read_plain<R: BufRead>(reader: R) -> Result<LoadReport> {
    let mut list = WordList::new();
    let skipped = for_each_line(reader, |_, line| {
        if let Some(row) = parse_row(line)? {
            list.add(WordEntry::new(row.word, row.pronunciation, row.frequency));
        }
        Ok(())
    })?;
    Ok(LoadReport { list, skipped })
}

/// Calls `f` with each line (1-based number, text). Lines that `f` rejects
/// or that are not valid UTF-8 are logged and counted; the count is returned.
pub(crate) fn for_each_line<R, F>(reader: R, mut f: F) -> Result<usize>
where
    R: BufRead,
    F: FnMut(usize, &str) -> std::result::Result<(), String>,
{
    let mut skipped = 0;
    for (idx, bytes) in reader.split(b'\n').enumerate() {
        let line_no = idx + 1;
        let bytes = bytes?;
        let outcome = std::str::from_utf8(&bytes)
            .map_err(|_| "not valid UTF-8".to_string())
            .and_then(|line| f(line_no, line));
        if let Err(reason) = outcome {
            warn!("skipping line {}: {}", line_no, reason);
            skipped += 1;
        }
    }
    Ok(skipped)
}
