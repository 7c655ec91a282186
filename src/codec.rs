// File: src/codec.rs
//! The compiled dictionary format.
//!
//! ```text
//! magic        4 bytes   "RHYM"
//! version      u16
//! entry_count  u32
//! entry_count times:
//!   word_len   u16, then word_len bytes of UTF-8
//!   pron_len   u16, then pron_len phonetic symbol codes (one byte each)
//!   frequency  f64
//! ```
//!
//! All integers are little-endian. Decoding is all-or-nothing: the first
//! structural problem aborts with `CorruptData` and no partial list is returned.

use crate::core::types::{PronunciationKey, WordEntry};
use crate::core::word_list::WordList;
use crate::error::{Result, RhymeError};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::debug;

pub const MAGIC: [u8; 4] = *b"RHYM";
pub const VERSION: u16 = 1;

const HEADER_LEN: usize = 4 + 2 + 4;
/// Smallest possible entry: two empty length-prefixed fields and a frequency.
const MIN_ENTRY_LEN: usize = 2 + 2 + 8;

/// Serializes `list` in insertion order.
pub fn encode(list: &WordList) -> Result<Vec<u8>> {
    let count = u32::try_from(list.len())
        .map_err(|_| RhymeError::InvalidArgument(format!("too many entries to encode: {}", list.len())))?;

    let mut out = Vec::with_capacity(HEADER_LEN + list.len() * (MIN_ENTRY_LEN + 16));
    out.extend_from_slice(&MAGIC);
    // Writes into a Vec cannot fail.
    out.write_u16::<LittleEndian>(VERSION)?;
    out.write_u32::<LittleEndian>(count)?;

    for entry in list.entries() {
        write_field(&mut out, entry.word.as_bytes(), "word", &entry.word)?;
        write_field(&mut out, entry.pronunciation.codes(), "pronunciation", &entry.word)?;
        out.write_f64::<LittleEndian>(entry.frequency)?;
    }
    debug!("encoded {} entries into {} bytes", count, out.len());
    Ok(out)
}

fn write_field(out: &mut Vec<u8>, bytes: &[u8], field: &str, word: &str) -> Result<()> {
    let len = u16::try_from(bytes.len()).map_err(|_| {
        RhymeError::InvalidArgument(format!("{field} of {word:?} is too long to encode ({} bytes)", bytes.len()))
    })?;
    out.write_u16::<LittleEndian>(len)?;
    out.extend_from_slice(bytes);
    Ok(())
}

/// A bounds-checked reader over the encoded buffer.
struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(RhymeError::CorruptData(format!(
                "{what} needs {len} bytes at offset {} but only {} remain",
                self.pos,
                self.remaining()
            )));
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn u16(&mut self, what: &str) -> Result<u16> {
        let mut bytes = self.take(2, what)?;
        Ok(bytes.read_u16::<LittleEndian>()?)
    }

    fn u32(&mut self, what: &str) -> Result<u32> {
        let mut bytes = self.take(4, what)?;
        Ok(bytes.read_u32::<LittleEndian>()?)
    }

    fn f64(&mut self, what: &str) -> Result<f64> {
        let mut bytes = self.take(8, what)?;
        Ok(bytes.read_f64::<LittleEndian>()?)
    }

    fn prefixed(&mut self, what: &str) -> Result<&'a [u8]> {
        let len = self.u16(what)? as usize;
        self.take(len, what)
    }
}

/// Parses a buffer produced by [`encode`].
pub fn decode(bytes: &[u8]) -> Result<WordList> {
    let mut cursor = Cursor { buf: bytes, pos: 0 };

    let magic = cursor.take(MAGIC.len(), "magic")?;
    if magic != MAGIC {
        return Err(RhymeError::CorruptData(format!("bad magic {magic:02x?}")));
    }
    let version = cursor.u16("version")?;
    if version != VERSION {
        return Err(RhymeError::CorruptData(format!("unsupported format version {version}")));
    }
    let count = cursor.u32("entry count")? as usize;
    debug!("decoding {} entries from {} bytes (format v{})", count, bytes.len(), version);

    // Never trust the count for allocation beyond what the buffer could hold.
    let mut list = WordList::with_capacity(count.min(cursor.remaining() / MIN_ENTRY_LEN));
    for n in 0..count {
        let word = cursor.prefixed("word")?;
        let word = std::str::from_utf8(word)
            .map_err(|e| RhymeError::CorruptData(format!("entry {n}: word is not UTF-8: {e}")))?;
        let pronunciation = PronunciationKey::from_codes(cursor.prefixed("pronunciation")?)
            .map_err(|e| RhymeError::CorruptData(format!("entry {n} ({word:?}): {e}")))?;
        let frequency = cursor.f64("frequency")?;
        list.add(WordEntry::new(word, pronunciation, frequency));
    }

    if cursor.remaining() != 0 {
        return Err(RhymeError::CorruptData(format!(
            "{} trailing bytes after {} entries",
            cursor.remaining(),
            count
        )));
    }
    Ok(list)
}
