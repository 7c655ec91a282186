// File: src/core/phonetics.rs
//! The fixed phonetic alphabet shared by transcriptions and the compiled format.
//!
//! A symbol's code is its position in [`ALPHABET`] plus one, so code 0 never
//! names a symbol. Codes are what a compiled dictionary stores, one byte per
//! symbol, so the table may only ever be appended to.

use crate::error::{Result, RhymeError};

/// Every recognized phonetic symbol, in code order.
pub const ALPHABET: &[char] = &[
    // Latin letters as used in IPA
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm',
    'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
    // Vowels
    'ɑ', 'ɐ', 'ɒ', 'æ', 'ɔ', 'ə', 'ɚ', 'ɛ', 'ɜ', 'ɝ', 'ɪ', 'ɨ', 'ʊ', 'ʉ',
    'ʌ', 'ø', 'œ', 'ɶ', 'ɤ', 'ɯ', 'ʏ', 'ɘ', 'ɵ', 'ɞ',
    // Consonants
    'ŋ', 'ɲ', 'ɳ', 'ɴ', 'ɱ', 'ʃ', 'ʒ', 'θ', 'ð', 'ç', 'ʝ', 'ɣ', 'χ', 'ʁ',
    'ʀ', 'ɾ', 'ɹ', 'ɻ', 'ʎ', 'ɫ', 'ɬ', 'ɮ', 'ʔ', 'ɡ', 'ɦ', 'ʋ', 'ɰ', 'ʂ',
    'ʐ', 'ɕ', 'ʑ', 'ɸ', 'β', 'ʈ', 'ɖ', 'ɟ', 'ɢ', 'ħ', 'ʕ', 'ʍ', 'ɥ', 'ɭ',
    'ʙ', 'ʜ',
    // Affricate ligatures
    'ʧ', 'ʤ', 'ʦ',
    // Length marks and diacritics that change the sound
    'ː', 'ˑ', '\u{303}', '\u{329}',
];

/// Stress marks and separators that carry no sound of their own.
const IGNORED: &[char] = &['ˈ', 'ˌ', '\'', '.'];

/// Maps a transcription character to its symbol code.
pub fn symbol_code(c: char) -> Option<u8> {
    ALPHABET
        .iter()
        .position(|&symbol| symbol == c)
        .map(|idx| (idx + 1) as u8)
}

/// Maps a symbol code back to its character.
pub fn symbol_char(code: u8) -> Option<char> {
    if code == 0 {
        return None;
    }
    ALPHABET.get(code as usize - 1).copied()
}

pub fn is_valid_code(code: u8) -> bool {
    symbol_char(code).is_some()
}

/// Converts a transcription string into symbol codes, leading to trailing.
///
/// Whitespace and the characters in `IGNORED` are skipped. An empty (or
/// all-separator) transcription yields an empty sequence.
pub fn encode_transcription(transcription: &str) -> Result<Vec<u8>> {
    let mut codes = Vec::with_capacity(transcription.len());
    for c in transcription.chars() {
        if c.is_whitespace() || IGNORED.contains(&c) {
            continue;
        }
        match symbol_code(c) {
            Some(code) => codes.push(code),
            None => {
                return Err(RhymeError::InvalidTranscription {
                    input: transcription.to_string(),
                    symbol: c,
                })
            }
        }
    }
    Ok(codes)
}
