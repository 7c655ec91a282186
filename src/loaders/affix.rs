// File: src/loaders/affix.rs
//! Word lists with affix rules.
//!
//! The word file is the plain format with an optional `/FLAGS` suffix on the
//! word. The rule file understands two directives:
//!
//! ```text
//! ICONV ß ss                  # spelling normalization, from -> to
//! SFX A 0 e 0 ə               # flag strip add pron_strip pron_add [condition]
//! SFX B e en 1 ən e
//! ```
//!
//! `0` stands for an empty `strip`, `add` or `pron_add`. `pron_strip` is a
//! number of trailing phonetic symbols. A rule only applies to stems ending
//! in `condition` (and in `strip`). Hunspell-style header lines such as
//! `SFX A Y 2` and unknown directives are ignored.

use super::plain::for_each_line;
use super::{parse_row, DictionarySource, LoadReport, SourceFormat};
use crate::core::phonetics;
use crate::core::types::{PronunciationKey, WordEntry};
use crate::core::word_list::WordList;
use crate::error::Result;
use log::{debug, info};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
struct SuffixRule {
    flag: char,
    strip: String,
    add: String,
    pron_strip: usize,
    pron_add: Vec<u8>,
    condition: String,
}

/// Parsed affix rules.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AffixRules {
    /// Sorted longest `from` first.
    iconv: Vec<(String, String)>,
    suffixes: Vec<SuffixRule>,
}

fn empty_marker(token: &str) -> &str {
    if token == "0" {
        ""
    } else {
        token
    }
}

impl AffixRules {
    /// Parses a rule file, returning the rules and the number of malformed
    /// rule lines.
    pub fn read<R: BufRead>(reader: R) -> Result<(Self, usize)> {
        let mut rules = Self::default();
        let skipped = for_each_line(reader, |line_no, line| rules.parse_line(line_no, line))?;
        // Stable, so equal lengths keep file order.
        rules.iconv.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));
        Ok((rules, skipped))
    }

    fn parse_line(&mut self, line_no: usize, line: &str) -> std::result::Result<(), String> {
        let line = line.split('#').next().unwrap_or_default();
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            [] => Ok(()),
            ["ICONV", count] if count.parse::<usize>().is_ok() => Ok(()),
            ["ICONV", from, to] => {
                self.iconv.push((from.to_string(), empty_marker(to).to_string()));
                Ok(())
            }
            ["ICONV", ..] => Err("ICONV needs a from and a to column".into()),
            ["SFX", _, "Y" | "N", count] if count.parse::<usize>().is_ok() => Ok(()),
            ["SFX", flag, strip, add, pron_strip, pron_add, rest @ ..] if rest.len() <= 1 => {
                let mut flag_chars = flag.chars();
                let flag = match (flag_chars.next(), flag_chars.next()) {
                    (Some(c), None) => c,
                    _ => return Err(format!("flag {flag:?} must be a single character")),
                };
                let pron_strip = pron_strip
                    .parse::<usize>()
                    .map_err(|_| format!("pronunciation strip count {pron_strip:?} is not a number"))?;
                let pron_add = phonetics::encode_transcription(empty_marker(pron_add)).map_err(|e| e.to_string())?;
                let condition = rest.first().map_or("", |&c| if c == "." { "" } else { c });
                self.suffixes.push(SuffixRule {
                    flag,
                    strip: empty_marker(strip).to_string(),
                    add: empty_marker(add).to_string(),
                    pron_strip,
                    pron_add,
                    condition: condition.to_string(),
                });
                Ok(())
            }
            ["SFX", ..] => Err("SFX needs flag, strip, add, pron_strip and pron_add columns".into()),
            [directive, ..] => {
                debug!("ignoring affix directive {} on line {}", directive, line_no);
                Ok(())
            }
        }
    }

    /// Applies the ICONV table to a surface form.
    pub fn normalize(&self, word: &str) -> String {
        let mut out = String::with_capacity(word.len());
        let mut rest = word;
        'outer: while !rest.is_empty() {
            for (from, to) in &self.iconv {
                if let Some(after) = rest.strip_prefix(from.as_str()) {
                    out.push_str(to);
                    rest = after;
                    continue 'outer;
                }
            }
            let mut chars = rest.chars();
            if let Some(c) = chars.next() {
                out.push(c);
            }
            rest = chars.as_str();
        }
        out
    }

    /// The stem followed by every form its flags derive, all normalized.
    pub fn expand(&self, stem: &str, flags: &str, pronunciation: &PronunciationKey, frequency: f64) -> Vec<WordEntry> {
        let mut out = vec![WordEntry::new(self.normalize(stem), pronunciation.clone(), frequency)];
        for rule in self.suffixes.iter().filter(|r| flags.contains(r.flag)) {
            if !stem.ends_with(&rule.condition) || !stem.ends_with(&rule.strip) {
                continue;
            }
            if rule.pron_strip > pronunciation.len() {
                continue;
            }
            let word = format!("{}{}", &stem[..stem.len() - rule.strip.len()], rule.add);
            let kept = &pronunciation.codes()[..pronunciation.len() - rule.pron_strip];
            let codes: Vec<u8> = kept.iter().chain(&rule.pron_add).copied().collect();
            if word.is_empty() || codes.is_empty() {
                continue;
            }
            // Codes come from a parsed key and a parsed transcription.
            if let Ok(key) = PronunciationKey::from_codes(&codes) {
                out.push(WordEntry::new(self.normalize(&word), key, frequency));
            }
        }
        out
    }
}

/// A flagged word file plus its affix rule file.
#[derive(Debug, Clone)]
pub struct AffixSource {
    words: PathBuf,
    rules: PathBuf,
}

impl AffixSource {
    pub fn new(words: impl Into<PathBuf>, rules: impl Into<PathBuf>) -> Self {
        Self { words: words.into(), rules: rules.into() }
    }
}

impl DictionarySource for AffixSource {
    fn format(&self) -> SourceFormat {
        SourceFormat::Affix
    }

    fn load(&self) -> Result<LoadReport> {
        let (rules, bad_rules) = AffixRules::read(BufReader::new(File::open(&self.rules)?))?;
        let mut report = read_affixed(BufReader::new(File::open(&self.words)?), &rules)?;
        report.skipped += bad_rules;
        info!(
            "loaded {} entries from {} with {} suffix rules ({} skipped)",
            report.list.len(),
            self.words.display(),
            rules.suffixes.len(),
            report.skipped
        );
        Ok(report)
    }
}

/// Reads flagged rows and expands each through `rules`.
pub fn read_affixed<R: BufRead>(reader: R, rules: &AffixRules) -> Result<LoadReport> {
    let mut list = WordList::new();
    let skipped = for_each_line(reader, |_, line| {
        if let Some(row) = parse_row(line)? {
            let (stem, flags) = row.word.split_once('/').unwrap_or((row.word, ""));
            if stem.is_empty() {
                return Err("empty word".into());
            }
            list.extend(rules.expand(stem, flags, &row.pronunciation, row.frequency));
        }
        Ok(())
    })?;
    Ok(LoadReport { list, skipped })
}
