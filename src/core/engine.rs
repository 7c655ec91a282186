use crate::config::RhymeConfig;
use crate::core::index::RhymeIndex;
use crate::core::types::{PronunciationKey, RhymeMatch};
use crate::core::word_list::WordList;
use crate::error::{Result, RhymeError};
use crate::loaders::{self, DictionarySource};
use arc_swap::ArcSwap;
use log::info;
use std::sync::Arc;

/// Finds rhymes for a dictionary word, leaving the word itself out.
///
/// When the word has several pronunciations the first one loaded is used.
pub fn find_rhymes(
    index: &RhymeIndex,
    word: &str,
    limit: usize,
    min_shared_suffix: usize,
) -> Result<Vec<RhymeMatch>> {
    let entry = index
        .entry_for_word(word)
        .ok_or_else(|| RhymeError::WordNotFound(word.to_string()))?;
    index.query(&entry.pronunciation, limit, min_shared_suffix, Some(word))
}

/// Finds rhymes for a pronunciation directly, e.g. for words missing from
/// the dictionary.
pub fn find_rhymes_by_pronunciation(
    index: &RhymeIndex,
    pronunciation: &PronunciationKey,
    limit: usize,
    min_shared_suffix: usize,
) -> Result<Vec<RhymeMatch>> {
    index.query(pronunciation, limit, min_shared_suffix, None)
}

/// What the caller is asking rhymes for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Word(String),
    Transcription(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    pub limit: usize,
    pub min_shared_suffix: usize,
    /// Surface word to leave out of the results, for either kind of query.
    pub exclude_word: Option<String>,
    /// When `exclude_word` is unset, leave a queried word out of its own results.
    pub exclude_query_word: bool,
}

impl QueryOptions {
    /// The word to filter out when answering `query`.
    fn excluded<'a>(&'a self, query: &'a Query) -> Option<&'a str> {
        match (&self.exclude_word, query) {
            (Some(word), _) => Some(word.as_str()),
            (None, Query::Word(word)) if self.exclude_query_word => Some(word.as_str()),
            _ => None,
        }
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self { limit: 20, min_shared_suffix: 1, exclude_word: None, exclude_query_word: true }
    }
}

impl From<&RhymeConfig> for QueryOptions {
    fn from(config: &RhymeConfig) -> Self {
        Self {
            limit: config.limit,
            min_shared_suffix: config.min_shared_suffix,
            exclude_word: None,
            exclude_query_word: config.exclude_query_word,
        }
    }
}

/// The handle front ends hold: the current index behind an atomically
/// swappable pointer.
///
/// Queries pin the index they start with, so a concurrent [`replace`] or
/// [`reload`] never disturbs them; the old index is freed when its last
/// query finishes.
///
/// [`replace`]: RhymeEngine::replace
/// [`reload`]: RhymeEngine::reload
pub struct RhymeEngine {
    index: ArcSwap<RhymeIndex>,
}

impl RhymeEngine {
    pub fn new(index: RhymeIndex) -> Self {
        Self { index: ArcSwap::from_pointee(index) }
    }

    pub fn from_list(list: WordList) -> Self {
        Self::new(RhymeIndex::build(list))
    }

    /// Loads the dictionary named in the config.
    /// Returns the engine and the number of entries skipped while loading and indexing.
    pub fn from_config(config: &RhymeConfig) -> Result<(Self, usize)> {
        let source = loaders::open_source(config)?;
        let report = source.load()?;
        let index = RhymeIndex::build(report.list);
        let skipped = report.skipped + index.skipped();
        Ok((Self::new(index), skipped))
    }

    /// The index currently published.
    pub fn snapshot(&self) -> Arc<RhymeIndex> {
        self.index.load_full()
    }

    /// Publishes `index`, returning the one it replaces.
    pub fn replace(&self, index: RhymeIndex) -> Arc<RhymeIndex> {
        self.index.swap(Arc::new(index))
    }

    /// Loads `source`, builds a fresh index and publishes it. The current
    /// index stays in place if loading fails.
    pub fn reload(&self, source: &dyn DictionarySource) -> Result<usize> {
        let report = source.load()?;
        let index = RhymeIndex::build(report.list);
        let skipped = report.skipped + index.skipped();
        info!(
            "reloaded {:?} dictionary: {} entries, {} skipped",
            source.format(),
            index.len(),
            skipped
        );
        self.replace(index);
        Ok(skipped)
    }

    /// The single synchronous call the presentation layer makes.
    pub fn lookup(&self, query: &Query, options: &QueryOptions) -> Result<Vec<RhymeMatch>> {
        let index = self.index.load();
        let key = match query {
            Query::Word(word) => index
                .entry_for_word(word)
                .map(|entry| entry.pronunciation.clone())
                .ok_or_else(|| RhymeError::WordNotFound(word.clone()))?,
            Query::Transcription(text) => PronunciationKey::parse(text)?,
        };
        index.query(&key, options.limit, options.min_shared_suffix, options.excluded(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::WordEntry;
    use std::thread;

    fn sample_list() -> WordList {
        [
            ("Haus", "h a u s", 10.0),
            ("Maus", "m a u s", 5.0),
            ("Klaus", "k l a u s", 1.0),
            ("Tisch", "t i ʃ", 8.0),
        ]
        .iter()
        .map(|&(w, t, f)| WordEntry::parse(w, t, f).unwrap())
        .collect()
    }

    #[test]
    fn word_queries_leave_the_word_out() {
        let index = RhymeIndex::build(sample_list());
        let matches = find_rhymes(&index, "Haus", 2, 3).unwrap();
        let words: Vec<&str> = matches.iter().map(|m| m.entry.word.as_str()).collect();
        assert_eq!(words, ["Maus", "Klaus"]);
    }

    #[test]
    fn unknown_word_is_reported() {
        let index = RhymeIndex::build(sample_list());
        assert!(matches!(find_rhymes(&index, "Baum", 5, 1), Err(RhymeError::WordNotFound(w)) if w == "Baum"));
    }

    #[test]
    fn transcription_queries_work_for_unknown_words() {
        let engine = RhymeEngine::from_list(sample_list());
        let query = Query::Transcription("r a u s".into());
        let matches = engine.lookup(&query, &QueryOptions { limit: 5, min_shared_suffix: 3, ..QueryOptions::default() }).unwrap();
        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0].entry.word, "Haus");

        let bad = Query::Transcription("r a 9".into());
        assert!(matches!(engine.lookup(&bad, &QueryOptions::default()), Err(RhymeError::InvalidTranscription { .. })));
    }

    #[test]
    fn transcription_queries_can_exclude_a_word() {
        let engine = RhymeEngine::from_list(sample_list());
        let query = Query::Transcription("h a u s".into());
        let options = QueryOptions { limit: 5, min_shared_suffix: 3, exclude_word: Some("Haus".into()), ..QueryOptions::default() };
        let matches = engine.lookup(&query, &options).unwrap();
        let words: Vec<&str> = matches.iter().map(|m| m.entry.word.as_str()).collect();
        assert_eq!(words, ["Maus", "Klaus"]);

        // Without an explicit word, a transcription query excludes nothing.
        let all = engine.lookup(&query, &QueryOptions { limit: 5, min_shared_suffix: 3, ..QueryOptions::default() }).unwrap();
        assert_eq!(all[0].entry.word, "Haus");
    }

    #[test]
    fn explicit_exclusion_overrides_the_query_word() {
        let engine = RhymeEngine::from_list(sample_list());
        let options = QueryOptions { limit: 5, min_shared_suffix: 3, exclude_word: Some("Maus".into()), ..QueryOptions::default() };
        let matches = engine.lookup(&Query::Word("Haus".into()), &options).unwrap();
        let words: Vec<&str> = matches.iter().map(|m| m.entry.word.as_str()).collect();
        assert_eq!(words, ["Haus", "Klaus"]);
    }

    #[test]
    fn word_lookup_can_include_itself() {
        let engine = RhymeEngine::from_list(sample_list());
        let options = QueryOptions { limit: 1, min_shared_suffix: 1, exclude_query_word: false, ..QueryOptions::default() };
        let matches = engine.lookup(&Query::Word("Maus".into()), &options).unwrap();
        assert_eq!(matches[0].entry.word, "Maus");
        assert_eq!(matches[0].shared_suffix_length, 4);
    }

    #[test]
    fn first_pronunciation_wins_for_homographs() {
        let list: WordList = [("read", "r i d", 1.0), ("read", "r ɛ d", 1.0), ("bed", "b ɛ d", 1.0), ("seed", "s i d", 1.0)]
            .iter()
            .map(|&(w, t, f)| WordEntry::parse(w, t, f).unwrap())
            .collect();
        let index = RhymeIndex::build(list);
        let matches = find_rhymes(&index, "read", 5, 2).unwrap();
        let words: Vec<&str> = matches.iter().map(|m| m.entry.word.as_str()).collect();
        assert_eq!(words, ["seed"]);
    }

    #[test]
    fn pinned_snapshots_survive_replacement() {
        let engine = Arc::new(RhymeEngine::from_list(sample_list()));
        let pinned = engine.snapshot();

        let replacement: WordList = [("Tor", "t o ʁ", 1.0), ("Moor", "m o ʁ", 1.0)]
            .iter()
            .map(|&(w, t, f)| WordEntry::parse(w, t, f).unwrap())
            .collect();
        let old = engine.replace(RhymeIndex::build(replacement));

        assert!(Arc::ptr_eq(&old, &pinned));
        assert_eq!(find_rhymes(&pinned, "Haus", 5, 3).unwrap().len(), 2);
        assert!(matches!(
            engine.lookup(&Query::Word("Haus".into()), &QueryOptions::default()),
            Err(RhymeError::WordNotFound(_))
        ));
        assert_eq!(engine.lookup(&Query::Word("Tor".into()), &QueryOptions::default()).unwrap().len(), 1);
    }

    #[test]
    fn concurrent_queries_agree() {
        let engine = Arc::new(RhymeEngine::from_list(sample_list()));
        let expected = engine.lookup(&Query::Word("Haus".into()), &QueryOptions::default()).unwrap();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let engine = Arc::clone(&engine);
                thread::spawn(move || engine.lookup(&Query::Word("Haus".into()), &QueryOptions::default()).unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }
}
