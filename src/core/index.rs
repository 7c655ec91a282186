// --- File: src/core/index.rs
use crate::core::types::{EntryId, PronunciationKey, RhymeMatch, WordEntry};
use crate::core::word_list::WordList;
use crate::error::{Result, RhymeError};
use log::{info, trace, warn};
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};
use std::ops::Range;

/// An immutable rhyme index built once from a [`WordList`].
///
/// Entries are kept in insertion order; `sorted` holds their ids ordered by
/// reversed pronunciation (stable for ties), and `groups` splits `sorted`
/// into runs of identical pronunciations. Walking outward from a query's
/// position in that order visits candidates in non-increasing shared-suffix
/// length on each side, which is what lets a query stop early.
#[derive(Debug)]
pub struct RhymeIndex {
    entries: Vec<WordEntry>,
    sorted: Vec<EntryId>,
    groups: Vec<Range<usize>>,
    /// Highest entry frequency in each group.
    group_max_frequency: Vec<f64>,
    by_word: HashMap<String, Vec<EntryId>>,
    skipped: usize,
}

/// A match under consideration. Greater means better ranked.
#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
    shared: usize,
    frequency: f64,
    word: &'a str,
    id: EntryId,
}

impl Ord for Candidate<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.shared
            .cmp(&other.shared)
            .then_with(|| self.frequency.total_cmp(&other.frequency))
            .then_with(|| other.word.cmp(self.word))
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for Candidate<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate<'_> {}

impl RhymeIndex {
    /// Builds the index, consuming the list. O(n log n).
    ///
    /// Entries with an empty word, an empty pronunciation, or a negative or
    /// non-finite frequency cannot be ranked; they are dropped and counted in
    /// [`RhymeIndex::skipped`].
    pub fn build(list: WordList) -> Self {
        let mut entries = Vec::with_capacity(list.len());
        let mut skipped = 0;
        for entry in list.into_entries() {
            if entry.word.is_empty()
                || entry.pronunciation.is_empty()
                || !entry.frequency.is_finite()
                || entry.frequency < 0.0
            {
                warn!("skipping unindexable entry {:?} ({:?}, {})", entry.word, entry.pronunciation.to_string(), entry.frequency);
                skipped += 1;
                continue;
            }
            entries.push(entry);
        }

        let mut sorted: Vec<EntryId> = (0..entries.len()).collect();
        // sort_by is stable, so equal keys stay in insertion order.
        sorted.sort_by(|&a, &b| entries[a].pronunciation.cmp_reversed(&entries[b].pronunciation));

        let mut groups = Vec::new();
        let mut start = 0;
        for i in 1..=sorted.len() {
            if i == sorted.len()
                || entries[sorted[i]].pronunciation != entries[sorted[start]].pronunciation
            {
                groups.push(start..i);
                start = i;
            }
        }

        let group_max_frequency = groups
            .iter()
            .map(|g| sorted[g.clone()].iter().map(|&id| entries[id].frequency).fold(0.0, f64::max))
            .collect();

        let mut by_word: HashMap<String, Vec<EntryId>> = HashMap::new();
        for (id, entry) in entries.iter().enumerate() {
            by_word.entry(entry.word.clone()).or_default().push(id);
        }

        info!(
            "built rhyme index: {} entries, {} distinct pronunciations, {} skipped",
            entries.len(),
            groups.len(),
            skipped
        );
        Self { entries, sorted, groups, group_max_frequency, by_word, skipped }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries dropped at build time.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Number of distinct pronunciations.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Indexed entries in their original insertion order.
    pub fn entries(&self) -> std::slice::Iter<'_, WordEntry> {
        self.entries.iter()
    }

    /// The first entry (in insertion order) spelled `word`.
    pub fn entry_for_word(&self, word: &str) -> Option<&WordEntry> {
        self.by_word.get(word).and_then(|ids| ids.first()).map(|&id| &self.entries[id])
    }

    /// Every entry spelled `word`, in insertion order.
    pub fn homographs(&self, word: &str) -> Vec<&WordEntry> {
        self.by_word
            .get(word)
            .map(|ids| ids.iter().map(|&id| &self.entries[id]).collect())
            .unwrap_or_default()
    }

    fn group_key(&self, group: usize) -> &PronunciationKey {
        &self.entries[self.sorted[self.groups[group].start]].pronunciation
    }

    fn shared_with(&self, group: usize, target: &PronunciationKey) -> usize {
        PronunciationKey::common_suffix_length(self.group_key(group), target)
    }

    /// Finds the best rhymes for `target`.
    ///
    /// Results are ordered by shared suffix length, then frequency (both
    /// descending), then word (codepoint order), then insertion order. At
    /// most `limit` matches are returned, and none sharing fewer than
    /// `min_shared_suffix` trailing symbols.
    pub fn query(
        &self,
        target: &PronunciationKey,
        limit: usize,
        min_shared_suffix: usize,
        exclude_word: Option<&str>,
    ) -> Result<Vec<RhymeMatch>> {
        self.search(target, limit, min_shared_suffix, exclude_word).map(|(matches, _)| matches)
    }

    /// [`RhymeIndex::query`], also returning how many groups had their
    /// entries scanned.
    fn search(
        &self,
        target: &PronunciationKey,
        limit: usize,
        min_shared_suffix: usize,
        exclude_word: Option<&str>,
    ) -> Result<(Vec<RhymeMatch>, usize)> {
        if limit == 0 {
            return Err(RhymeError::InvalidArgument("limit must be at least 1".into()));
        }
        if min_shared_suffix == 0 {
            return Err(RhymeError::InvalidArgument("min_shared_suffix must be at least 1".into()));
        }
        if target.len() < min_shared_suffix {
            return Ok((Vec::new(), 0));
        }

        // Groups [0, pos) sort before the target, [pos, len) at or after it.
        let pos = self
            .groups
            .partition_point(|g| self.entries[self.sorted[g.start]].pronunciation.cmp_reversed(target) == Ordering::Less);

        // Min-heap on rank: the root is the worst match kept so far.
        let mut heap: BinaryHeap<Reverse<Candidate<'_>>> = BinaryHeap::with_capacity(limit + 1);
        let mut left = pos;
        let mut right = pos;
        let mut visited = 0usize;

        loop {
            let left_shared = left.checked_sub(1).map(|g| self.shared_with(g, target));
            let right_shared = (right < self.groups.len()).then(|| self.shared_with(right, target));

            let (group, shared) = match (left_shared, right_shared) {
                (Some(l), Some(r)) if l >= r => {
                    left -= 1;
                    (left, l)
                }
                (_, Some(r)) => {
                    right += 1;
                    (right - 1, r)
                }
                (Some(l), None) => {
                    left -= 1;
                    (left, l)
                }
                (None, None) => break,
            };

            // Both directions only get worse from here.
            if shared < min_shared_suffix {
                break;
            }
            if heap.len() == limit {
                if let Some(Reverse(worst)) = heap.peek() {
                    if shared < worst.shared {
                        break;
                    }
                    // Nothing in this group can outrank the worst kept match.
                    if shared == worst.shared && self.group_max_frequency[group] < worst.frequency {
                        continue;
                    }
                }
            }

            visited += 1;
            for &id in &self.sorted[self.groups[group].clone()] {
                let entry = &self.entries[id];
                if exclude_word == Some(entry.word.as_str()) {
                    continue;
                }
                let candidate = Candidate { shared, frequency: entry.frequency, word: &entry.word, id };
                if heap.len() < limit {
                    heap.push(Reverse(candidate));
                } else if let Some(mut worst) = heap.peek_mut() {
                    if candidate > worst.0 {
                        *worst = Reverse(candidate);
                    }
                }
            }
        }

        trace!("rhyme query {:?}: visited {} of {} groups, kept {}", target.to_string(), visited, self.groups.len(), heap.len());

        let matches = heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(c)| RhymeMatch {
                entry: self.entries[c.id].clone(),
                shared_suffix_length: c.shared,
            })
            .collect();
        Ok((matches, visited))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(rows: &[(&str, &str, f64)]) -> WordList {
        rows.iter()
            .map(|&(w, t, f)| WordEntry::parse(w, t, f).unwrap())
            .collect()
    }

    fn sample() -> RhymeIndex {
        RhymeIndex::build(list(&[
            ("Haus", "h a u s", 10.0),
            ("Maus", "m a u s", 5.0),
            ("Klaus", "k l a u s", 1.0),
            ("Tisch", "t i ʃ", 8.0),
        ]))
    }

    fn words(matches: &[RhymeMatch]) -> Vec<&str> {
        matches.iter().map(|m| m.entry.word.as_str()).collect()
    }

    #[test]
    fn finds_rhymes_for_haus() {
        let index = sample();
        let target = PronunciationKey::parse("h a u s").unwrap();
        let matches = index.query(&target, 2, 3, Some("Haus")).unwrap();
        assert_eq!(words(&matches), ["Maus", "Klaus"]);
        assert!(matches.iter().all(|m| m.shared_suffix_length == 3));
    }

    #[test]
    fn non_rhymes_are_filtered_by_min_shared() {
        let index = sample();
        let target = PronunciationKey::parse("h a u s").unwrap();
        let matches = index.query(&target, 10, 1, None).unwrap();
        assert_eq!(words(&matches), ["Haus", "Maus", "Klaus"]);
        assert_eq!(matches[0].shared_suffix_length, 4);
    }

    #[test]
    fn zero_limit_is_rejected() {
        let index = sample();
        let target = PronunciationKey::parse("h a u s").unwrap();
        assert!(matches!(index.query(&target, 0, 1, None), Err(RhymeError::InvalidArgument(_))));
        assert!(matches!(index.query(&target, 1, 0, None), Err(RhymeError::InvalidArgument(_))));
    }

    #[test]
    fn empty_results_are_not_errors() {
        let index = sample();
        let target = PronunciationKey::parse("b o").unwrap();
        assert!(index.query(&target, 5, 1, None).unwrap().is_empty());
        assert!(index.query(&PronunciationKey::default(), 5, 1, None).unwrap().is_empty());
        assert!(RhymeIndex::build(WordList::new()).query(&target, 5, 1, None).unwrap().is_empty());
    }

    #[test]
    fn empty_pronunciations_are_skipped_and_counted() {
        let mut words = list(&[("Haus", "h a u s", 1.0)]);
        words.add(WordEntry::new("Leer", PronunciationKey::default(), 1.0));
        words.add(WordEntry::new("Nan", PronunciationKey::parse("n a n").unwrap(), f64::NAN));
        let index = RhymeIndex::build(words);
        assert_eq!(index.len(), 1);
        assert_eq!(index.skipped(), 2);
    }

    #[test]
    fn ties_break_by_frequency_then_word() {
        let index = RhymeIndex::build(list(&[
            ("zot", "z ɔ t", 2.0),
            ("bot", "b ɔ t", 2.0),
            ("got", "g ɔ t", 9.0),
            ("lot", "l ɔ t", 2.0),
        ]));
        let target = PronunciationKey::parse("d ɔ t").unwrap();
        let matches = index.query(&target, 10, 2, None).unwrap();
        assert_eq!(words(&matches), ["got", "bot", "lot", "zot"]);
    }

    #[test]
    fn homophones_and_homographs_are_all_returned() {
        let index = RhymeIndex::build(list(&[
            ("read", "r i d", 3.0),
            ("reed", "r i d", 1.0),
            ("read", "r ɛ d", 2.0),
            ("bead", "b i d", 4.0),
        ]));
        assert_eq!(index.group_count(), 3);
        assert_eq!(index.homographs("read").len(), 2);
        assert_eq!(index.entry_for_word("read").unwrap().pronunciation.to_string(), "r i d");

        let target = PronunciationKey::parse("r i d").unwrap();
        let matches = index.query(&target, 10, 2, None).unwrap();
        assert_eq!(words(&matches), ["read", "reed", "bead"]);
    }

    #[test]
    fn limit_truncates_the_ranking() {
        let index = RhymeIndex::build(list(&[
            ("a", "b a", 1.0),
            ("b", "k a", 2.0),
            ("c", "d a", 3.0),
            ("d", "f a", 4.0),
            ("e", "g a", 5.0),
        ]));
        let target = PronunciationKey::parse("a").unwrap();
        let matches = index.query(&target, 3, 1, None).unwrap();
        assert_eq!(words(&matches), ["e", "d", "c"]);
    }

    #[test]
    fn early_stop_matches_a_full_scan() {
        let syllables = ["a", "e", "i", "o", "u", "ə"];
        let consonants = ["b", "d", "k", "l", "m", "n", "s", "t"];
        let mut rows = Vec::new();
        let mut n = 0u32;
        for c1 in consonants {
            for v1 in syllables {
                for c2 in consonants {
                    for v2 in ["a", "i", "o"] {
                        n += 1;
                        let t = format!("{c1} {v1} {c2} {v2}");
                        rows.push((format!("w{n}"), t, f64::from(n % 17)));
                    }
                }
            }
        }
        let words_list: WordList = rows
            .iter()
            .map(|(w, t, f)| WordEntry::parse(w, t, *f).unwrap())
            .collect();
        let index = RhymeIndex::build(words_list);

        for query in ["m o s i", "k a l a", "t ə d o", "s u", "x"] {
            let target = PronunciationKey::parse(query).unwrap();
            for (limit, min_shared) in [(1, 1), (5, 1), (20, 2), (50, 3)] {
                let fast = index.query(&target, limit, min_shared, None).unwrap();

                let mut all: Vec<Candidate<'_>> = index
                    .entries
                    .iter()
                    .enumerate()
                    .map(|(id, e)| Candidate {
                        shared: PronunciationKey::common_suffix_length(&e.pronunciation, &target),
                        frequency: e.frequency,
                        word: &e.word,
                        id,
                    })
                    .filter(|c| c.shared >= min_shared)
                    .collect();
                all.sort_by(|a, b| b.cmp(a));
                all.truncate(limit);

                let expected: Vec<(EntryId, usize)> = all.iter().map(|c| (c.id, c.shared)).collect();
                let got: Vec<(EntryId, usize)> = fast
                    .iter()
                    .map(|m| {
                        let id = index.entries.iter().position(|e| e == &m.entry).unwrap();
                        (id, m.shared_suffix_length)
                    })
                    .collect();
                assert_eq!(got, expected, "query {query:?} limit {limit} min {min_shared}");
            }
        }
    }

    #[test]
    fn low_frequency_groups_on_a_common_ending_are_not_scanned() {
        let mut rows = vec![("Nixen".to_string(), "x ə n".to_string(), 100.0)];
        for c in ["b", "d", "f", "g", "k", "l", "m", "p", "s", "t", "v", "w"] {
            for n in 0..20 {
                rows.push((format!("{c}{n}"), format!("{c} ə n"), 1.0));
            }
        }
        let index = RhymeIndex::build(
            rows.iter()
                .map(|(w, t, f)| WordEntry::parse(w, t, *f).unwrap())
                .collect(),
        );
        assert_eq!(index.group_count(), 13);

        let target = PronunciationKey::parse("z ə n").unwrap();
        let (matches, visited) = index.search(&target, 1, 1, None).unwrap();
        assert_eq!(words(&matches), ["Nixen"]);
        assert_eq!(visited, 1);

        // A tie on frequency still has to be looked at: the word can win.
        let (matches, _) = index.search(&target, 2, 2, None).unwrap();
        assert_eq!(matches[0].entry.word, "Nixen");
        assert_eq!(matches[1].entry.word, "b0");
    }

    #[test]
    fn index_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RhymeIndex>();
    }
}
