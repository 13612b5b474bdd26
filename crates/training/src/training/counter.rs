//! Pair counting for BPE training.
//!
//! Holds the word frequency table (each distinct corpus word with its current
//! segmentation and occurrence count) and computes adjacent-pair frequencies
//! over it. Counting is a per-word scatter followed by a sum, so the parallel
//! and sequential paths produce identical maps.

use ahash::AHashMap;
use rayon::prelude::*;
use std::collections::BTreeSet;
use subword_core::{initial_segmentation, merge_symbols, Pair, Symbol};

/// Adjacent pair -> aggregate frequency.
pub type PairCounts = AHashMap<Pair, u64>;

/// Word frequency table with pair counting.
pub struct PairCounter {
    /// Current segmentation of each distinct word
    words: Vec<Vec<Symbol>>,
    /// Occurrence count of each distinct word, parallel to `words`
    word_counts: Vec<u64>,
    /// Word -> position in `words`
    index: AHashMap<Symbol, usize>,
    /// Marker appended to every word
    word_end: Symbol,
}

impl PairCounter {
    /// Create a new pair counter.
    pub fn new(word_end: &str) -> Self {
        Self {
            words: Vec::new(),
            word_counts: Vec::new(),
            index: AHashMap::new(),
            word_end: Symbol::new(word_end),
        }
    }

    /// Add one occurrence of a word.
    pub fn add_word(&mut self, word: &str) {
        self.add_word_count(word, 1);
    }

    /// Add `count` occurrences of a word.
    pub fn add_word_count(&mut self, word: &str, count: u64) {
        if word.is_empty() || count == 0 {
            return;
        }

        if let Some(&pos) = self.index.get(word) {
            self.word_counts[pos] += count;
        } else {
            self.index.insert(Symbol::new(word), self.words.len());
            self.words.push(initial_segmentation(word, &self.word_end));
            self.word_counts.push(count);
        }
    }

    /// Distinct symbols across all current segmentations, sorted.
    pub fn alphabet(&self) -> BTreeSet<&str> {
        self.words
            .iter()
            .flat_map(|word| word.iter().map(|s| s.as_str()))
            .collect()
    }

    /// Count all pairs in parallel.
    pub fn count_pairs_parallel(&self) -> PairCounts {
        self.words
            .par_iter()
            .zip(self.word_counts.par_iter())
            .fold(PairCounts::new, |mut acc, (word, &count)| {
                count_word_pairs(&mut acc, word, count);
                acc
            })
            .reduce(PairCounts::new, |mut acc, pair_counts| {
                for (pair, count) in pair_counts {
                    *acc.entry(pair).or_insert(0) += count;
                }
                acc
            })
    }

    /// Count all pairs sequentially.
    pub fn count_pairs_sequential(&self) -> PairCounts {
        let mut pair_counts = PairCounts::new();

        for (word, &count) in self.words.iter().zip(self.word_counts.iter()) {
            count_word_pairs(&mut pair_counts, word, count);
        }

        pair_counts
    }

    /// Get the number of unique words.
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Get the total count of all word occurrences.
    pub fn total_word_occurrences(&self) -> u64 {
        self.word_counts.iter().sum()
    }

    /// Merge a pair in all words (mutates words in place).
    ///
    /// Returns the number of distinct words that changed.
    pub fn merge_pair_in_words(&mut self, left: &str, right: &str, merged: &Symbol) -> usize {
        self.words
            .par_iter_mut()
            .map(|word| usize::from(merge_symbols(word, left, right, merged) > 0))
            .sum()
    }
}

fn count_word_pairs(pair_counts: &mut PairCounts, word: &[Symbol], count: u64) {
    for window in word.windows(2) {
        let pair = (window[0].clone(), window[1].clone());
        *pair_counts.entry(pair).or_insert(0) += count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(left: &str, right: &str) -> Pair {
        (Symbol::new(left), Symbol::new(right))
    }

    fn counter(text: &str) -> PairCounter {
        let mut counter = PairCounter::new("</w>");
        for word in text.split_whitespace() {
            counter.add_word(word);
        }
        counter
    }

    #[test]
    fn test_add_word() {
        let counter = counter("abc");

        assert_eq!(counter.word_count(), 1);
        let pairs = counter.count_pairs_sequential();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs.get(&pair("c", "</w>")), Some(&1));
    }

    #[test]
    fn test_repeated_word_is_counted_once() {
        let counter = counter("ab ab\tab\nba");

        assert_eq!(counter.word_count(), 2);
        assert_eq!(counter.total_word_occurrences(), 4);
        let pairs = counter.count_pairs_sequential();
        assert_eq!(pairs.get(&pair("a", "b")), Some(&3));
        assert_eq!(pairs.get(&pair("b", "a")), Some(&1));
    }

    #[test]
    fn test_count_pairs_sequential() {
        let counter = counter("ab bc");

        let pairs = counter.count_pairs_sequential();
        assert_eq!(pairs.len(), 4);
        assert_eq!(pairs.get(&pair("a", "b")), Some(&1));
        assert_eq!(pairs.get(&pair("b", "</w>")), Some(&1));
        assert_eq!(pairs.get(&pair("b", "c")), Some(&1));
        assert_eq!(pairs.get(&pair("c", "</w>")), Some(&1));
    }

    #[test]
    fn test_count_pairs_with_frequency() {
        let mut counter = PairCounter::new("</w>");
        counter.add_word_count("ab", 3);
        counter.add_word_count("ab", 0);

        let pairs = counter.count_pairs_sequential();
        assert_eq!(pairs.get(&pair("a", "b")), Some(&3));
        assert_eq!(counter.total_word_occurrences(), 3);
    }

    #[test]
    fn test_count_pairs_parallel_matches_sequential() {
        let counter = counter("abc bcd cde abc low lower newest widest");

        let parallel = counter.count_pairs_parallel();
        let sequential = counter.count_pairs_sequential();
        assert_eq!(parallel, sequential);
        assert_eq!(parallel.get(&pair("b", "c")), Some(&3));
        assert_eq!(parallel.get(&pair("c", "d")), Some(&2));
    }

    #[test]
    fn test_merge_pair_in_words() {
        let mut counter = counter("aaa ab b");

        let changed = counter.merge_pair_in_words("a", "a", &Symbol::new("aa"));
        assert_eq!(changed, 1);

        // "aaa" is now [aa, a, </w>]; "ab" is untouched.
        let pairs = counter.count_pairs_sequential();
        assert_eq!(pairs.get(&pair("aa", "a")), Some(&1));
        assert_eq!(pairs.get(&pair("a", "a")), None);
        assert_eq!(pairs.get(&pair("a", "b")), Some(&1));
    }

    #[test]
    fn test_alphabet_is_sorted() {
        let counter = counter("cab");

        let alphabet: Vec<&str> = counter.alphabet().into_iter().collect();
        assert_eq!(alphabet, vec!["</w>", "a", "b", "c"]);
    }
}
