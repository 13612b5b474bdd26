//! BPE segmentation.
//!
//! Applies learned merge rules to new words. Every word starts as one symbol
//! per character (grapheme cluster) plus the word-end marker, exactly as in
//! training; then the applicable rule with the lowest rank is applied to all
//! of its non-overlapping occurrences, until no adjacent pair has a rule.

use crate::core::{merge_symbols, MergeRules, Symbol, Vocabulary};
use rand::Rng;
use unicode_segmentation::UnicodeSegmentation;

/// Split a word into its initial segmentation: one symbol per character,
/// followed by the word-end marker.
pub fn initial_segmentation(word: &str, word_end: &str) -> Vec<Symbol> {
    let mut symbols: Vec<Symbol> = word.graphemes(true).map(Symbol::new).collect();
    symbols.push(Symbol::new(word_end));
    symbols
}

/// BPE encoder over a read-only vocabulary and merge list.
///
/// Cheap to construct; holds only borrows, so it can be shared across threads.
#[derive(Debug, Clone, Copy)]
pub struct BpeEncoder<'a> {
    vocab: &'a Vocabulary,
    merges: &'a MergeRules,
    word_end: &'a str,
}

impl<'a> BpeEncoder<'a> {
    /// Create an encoder.
    pub fn new(vocab: &'a Vocabulary, merges: &'a MergeRules, word_end: &'a str) -> Self {
        Self {
            vocab,
            merges,
            word_end,
        }
    }

    /// Segment a single word into symbols.
    pub fn segment_word(&self, word: &str) -> Vec<Symbol> {
        let mut symbols = initial_segmentation(word, self.word_end);

        while symbols.len() > 1 {
            let best = symbols
                .windows(2)
                .filter_map(|w| self.merges.rank(&w[0], &w[1]))
                .min();
            let Some(rule) = best.and_then(|rank| self.merges.get(rank)) else {
                break;
            };
            merge_symbols(&mut symbols, &rule.left, &rule.right, &rule.merged);
        }

        symbols
    }

    /// Segment a single word, skipping each applicable merge with
    /// probability `dropout` (BPE-dropout).
    ///
    /// Merges are applied one position at a time: among the candidates that
    /// survive dropout, the lowest rank wins, leftmost first. With
    /// `dropout <= 0` this gives the same result as [`Self::segment_word`];
    /// with `dropout >= 1` no merge is ever applied.
    pub fn segment_word_with_dropout<R>(&self, word: &str, dropout: f64, rng: &mut R) -> Vec<Symbol>
    where
        R: Rng + ?Sized,
    {
        if dropout.is_nan() || dropout <= 0.0 {
            return self.segment_word(word);
        }
        let dropout = dropout.min(1.0);
        let mut symbols = initial_segmentation(word, self.word_end);

        while symbols.len() > 1 {
            let best = symbols
                .windows(2)
                .enumerate()
                .filter_map(|(pos, w)| self.merges.rank(&w[0], &w[1]).map(|rank| (rank, pos)))
                .filter(|_| !rng.gen_bool(dropout))
                .min();
            let Some((rule, pos)) = best.and_then(|(rank, pos)| Some((self.merges.get(rank)?, pos)))
            else {
                break;
            };
            symbols[pos] = rule.merged.clone();
            symbols.remove(pos + 1);
        }

        symbols
    }

    /// Segment a sequence of words into one flat symbol sequence.
    pub fn tokenize<'w, I>(&self, words: I) -> Vec<Symbol>
    where
        I: IntoIterator<Item = &'w str>,
    {
        words
            .into_iter()
            .flat_map(|word| self.segment_word(word))
            .collect()
    }

    /// Map symbols to IDs; unseen symbols map to the unknown ID.
    pub fn symbols_to_ids(&self, symbols: &[Symbol]) -> Vec<u32> {
        symbols.iter().map(|s| self.vocab.lookup(s)).collect()
    }

    /// Segment and map a sequence of words to IDs.
    pub fn encode<'w, I>(&self, words: I) -> Vec<u32>
    where
        I: IntoIterator<Item = &'w str>,
    {
        self.symbols_to_ids(&self.tokenize(words))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ReservedSymbols, UNK_ID};
    use crate::encoding::BpeDecoder;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn model(pairs: &[(&str, &str)]) -> (Vocabulary, MergeRules) {
        let mut vocab = ReservedSymbols::default().vocabulary().unwrap();
        for c in ["d", "e", "i", "l", "n", "o", "r", "s", "t", "w"] {
            vocab.add_symbol(c).unwrap();
        }
        let merges = MergeRules::from_pairs(pairs.iter().copied());
        for rule in &merges {
            vocab.add_symbol(&rule.merged).unwrap();
        }
        (vocab, merges)
    }

    fn strs(symbols: &[Symbol]) -> Vec<&str> {
        symbols.iter().map(|s| s.as_str()).collect()
    }

    #[test]
    fn test_initial_segmentation() {
        let symbols = initial_segmentation("low", "</w>");
        assert_eq!(strs(&symbols), vec!["l", "o", "w", "</w>"]);

        // A combining accent stays with its base character.
        let symbols = initial_segmentation("e\u{0301}t", "</w>");
        assert_eq!(strs(&symbols), vec!["e\u{0301}", "t", "</w>"]);
    }

    #[test]
    fn test_segment_word_applies_rules_by_rank() {
        let (vocab, merges) = model(&[
            ("e", "s"),
            ("es", "t"),
            ("est", "</w>"),
            ("l", "o"),
            ("lo", "w"),
        ]);
        let encoder = BpeEncoder::new(&vocab, &merges, "</w>");

        assert_eq!(strs(&encoder.segment_word("lowest")), vec!["low", "est</w>"]);
        assert_eq!(strs(&encoder.segment_word("low")), vec!["low", "</w>"]);
        assert_eq!(
            strs(&encoder.segment_word("lot")),
            vec!["lo", "t", "</w>"]
        );
    }

    #[test]
    fn test_earliest_rule_wins() {
        // Both (o, w) and (l, o) apply to "low"; (o, w) was learned first.
        let (vocab, merges) = model(&[("o", "w"), ("l", "o")]);
        let encoder = BpeEncoder::new(&vocab, &merges, "</w>");

        assert_eq!(strs(&encoder.segment_word("low")), vec!["l", "ow", "</w>"]);
    }

    #[test]
    fn test_encode_unknown_maps_to_unk() {
        let (vocab, merges) = model(&[("l", "o")]);
        let encoder = BpeEncoder::new(&vocab, &merges, "</w>");

        let symbols = encoder.tokenize(["lox"]);
        let ids = encoder.symbols_to_ids(&symbols);
        assert_eq!(strs(&symbols), vec!["lo", "x", "</w>"]);
        assert_eq!(ids.len(), symbols.len());
        assert_eq!(ids[0], vocab.get_id("lo").unwrap());
        assert_eq!(ids[1], 0);
        assert_eq!(ids[2], 2);
    }

    #[test]
    fn test_rules_sharing_a_spelling() {
        let mut vocab = ReservedSymbols::default().vocabulary().unwrap();
        for c in ["a", "b", "c"] {
            vocab.add_symbol(c).unwrap();
        }
        let merges = MergeRules::from_pairs([("b", "c"), ("a", "bc"), ("a", "b"), ("ab", "c")]);
        for rule in &merges {
            vocab.add_symbol(&rule.merged).unwrap();
        }

        // Four rules but three new symbols: "abc" is spelled twice.
        assert_eq!(merges.len(), 4);
        assert_eq!(vocab.len(), 6 + 3);
        assert_eq!(merges.get(1).unwrap().merged, merges.get(3).unwrap().merged);

        let encoder = BpeEncoder::new(&vocab, &merges, "</w>");
        let decoder = BpeDecoder::new(&vocab, "<w>", "</w>");
        assert_eq!(strs(&encoder.segment_word("abc")), vec!["abc", "</w>"]);
        assert_eq!(strs(&encoder.segment_word("cab")), vec!["c", "ab", "</w>"]);
        for word in ["abc", "ab", "cab", "abcabc"] {
            let ids = encoder.encode([word]);
            assert!(!ids.contains(&UNK_ID));
            assert_eq!(decoder.decode(&ids), word);
        }
    }

    #[test]
    fn test_empty_input() {
        let (vocab, merges) = model(&[]);
        let encoder = BpeEncoder::new(&vocab, &merges, "</w>");
        assert!(encoder.encode(std::iter::empty()).is_empty());
    }

    #[test]
    fn test_dropout_extremes() {
        let (vocab, merges) = model(&[("e", "s"), ("es", "t"), ("l", "o"), ("lo", "w")]);
        let encoder = BpeEncoder::new(&vocab, &merges, "</w>");
        let mut rng = StdRng::seed_from_u64(7);

        assert_eq!(
            encoder.segment_word_with_dropout("lowest", 0.0, &mut rng),
            encoder.segment_word("lowest")
        );
        assert_eq!(
            strs(&encoder.segment_word_with_dropout("lowest", 1.0, &mut rng)),
            vec!["l", "o", "w", "e", "s", "t", "</w>"]
        );
    }

    #[test]
    fn test_dropout_is_seeded() {
        let (vocab, merges) = model(&[("e", "s"), ("es", "t"), ("l", "o"), ("lo", "w")]);
        let encoder = BpeEncoder::new(&vocab, &merges, "</w>");

        let a = encoder.segment_word_with_dropout("lowest", 0.5, &mut StdRng::seed_from_u64(3));
        let b = encoder.segment_word_with_dropout("lowest", 0.5, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
        let joined: String = a.iter().map(|s| s.as_str()).collect();
        assert_eq!(joined, "lowest</w>");
    }
}
