//! BPE decoding.
//!
//! Reconstructs text from IDs. Word boundaries come from the word-end
//! marker; words are joined with a single space. Original spacing is not
//! recoverable, so decoding is approximate with respect to whitespace.

use crate::core::Vocabulary;

/// BPE decoder over a read-only vocabulary.
#[derive(Debug, Clone, Copy)]
pub struct BpeDecoder<'a> {
    vocab: &'a Vocabulary,
    word_start: &'a str,
    word_end: &'a str,
}

impl<'a> BpeDecoder<'a> {
    /// Create a decoder.
    pub fn new(vocab: &'a Vocabulary, word_start: &'a str, word_end: &'a str) -> Self {
        Self {
            vocab,
            word_start,
            word_end,
        }
    }

    /// Decode IDs to text.
    ///
    /// Invalid IDs decode to the unknown symbol. Never fails.
    pub fn decode(&self, ids: &[u32]) -> String {
        let mut words: Vec<String> = Vec::new();
        let mut current = String::new();

        for &id in ids {
            let symbol = self.vocab.reverse_lookup(id);
            if symbol == self.word_start {
                continue;
            }
            match symbol.strip_suffix(self.word_end) {
                Some(stem) => {
                    current.push_str(stem);
                    words.push(std::mem::take(&mut current));
                }
                None => current.push_str(symbol),
            }
        }
        words.push(current);

        let words: Vec<&str> = words
            .iter()
            .map(|w| w.trim())
            .filter(|w| !w.is_empty())
            .collect();
        words.join(" ")
    }
}
