//! Vocabulary storage and lookup.
//!
//! The vocabulary is a bijection between symbols and dense integer IDs.
//! Reserved symbols always occupy the lowest IDs, the unknown symbol at 0,
//! and every other symbol gets the next free ID in creation order.

use crate::error::{Result, TokenizerError};
use ahash::AHashMap;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// An immutable string fragment: a character, a marker or a merged unit.
pub type Symbol = CompactString;

/// Forward mapping: symbol -> ID
pub type Vocab = AHashMap<Symbol, u32>;

/// ID of the unknown symbol in every vocabulary.
pub const UNK_ID: u32 = 0;

/// Version header written by [`Vocabulary::serialize`].
pub const VOCAB_FORMAT_VERSION: u32 = 1;

/// Vocabulary with forward and reverse mappings.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// Forward mapping: symbol -> ID
    vocab: Vocab,
    /// Reverse mapping, indexed by ID
    symbols: Vec<Symbol>,
    /// Number of reserved symbols at the start of `symbols`
    reserved: usize,
}

impl Vocabulary {
    /// Create a vocabulary holding only the given reserved symbols.
    ///
    /// The first reserved symbol is the unknown symbol and gets ID 0; the
    /// rest follow in order.
    pub fn new<S: AsRef<str>>(reserved: &[S]) -> Result<Self> {
        if reserved.is_empty() {
            return Err(TokenizerError::InvalidConfig(
                "at least the unknown symbol must be reserved".to_string(),
            ));
        }

        let mut vocab = Self {
            vocab: Vocab::with_capacity(reserved.len()),
            symbols: Vec::with_capacity(reserved.len()),
            reserved: 0,
        };
        for symbol in reserved {
            let symbol = symbol.as_ref();
            if vocab.contains(symbol) {
                return Err(TokenizerError::InvalidConfig(format!(
                    "reserved symbol {:?} listed twice",
                    symbol
                )));
            }
            vocab.add_symbol(symbol)?;
        }
        vocab.reserved = vocab.len();

        Ok(vocab)
    }

    /// Rebuild a vocabulary from its symbols listed by ID.
    ///
    /// The first `reserved` symbols are the reserved ones. Duplicate symbols
    /// are rejected since they would break the bijection.
    pub fn from_symbols<I, S>(symbols: I, reserved: usize) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocab = Self {
            vocab: Vocab::new(),
            symbols: Vec::new(),
            reserved: 0,
        };
        for symbol in symbols {
            let symbol = symbol.as_ref();
            if vocab.contains(symbol) {
                return Err(TokenizerError::Format(format!(
                    "duplicate vocabulary entry {:?}",
                    symbol
                )));
            }
            vocab.add_symbol(symbol)?;
        }

        if reserved == 0 || reserved > vocab.len() {
            return Err(TokenizerError::Format(format!(
                "{} reserved symbols declared for a vocabulary of {}",
                reserved,
                vocab.len()
            )));
        }
        vocab.reserved = reserved;

        Ok(vocab)
    }

    /// Add a symbol to the vocabulary.
    ///
    /// Returns the existing ID when the symbol is already present, otherwise
    /// the next unused ID.
    pub fn add_symbol(&mut self, symbol: &str) -> Result<u32> {
        if let Some(&id) = self.vocab.get(symbol) {
            return Ok(id);
        }

        let id = u32::try_from(self.symbols.len()).map_err(|_| {
            TokenizerError::VocabularyOverflow {
                max: u32::MAX as usize,
                tried: self.symbols.len() + 1,
            }
        })?;
        let symbol = Symbol::new(symbol);
        self.symbols.push(symbol.clone());
        self.vocab.insert(symbol, id);

        Ok(id)
    }

    /// Get the ID for a symbol, falling back to the unknown ID.
    #[inline]
    pub fn lookup(&self, symbol: &str) -> u32 {
        self.get_id(symbol).unwrap_or(UNK_ID)
    }

    /// Get the symbol for an ID, falling back to the unknown symbol.
    #[inline]
    pub fn reverse_lookup(&self, id: u32) -> &str {
        self.get_symbol(id).unwrap_or_else(|| self.unk_symbol())
    }

    /// Get the ID for a symbol.
    #[inline]
    pub fn get_id(&self, symbol: &str) -> Option<u32> {
        self.vocab.get(symbol).copied()
    }

    /// Get the symbol for an ID.
    #[inline]
    pub fn get_symbol(&self, id: u32) -> Option<&str> {
        self.symbols.get(id as usize).map(|s| s.as_str())
    }

    #[inline]
    pub fn contains(&self, symbol: &str) -> bool {
        self.vocab.contains_key(symbol)
    }

    /// The unknown symbol's spelling.
    #[inline]
    pub fn unk_symbol(&self) -> &str {
        self.symbols[UNK_ID as usize].as_str()
    }

    /// Get the size of the vocabulary.
    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Check if the vocabulary is empty.
    ///
    /// Never true for a constructed vocabulary, since the unknown symbol is
    /// always present.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Number of reserved symbols.
    #[inline]
    pub fn reserved_len(&self) -> usize {
        self.reserved
    }

    /// The reserved symbols, in ID order.
    pub fn reserved(&self) -> &[Symbol] {
        &self.symbols[..self.reserved]
    }

    /// All symbols, indexed by ID.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Iterate over `(id, symbol)` in ID order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> + '_ {
        self.symbols
            .iter()
            .enumerate()
            .map(|(id, s)| (id as u32, s.as_str()))
    }

    /// Serialize to a versioned, escape-safe text form.
    ///
    /// Symbols are written as JSON strings, so whitespace, quotes and any
    /// delimiter characters survive the round trip.
    pub fn serialize(&self) -> Result<String> {
        let record = VocabularyRecord {
            version: VOCAB_FORMAT_VERSION,
            reserved: self.reserved,
            symbols: self.symbols.clone(),
        };
        Ok(serde_json::to_string(&record)?)
    }

    /// Parse the form written by [`Vocabulary::serialize`].
    pub fn deserialize(data: &str) -> Result<Self> {
        let record: VocabularyRecord = serde_json::from_str(data)
            .map_err(|e| TokenizerError::Format(format!("invalid vocabulary: {}", e)))?;

        if record.version != VOCAB_FORMAT_VERSION {
            return Err(TokenizerError::Format(format!(
                "unsupported vocabulary version {}",
                record.version
            )));
        }

        Self::from_symbols(record.symbols, record.reserved)
    }
}

impl PartialEq for Vocabulary {
    fn eq(&self, other: &Self) -> bool {
        // The forward map is derived from `symbols`.
        self.reserved == other.reserved && self.symbols == other.symbols
    }
}

impl Eq for Vocabulary {}

#[derive(Serialize, Deserialize)]
struct VocabularyRecord {
    version: u32,
    reserved: usize,
    symbols: Vec<Symbol>,
}

/// Spellings of the reserved symbols used by BPE segmentation.
///
/// They take IDs 0, 1 and 2 in field order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservedSymbols {
    /// Unknown symbol
    pub unk: Symbol,
    /// Word-start marker
    pub word_start: Symbol,
    /// Word-end marker, appended to every word's segmentation
    pub word_end: Symbol,
}

impl ReservedSymbols {
    /// Number of reserved symbols.
    pub const COUNT: usize = 3;

    /// The symbols in ID order.
    pub fn to_vec(&self) -> Vec<Symbol> {
        vec![
            self.unk.clone(),
            self.word_start.clone(),
            self.word_end.clone(),
        ]
    }

    /// Rebuild from symbols in ID order.
    pub fn from_slice<S: AsRef<str>>(symbols: &[S]) -> Option<Self> {
        match symbols {
            [unk, word_start, word_end] => Some(Self {
                unk: Symbol::new(unk.as_ref()),
                word_start: Symbol::new(word_start.as_ref()),
                word_end: Symbol::new(word_end.as_ref()),
            }),
            _ => None,
        }
    }

    /// Create a vocabulary holding only these symbols.
    pub fn vocabulary(&self) -> Result<Vocabulary> {
        Vocabulary::new(self.to_vec().as_slice())
    }

    /// Check the spellings.
    ///
    /// Each one needs at least two characters (grapheme clusters) and no
    /// whitespace, so that no single character of a word can be mistaken
    /// for a marker. Spellings must be distinct.
    pub fn validate(&self) -> Result<()> {
        for (name, symbol) in [
            ("unknown", &self.unk),
            ("word-start", &self.word_start),
            ("word-end", &self.word_end),
        ] {
            if symbol.chars().any(char::is_whitespace) || symbol.graphemes(true).nth(1).is_none() {
                return Err(TokenizerError::InvalidConfig(format!(
                    "{} symbol {:?} must span at least two characters and contain no whitespace",
                    name, symbol
                )));
            }
        }
        self.vocabulary().map(|_| ())
    }

    /// Whether `symbol` is spelled like one of the reserved symbols.
    pub fn is_reserved(&self, symbol: &str) -> bool {
        [&self.unk, &self.word_start, &self.word_end]
            .iter()
            .any(|reserved| reserved.as_str() == symbol)
    }

    /// Whether `left` and `right` may be merged into one symbol.
    ///
    /// Word text must never turn into a marker: the merged symbol may not
    /// be spelled like a reserved symbol, and it may contain the word-end
    /// spelling only as the genuine marker that `right` already ends with.
    pub fn admits_merge(&self, left: &str, right: &str) -> bool {
        let word_end = self.word_end.as_str();
        let stem = right.strip_suffix(word_end).unwrap_or(right);
        let mut merged = String::with_capacity(left.len() + right.len());
        merged.push_str(left);
        merged.push_str(right);

        !merged[..left.len() + stem.len()].contains(word_end) && !self.is_reserved(&merged)
    }
}

impl Default for ReservedSymbols {
    fn default() -> Self {
        Self {
            unk: Symbol::new("<unk>"),
            word_start: Symbol::new("<w>"),
            word_end: Symbol::new("</w>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vocabulary {
        ReservedSymbols::default().vocabulary().unwrap()
    }

    #[test]
    fn test_reserved_ids() {
        let vocab = vocab();
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.reserved_len(), 3);
        assert_eq!(vocab.get_id("<unk>"), Some(0));
        assert_eq!(vocab.get_id("<w>"), Some(1));
        assert_eq!(vocab.get_id("</w>"), Some(2));
    }

    #[test]
    fn test_add_symbol() {
        let mut vocab = vocab();
        let id1 = vocab.add_symbol("hello").unwrap();
        let id2 = vocab.add_symbol("world").unwrap();

        assert_eq!(id1, 3);
        assert_eq!(id2, 4);
        assert_eq!(vocab.get_symbol(3), Some("hello"));
        assert_eq!(vocab.get_symbol(4), Some("world"));
    }

    #[test]
    fn test_add_duplicate_symbol() {
        let mut vocab = vocab();
        let id1 = vocab.add_symbol("hello").unwrap();
        let id2 = vocab.add_symbol("hello").unwrap();

        assert_eq!(id1, id2);
        assert_eq!(vocab.len(), 4);
    }

    #[test]
    fn test_lookup_fallbacks() {
        let mut vocab = vocab();
        vocab.add_symbol("a").unwrap();

        assert_eq!(vocab.lookup("a"), 3);
        assert_eq!(vocab.lookup("zzz"), UNK_ID);
        assert_eq!(vocab.reverse_lookup(3), "a");
        assert_eq!(vocab.reverse_lookup(99), "<unk>");
    }

    #[test]
    fn test_duplicate_reserved_rejected() {
        let err = Vocabulary::new(&["<unk>", "<unk>"]).unwrap_err();
        assert!(matches!(err, TokenizerError::InvalidConfig(_)));
        assert!(Vocabulary::new::<&str>(&[]).is_err());
    }

    #[test]
    fn test_serialize_roundtrip_with_awkward_symbols() {
        let mut vocab = vocab();
        for symbol in [" ", "\t", "a b", "\"", ",", "\\", "\n</w>", "é"] {
            vocab.add_symbol(symbol).unwrap();
        }

        let data = vocab.serialize().unwrap();
        let restored = Vocabulary::deserialize(&data).unwrap();

        assert_eq!(restored, vocab);
        assert_eq!(restored.get_id("a b"), vocab.get_id("a b"));
        assert_eq!(restored.reserved_len(), 3);
    }

    #[test]
    fn test_deserialize_rejects_duplicates() {
        let data = r#"{"version":1,"reserved":1,"symbols":["<unk>","a","a"]}"#;
        let err = Vocabulary::deserialize(data).unwrap_err();
        assert!(matches!(err, TokenizerError::Format(_)));
    }

    #[test]
    fn test_admits_merge_keeps_text_and_markers_apart() {
        let reserved = ReservedSymbols::default();

        assert!(reserved.admits_merge("e", "s"));
        assert!(reserved.admits_merge("est", "</w>"));
        assert!(reserved.admits_merge("<w", "a</w>"));

        // Text spelled like a marker.
        assert!(!reserved.admits_merge("<w", ">"));
        assert!(!reserved.admits_merge("</w", ">"));
        assert!(!reserved.admits_merge("<unk", ">"));
        // Text ending in the word-end spelling without being a word end.
        assert!(!reserved.admits_merge("x</w", ">"));
        assert!(!reserved.admits_merge("x</w", "></w>"));
    }

    #[test]
    fn test_reserved_spellings_validated() {
        assert!(ReservedSymbols::default().validate().is_ok());

        let single = ReservedSymbols {
            word_end: Symbol::new("#"),
            ..ReservedSymbols::default()
        };
        assert!(matches!(
            single.validate(),
            Err(TokenizerError::InvalidConfig(_))
        ));

        let spaced = ReservedSymbols {
            unk: Symbol::new("<u n k>"),
            ..ReservedSymbols::default()
        };
        assert!(spaced.validate().is_err());

        let duplicate = ReservedSymbols {
            word_start: Symbol::new("</w>"),
            ..ReservedSymbols::default()
        };
        assert!(duplicate.validate().is_err());
    }

    #[test]
    fn test_deserialize_rejects_unknown_version() {
        let data = r#"{"version":7,"reserved":1,"symbols":["<unk>"]}"#;
        assert!(matches!(
            Vocabulary::deserialize(data),
            Err(TokenizerError::Format(_))
        ));
        assert!(Vocabulary::deserialize("not json").is_err());
    }
}
