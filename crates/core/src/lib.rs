//! Subword-core - Core BPE data structures and algorithms
//!
//! This crate provides the vocabulary store, the ordered merge rules, and the
//! segmentation/decoding that apply a trained model to text. Training lives
//! in `subword-training`; the user-facing API in `subword-tokenizer`.
//!
//! # Features
//!
//! - Dense symbol <-> ID vocabulary with reserved low IDs and an unknown fallback
//! - Merge rules ranked by creation order
//! - Deterministic merge candidate ordering
//! - Total encode/decode: unknown input degrades to the unknown symbol
//!
//! # Example
//!
//! ```rust
//! use subword_core::{BpeEncoder, MergeRules, ReservedSymbols};
//!
//! let reserved = ReservedSymbols::default();
//! let mut vocab = reserved.vocabulary()?;
//! for c in ["l", "o", "w"] {
//!     vocab.add_symbol(c)?;
//! }
//! let merges = MergeRules::from_pairs([("l", "o")]);
//! vocab.add_symbol("lo")?;
//!
//! let encoder = BpeEncoder::new(&vocab, &merges, &reserved.word_end);
//! assert_eq!(encoder.segment_word("low"), ["lo", "w", "</w>"]);
//! # Ok::<(), subword_core::TokenizerError>(())
//! ```

pub mod error;
pub use error::{Result, TokenizerError};

// Core data structures
pub mod core;
pub use self::core::{
    merge_symbols, select_best, MergeCandidate, MergeMap, MergeRule, MergeRules, Pair,
    ReservedSymbols, Symbol, Vocab, Vocabulary, UNK_ID,
};

// Segmentation and decoding
pub mod encoding;
pub use encoding::{initial_segmentation, BpeDecoder, BpeEncoder};
