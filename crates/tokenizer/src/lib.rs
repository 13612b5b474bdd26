//! Subword-tokenizer - High-level tokenizer API
//!
//! This crate puts the vocabulary, merge rules, trainer and pre-tokenizer
//! behind one `Tokenizer` type with a fixed surface for every kind.
//!
//! # Features
//!
//! - Closed set of kinds: whitespace, regex (`basic`, `gpt2`, `gpt4`) and BPE
//! - Builder pattern for configuration
//! - Pre-tokenization pipeline (normalization, splitting)
//! - Total tokenize / encode / decode with an unknown-symbol fallback
//! - BPE-dropout and parallel batch encoding
//! - Versioned JSON persistence with validation on load
//!
//! # Example
//!
//! ```rust
//! use subword_tokenizer::Tokenizer;
//!
//! let mut tokenizer = Tokenizer::builder()
//!     .vocab_size(18)
//!     .min_frequency(1)
//!     .build()?;
//! tokenizer.train("low lower newest widest")?;
//!
//! assert_eq!(tokenizer.tokenize("lowest"), ["low", "est</w>"]);
//!
//! let ids = tokenizer.encode("lowest");
//! assert_eq!(tokenizer.decode(&ids), "lowest");
//! # Ok::<(), subword_tokenizer::TokenizerError>(())
//! ```

// Re-export core types
pub use subword_core::{ReservedSymbols, Result, TokenizerError, Vocabulary};
pub use subword_training::{AbortHandle, StopReason, TrainingReport};

// Tokenizer API
pub mod tokenizer;
pub use tokenizer::{Encoding, Tokenizer, TokenizerBuilder, TokenizerConfig, TokenizerKind};

// IO/Serialization
pub mod io;
pub use io::{SerializedTokenizer, TokenizerLoader, TokenizerSaver};

// Pre-tokenization
pub mod pre_tokenizer;
pub use pre_tokenizer::{NormalizationForm, Normalizer, RegexPattern, Splitter};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
