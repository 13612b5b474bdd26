//! Pre-tokenization pipeline.
//!
//! Text is normalized, then split into the pieces the model works on:
//! whitespace-separated words for the whitespace and BPE kinds, pattern
//! matches for the regex kind.

pub mod normalize;
pub mod patterns;
pub mod split;

pub use normalize::{NormalizationForm, Normalizer};
pub use patterns::RegexPattern;
pub use split::{SplitPattern, Splitter};
