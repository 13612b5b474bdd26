//! Format definitions for tokenizer serialization.
//!
//! A trained tokenizer is one JSON document:
//!
//! ```json
//! {
//!   "format": "subword",
//!   "version": 1,
//!   "kind": "bpe",
//!   "reserved": ["<unk>", "<w>", "</w>"],
//!   "vocab": ["<unk>", "<w>", "</w>", "a", "b", "ab"],
//!   "merges": [["a", "b"]],
//!   "config": { "vocab_size": 6, "min_frequency": 2, "normalization": "none", "lowercase": false }
//! }
//! ```
//!
//! `vocab` is indexed by ID and `merges` is in rank order, so neither needs
//! explicit numbers. JSON string escaping keeps whitespace and quote symbols
//! intact.

use crate::pre_tokenizer::{NormalizationForm, RegexPattern};
use crate::tokenizer::TokenizerKind;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Value of the `format` field.
pub const FORMAT_TAG: &str = "subword";

/// Current document version.
pub const FORMAT_VERSION: u32 = 1;

/// File name inside a tokenizer directory.
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Complete tokenizer serialization format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedTokenizer {
    /// Format tag
    pub format: CompactString,
    /// Format version
    pub version: u32,
    /// Tokenizer kind
    pub kind: TokenizerKind,
    /// Reserved symbols, in ID order
    pub reserved: Vec<CompactString>,
    /// Vocabulary, indexed by ID
    pub vocab: Vec<CompactString>,
    /// Merge rules, in rank order
    pub merges: Vec<(CompactString, CompactString)>,
    /// Configuration
    pub config: SerializedConfig,
}

/// Tokenizer configuration in serialized format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedConfig {
    pub vocab_size: usize,
    pub min_frequency: u64,
    #[serde(default)]
    pub normalization: NormalizationForm,
    #[serde(default)]
    pub lowercase: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_split: Option<RegexPattern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncation: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_shape() {
        let data = SerializedTokenizer {
            format: FORMAT_TAG.into(),
            version: FORMAT_VERSION,
            kind: TokenizerKind::Regex(RegexPattern::Gpt2),
            reserved: vec!["<unk>".into()],
            vocab: vec!["<unk>".into(), " ".into(), "\"".into()],
            merges: Vec::new(),
            config: SerializedConfig {
                vocab_size: 3,
                min_frequency: 2,
                normalization: NormalizationForm::NFC,
                lowercase: true,
                pre_split: None,
                truncation: Some(16),
            },
        };

        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(value["kind"], serde_json::json!({ "regex": "gpt2" }));
        assert_eq!(value["vocab"][2], "\"");
        assert_eq!(value["config"]["normalization"], "nfc");
        assert_eq!(value["config"]["truncation"], 16);
        assert!(value["config"].get("pre_split").is_none());

        let parsed: SerializedTokenizer = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, data);
    }

    #[test]
    fn test_merges_are_pairs() {
        let json = r#"{
            "format": "subword", "version": 1, "kind": "bpe",
            "reserved": ["<unk>", "<w>", "</w>"],
            "vocab": ["<unk>", "<w>", "</w>", "a", "b", "ab"],
            "merges": [["a", "b"]],
            "config": { "vocab_size": 6, "min_frequency": 1 }
        }"#;

        let parsed: SerializedTokenizer = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.kind, TokenizerKind::Bpe);
        assert_eq!(parsed.merges, vec![("a".into(), "b".into())]);
        assert_eq!(parsed.config.normalization, NormalizationForm::None);
        assert_eq!(parsed.config.pre_split, None);
        assert_eq!(parsed.config.truncation, None);
    }
}
