//! Load functionality for trained tokenizers.
//!
//! Loading builds a complete tokenizer in isolation and only returns it once
//! every check passed. Anything that does not describe a valid tokenizer is
//! reported as [`TokenizerError::Format`].

use super::format::{SerializedTokenizer, FORMAT_TAG, FORMAT_VERSION, TOKENIZER_FILE};
use crate::tokenizer::{Tokenizer, TokenizerConfig};
use log::info;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use subword_core::{MergeRules, ReservedSymbols, Result, TokenizerError, Vocabulary};

/// Tokenizer loader - handles loading trained models.
pub struct TokenizerLoader;

impl TokenizerLoader {
    /// Load a tokenizer from a directory holding `tokenizer.json`.
    pub fn load(dir: &Path) -> Result<Tokenizer> {
        let file_path = dir.join(TOKENIZER_FILE);
        let file = File::open(&file_path).map_err(|e| TokenizerError::io(&file_path, e))?;

        let reader = BufReader::new(file);
        let data: SerializedTokenizer = serde_json::from_reader(reader).map_err(|e| {
            if e.is_io() {
                TokenizerError::io(&file_path, e.into())
            } else {
                malformed(format!("{}: {}", file_path.display(), e))
            }
        })?;

        let tokenizer = Self::deserialize(data)?;
        info!(
            "loaded {} tokenizer ({} symbols, {} merges) from {}",
            tokenizer.kind(),
            tokenizer.vocab_size(),
            tokenizer.merges().len(),
            file_path.display()
        );
        Ok(tokenizer)
    }

    /// Load a tokenizer from a JSON string.
    pub fn from_json(json: &str) -> Result<Tokenizer> {
        let data: SerializedTokenizer =
            serde_json::from_str(json).map_err(|e| malformed(e.to_string()))?;
        Self::deserialize(data)
    }

    /// Validate a serialized document and build the tokenizer it describes.
    pub fn deserialize(data: SerializedTokenizer) -> Result<Tokenizer> {
        if data.format != FORMAT_TAG {
            return Err(malformed(format!(
                "unexpected format tag {:?}",
                data.format
            )));
        }
        if data.version != FORMAT_VERSION {
            return Err(malformed(format!(
                "unsupported version {} (expected {})",
                data.version, FORMAT_VERSION
            )));
        }

        let reserved = Self::reserved_symbols(&data)?;
        if data.vocab.get(..data.reserved.len()) != Some(data.reserved.as_slice()) {
            return Err(malformed(
                "vocabulary does not start with the reserved symbols".to_string(),
            ));
        }
        let vocab = Vocabulary::from_symbols(&data.vocab, data.reserved.len())?;
        let merges = Self::merges(&data, &vocab, &reserved)?;

        let config = TokenizerConfig {
            kind: data.kind,
            vocab_size: data.config.vocab_size,
            min_frequency: data.config.min_frequency,
            normalization: data.config.normalization,
            lowercase: data.config.lowercase,
            pre_split: data.config.pre_split,
            truncation: data.config.truncation,
            reserved,
            ..TokenizerConfig::default()
        };
        Tokenizer::from_parts(config, vocab, merges).map_err(|e| match e {
            TokenizerError::InvalidConfig(msg) => malformed(msg),
            other => other,
        })
    }

    fn reserved_symbols(data: &SerializedTokenizer) -> Result<ReservedSymbols> {
        if data.kind.is_word_level() {
            match data.reserved.as_slice() {
                [unk] => Ok(ReservedSymbols {
                    unk: unk.clone(),
                    ..ReservedSymbols::default()
                }),
                other => Err(malformed(format!(
                    "{} tokenizer must reserve exactly the unknown symbol, found {} symbols",
                    data.kind,
                    other.len()
                ))),
            }
        } else {
            ReservedSymbols::from_slice(data.reserved.as_slice()).ok_or_else(|| {
                malformed(format!(
                    "bpe tokenizer must reserve {} symbols, found {}",
                    ReservedSymbols::COUNT,
                    data.reserved.len()
                ))
            })
        }
    }

    fn merges(
        data: &SerializedTokenizer,
        vocab: &Vocabulary,
        reserved: &ReservedSymbols,
    ) -> Result<MergeRules> {
        if data.kind.is_word_level() && !data.merges.is_empty() {
            return Err(malformed(format!(
                "{} tokenizer cannot have merge rules",
                data.kind
            )));
        }

        let mut merges = MergeRules::new();
        for (left, right) in &data.merges {
            if !reserved.admits_merge(left, right) {
                return Err(malformed(format!(
                    "merge {:?} + {:?} would turn text into a marker symbol",
                    left, right
                )));
            }
            let rank = merges.add_merge(left, right);
            let Some(rule) = merges.get(rank) else {
                continue;
            };
            for part in [&rule.left, &rule.right, &rule.merged] {
                if !vocab.contains(part) {
                    return Err(malformed(format!(
                        "merge {} ({:?} + {:?}) uses {:?}, which is not in the vocabulary",
                        rank, left, right, part
                    )));
                }
            }
        }

        Ok(merges)
    }
}

fn malformed(msg: String) -> TokenizerError {
    TokenizerError::Format(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::TokenizerSaver;
    use crate::tokenizer::TokenizerKind;
    use tempfile::tempdir;

    fn trained() -> Tokenizer {
        let mut tokenizer = Tokenizer::builder().vocab_size(25).min_frequency(1).build().unwrap();
        tokenizer.train("low lower newest widest").unwrap();
        tokenizer
    }

    fn document(tokenizer: &Tokenizer) -> SerializedTokenizer {
        TokenizerSaver::new(tokenizer).serialize()
    }

    #[test]
    fn test_load_roundtrip() {
        let dir = tempdir().unwrap();
        let tokenizer = trained();
        TokenizerSaver::new(&tokenizer).save(dir.path()).unwrap();

        let loaded = TokenizerLoader::load(dir.path()).unwrap();
        assert_eq!(loaded.vocab(), tokenizer.vocab());
        assert_eq!(loaded.merges(), tokenizer.merges());
        assert_eq!(loaded.kind(), TokenizerKind::Bpe);
    }

    #[test]
    fn test_missing_file_is_io() {
        let dir = tempdir().unwrap();
        let err = TokenizerLoader::load(dir.path()).unwrap_err();
        assert!(matches!(err, TokenizerError::Io { .. }));
    }

    #[test]
    fn test_garbage_is_format() {
        let err = TokenizerLoader::from_json("{ not json").unwrap_err();
        assert!(matches!(err, TokenizerError::Format(_)));
    }

    #[test]
    fn test_rejects_wrong_tag_and_version() {
        let mut data = document(&trained());
        data.format = "other".into();
        assert!(matches!(
            TokenizerLoader::deserialize(data),
            Err(TokenizerError::Format(_))
        ));

        let mut data = document(&trained());
        data.version = FORMAT_VERSION + 1;
        assert!(matches!(
            TokenizerLoader::deserialize(data),
            Err(TokenizerError::Format(_))
        ));
    }

    #[test]
    fn test_rejects_duplicate_symbol() {
        let mut data = document(&trained());
        let first = data.vocab[3].clone();
        data.vocab.push(first);

        assert!(matches!(
            TokenizerLoader::deserialize(data),
            Err(TokenizerError::Format(_))
        ));
    }

    #[test]
    fn test_rejects_merge_outside_vocab() {
        let mut data = document(&trained());
        data.merges.push(("q".into(), "z".into()));

        assert!(matches!(
            TokenizerLoader::deserialize(data),
            Err(TokenizerError::Format(msg)) if msg.contains("\"q\"")
        ));
    }

    #[test]
    fn test_rejects_merge_spelling_a_marker() {
        let mut data = document(&trained());
        for symbol in ["<", "w", ">", "<w"] {
            if !data.vocab.iter().any(|s| s.as_str() == symbol) {
                data.vocab.push(symbol.into());
            }
        }
        data.merges.push(("<".into(), "w".into()));
        data.merges.push(("<w".into(), ">".into()));

        assert!(matches!(
            TokenizerLoader::deserialize(data),
            Err(TokenizerError::Format(msg)) if msg.contains("marker")
        ));
    }

    #[test]
    fn test_accepts_rules_sharing_a_spelling() {
        let json = r#"{
            "format": "subword", "version": 1, "kind": "bpe",
            "reserved": ["<unk>", "<w>", "</w>"],
            "vocab": ["<unk>", "<w>", "</w>", "a", "b", "c", "bc", "abc", "ab"],
            "merges": [["b", "c"], ["a", "bc"], ["a", "b"], ["ab", "c"]],
            "config": { "vocab_size": 9, "min_frequency": 1 }
        }"#;

        let tokenizer = TokenizerLoader::from_json(json).unwrap();
        assert_eq!(tokenizer.merges().len(), 4);
        assert_eq!(tokenizer.vocab_size(), 9);
        let ids = tokenizer.encode("abc cab");
        assert_eq!(tokenizer.decode(&ids), "abc cab");
    }

    #[test]
    fn test_rejects_misplaced_reserved() {
        let mut data = document(&trained());
        data.vocab.swap(0, 1);

        assert!(matches!(
            TokenizerLoader::deserialize(data),
            Err(TokenizerError::Format(_))
        ));
    }

    #[test]
    fn test_rejects_word_level_merges() {
        let mut data = document(&trained());
        data.kind = TokenizerKind::Whitespace;
        data.reserved.truncate(1);

        assert!(matches!(
            TokenizerLoader::deserialize(data),
            Err(TokenizerError::Format(_))
        ));
    }
}
