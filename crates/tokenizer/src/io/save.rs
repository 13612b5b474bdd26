//! Save functionality for trained tokenizers.
//!
//! The document is written to a temporary file next to the target and then
//! renamed over it, so an interrupted save never leaves a truncated
//! `tokenizer.json` behind.

use super::format::{
    SerializedConfig, SerializedTokenizer, FORMAT_TAG, FORMAT_VERSION, TOKENIZER_FILE,
};
use crate::tokenizer::Tokenizer;
use log::info;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use subword_core::{Result, TokenizerError};

/// Tokenizer saver - handles saving trained models.
pub struct TokenizerSaver<'a> {
    tokenizer: &'a Tokenizer,
}

impl<'a> TokenizerSaver<'a> {
    /// Create a new tokenizer saver.
    pub fn new(tokenizer: &'a Tokenizer) -> Self {
        Self { tokenizer }
    }

    /// Save the tokenizer to a directory as `tokenizer.json`.
    ///
    /// The directory is created if needed.
    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir).map_err(|e| TokenizerError::io(dir, e))?;

        let file_path = dir.join(TOKENIZER_FILE);
        let tmp_path = dir.join(format!("{}.tmp", TOKENIZER_FILE));

        if let Err(e) = self.write_and_replace(&tmp_path, &file_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        info!(
            "saved {} tokenizer ({} symbols, {} merges) to {}",
            self.tokenizer.kind(),
            self.tokenizer.vocab_size(),
            self.tokenizer.merges().len(),
            file_path.display()
        );
        Ok(())
    }

    fn write_and_replace(&self, tmp_path: &Path, file_path: &Path) -> Result<()> {
        let file = File::create(tmp_path).map_err(|e| TokenizerError::io(tmp_path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.serialize())
            .map_err(|e| TokenizerError::Save(format!("failed to serialize tokenizer: {}", e)))?;
        writer.flush().map_err(|e| TokenizerError::io(tmp_path, e))?;
        drop(writer);

        fs::rename(tmp_path, file_path).map_err(|e| TokenizerError::io(file_path, e))
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.serialize())?)
    }

    /// Serialize the tokenizer to a structure.
    pub fn serialize(&self) -> SerializedTokenizer {
        let tokenizer = self.tokenizer;
        let vocab = tokenizer.vocab();
        let config = tokenizer.config();

        SerializedTokenizer {
            format: FORMAT_TAG.into(),
            version: FORMAT_VERSION,
            kind: config.kind,
            reserved: vocab.reserved().to_vec(),
            vocab: vocab.symbols().to_vec(),
            merges: tokenizer
                .merges()
                .iter()
                .map(|rule| (rule.left.clone(), rule.right.clone()))
                .collect(),
            config: SerializedConfig {
                vocab_size: config.vocab_size,
                min_frequency: config.min_frequency,
                normalization: config.normalization,
                lowercase: config.lowercase,
                pre_split: config.pre_split,
                truncation: config.truncation,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_serialize_untrained() {
        let tokenizer = Tokenizer::builder().build().unwrap();
        let serialized = TokenizerSaver::new(&tokenizer).serialize();

        assert_eq!(serialized.format, FORMAT_TAG);
        assert_eq!(serialized.vocab, vec!["<unk>", "<w>", "</w>"]);
        assert_eq!(serialized.reserved, serialized.vocab);
        assert!(serialized.merges.is_empty());
    }

    #[test]
    fn test_save_creates_directory() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("nested").join("model");

        let mut tokenizer = Tokenizer::builder().vocab_size(20).min_frequency(1).build().unwrap();
        tokenizer.train("low lower lowest").unwrap();
        TokenizerSaver::new(&tokenizer).save(&target).unwrap();

        assert!(target.join(TOKENIZER_FILE).is_file());
        assert!(!target.join("tokenizer.json.tmp").exists());
    }

    #[test]
    fn test_failed_save_removes_temporary_file() {
        let dir = tempdir().unwrap();
        // A directory in the way makes the final rename fail.
        fs::create_dir_all(dir.path().join(TOKENIZER_FILE).join("occupied")).unwrap();

        let tokenizer = Tokenizer::builder().build().unwrap();
        let result = TokenizerSaver::new(&tokenizer).save(dir.path());

        assert!(matches!(result, Err(TokenizerError::Io { .. })));
        assert!(!dir.path().join("tokenizer.json.tmp").exists());
        assert!(dir.path().join(TOKENIZER_FILE).is_dir());
    }
}
