//! Main tokenizer implementation.
//!
//! This module provides the high-level `Tokenizer` struct: one type over the
//! closed set of tokenizer kinds, with the same train / tokenize / encode /
//! decode / save / load surface for each.

use crate::io::{TokenizerLoader, TokenizerSaver};
use crate::pre_tokenizer::{NormalizationForm, Normalizer, RegexPattern, SplitPattern, Splitter};
use log::info;
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use subword_core::{
    BpeDecoder, BpeEncoder, MergeRules, ReservedSymbols, Result, Symbol, TokenizerError,
    Vocabulary,
};
use subword_training::{
    read_corpus_dir, AbortHandle, BpeTrainer, TrainedModel, TrainingConfig, TrainingReport,
    WordLevelTrainer,
};

/// Tokenizer kind, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerKind {
    /// Whole whitespace-separated words
    Whitespace,
    /// Whole matches of a named pattern
    Regex(RegexPattern),
    /// Byte-pair encoding subwords
    #[default]
    Bpe,
}

impl TokenizerKind {
    /// Whitespace and regex tokenizers map whole pre-tokens to IDs.
    pub fn is_word_level(&self) -> bool {
        !matches!(self, TokenizerKind::Bpe)
    }
}

impl fmt::Display for TokenizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenizerKind::Whitespace => f.write_str("whitespace"),
            TokenizerKind::Regex(pattern) => write!(f, "regex({})", pattern),
            TokenizerKind::Bpe => f.write_str("bpe"),
        }
    }
}

/// Configuration for building a tokenizer.
#[derive(Debug, Clone)]
pub struct TokenizerConfig {
    /// Tokenizer kind
    pub kind: TokenizerKind,
    /// Target vocabulary size, reserved symbols included
    pub vocab_size: usize,
    /// Minimum frequency for merges during training
    pub min_frequency: u64,
    /// Unicode normalization applied before splitting
    pub normalization: NormalizationForm,
    /// Lowercase after normalization
    pub lowercase: bool,
    /// Reserved symbol spellings; word-level kinds only use `unk`
    pub reserved: ReservedSymbols,
    /// Pattern that splits text into BPE words instead of whitespace
    pub pre_split: Option<RegexPattern>,
    /// Keep at most this many tokens per encoded text
    pub truncation: Option<usize>,
    /// Count pairs on the rayon pool
    pub parallel: bool,
    /// Upper bound on merge steps
    pub max_merges: Option<usize>,
    /// Wall-clock limit for the merge loop
    pub time_budget: Option<Duration>,
    /// External stop signal for training
    pub abort: Option<AbortHandle>,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            kind: TokenizerKind::Bpe,
            vocab_size: 30_000,
            min_frequency: 2,
            normalization: NormalizationForm::None,
            lowercase: false,
            reserved: ReservedSymbols::default(),
            pre_split: None,
            truncation: None,
            parallel: true,
            max_merges: None,
            time_budget: None,
            abort: None,
        }
    }
}

impl TokenizerConfig {
    fn training_config(&self) -> TrainingConfig {
        TrainingConfig {
            vocab_size: self.vocab_size,
            min_frequency: self.min_frequency,
            parallel: self.parallel,
            max_merges: self.max_merges,
            time_budget: self.time_budget,
            reserved: self.reserved.clone(),
            abort: self.abort.clone(),
        }
    }

    /// Check the configuration for the selected kind.
    pub fn validate(&self) -> Result<()> {
        if self.truncation == Some(0) {
            return Err(TokenizerError::InvalidConfig(
                "truncation length must be at least 1".to_string(),
            ));
        }
        if self.kind.is_word_level() {
            if let Some(pattern) = self.pre_split {
                return Err(TokenizerError::InvalidConfig(format!(
                    "pre-split pattern {} only applies to bpe, not {}",
                    pattern, self.kind
                )));
            }
            if self.vocab_size == 0 {
                return Err(TokenizerError::InvalidConfig(
                    "vocab_size must leave room for the unknown symbol".to_string(),
                ));
            }
            if self.reserved.unk.is_empty() {
                return Err(TokenizerError::InvalidConfig(
                    "the unknown symbol cannot be empty".to_string(),
                ));
            }
            Ok(())
        } else {
            self.training_config().validate()
        }
    }

    /// How text is cut into pre-tokens.
    fn split_pattern(&self) -> SplitPattern {
        match self.kind {
            TokenizerKind::Regex(pattern) => SplitPattern::Regex(pattern),
            TokenizerKind::Whitespace => SplitPattern::Whitespace,
            TokenizerKind::Bpe => self
                .pre_split
                .map_or(SplitPattern::Whitespace, SplitPattern::Regex),
        }
    }

    /// The vocabulary of an untrained tokenizer of this kind.
    fn empty_vocabulary(&self) -> Result<Vocabulary> {
        if self.kind.is_word_level() {
            Vocabulary::new(&[self.reserved.unk.as_str()])
        } else {
            self.reserved.vocabulary()
        }
    }
}

/// Builder for creating a tokenizer.
#[derive(Debug, Clone, Default)]
pub struct TokenizerBuilder {
    config: TokenizerConfig,
}

impl TokenizerBuilder {
    /// Create a new tokenizer builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tokenizer kind.
    pub fn kind(mut self, kind: TokenizerKind) -> Self {
        self.config.kind = kind;
        self
    }

    /// Set the target vocabulary size.
    pub fn vocab_size(mut self, size: usize) -> Self {
        self.config.vocab_size = size;
        self
    }

    /// Set the minimum frequency for merges.
    pub fn min_frequency(mut self, freq: u64) -> Self {
        self.config.min_frequency = freq;
        self
    }

    pub fn normalization(mut self, form: NormalizationForm) -> Self {
        self.config.normalization = form;
        self
    }

    pub fn lowercase(mut self, lowercase: bool) -> Self {
        self.config.lowercase = lowercase;
        self
    }

    /// Set the reserved symbol spellings.
    pub fn reserved(mut self, reserved: ReservedSymbols) -> Self {
        self.config.reserved = reserved;
        self
    }

    /// Split BPE words with a named pattern instead of whitespace.
    pub fn pre_split(mut self, pattern: RegexPattern) -> Self {
        self.config.pre_split = Some(pattern);
        self
    }

    /// Cut every encoding after `max_length` tokens.
    pub fn truncation(mut self, max_length: usize) -> Self {
        self.config.truncation = Some(max_length);
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// Stop BPE training after this many merges.
    pub fn max_merges(mut self, max: usize) -> Self {
        self.config.max_merges = Some(max);
        self
    }

    /// Stop BPE training once this much time has passed.
    pub fn time_budget(mut self, budget: Duration) -> Self {
        self.config.time_budget = Some(budget);
        self
    }

    /// Let another thread stop training through `handle`.
    pub fn abort_handle(mut self, handle: AbortHandle) -> Self {
        self.config.abort = Some(handle);
        self
    }

    /// Build the tokenizer.
    pub fn build(self) -> Result<Tokenizer> {
        Tokenizer::new(self.config)
    }
}

/// Main tokenizer struct.
///
/// Holds the vocabulary and, for BPE, the ordered merge rules. Both are
/// replaced as a whole by `train` and `reload` and are read-only otherwise,
/// so a `&Tokenizer` can encode from many threads at once.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    /// Configuration
    config: TokenizerConfig,
    /// Vocabulary
    vocab: Vocabulary,
    /// Merge rules, empty for word-level kinds
    merges: MergeRules,
    /// Text splitter
    splitter: Splitter,
    /// Unicode normalizer
    normalizer: Normalizer,
}

impl Tokenizer {
    /// Create an untrained tokenizer: only the reserved symbols are known.
    pub fn new(config: TokenizerConfig) -> Result<Self> {
        let vocab = config.empty_vocabulary()?;
        Self::from_parts(config, vocab, MergeRules::new())
    }

    /// Assemble a tokenizer from an already built model.
    pub(crate) fn from_parts(
        config: TokenizerConfig,
        vocab: Vocabulary,
        merges: MergeRules,
    ) -> Result<Self> {
        config.validate()?;
        let splitter = Splitter::new(config.split_pattern())?;
        let normalizer = Normalizer::new(config.normalization, config.lowercase);

        Ok(Self {
            config,
            vocab,
            merges,
            splitter,
            normalizer,
        })
    }

    /// Create a tokenizer builder.
    pub fn builder() -> TokenizerBuilder {
        TokenizerBuilder::new()
    }

    pub fn kind(&self) -> TokenizerKind {
        self.config.kind
    }

    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// Get the vocabulary size.
    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    /// Get a reference to the vocabulary.
    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Get the merge rules in rank order.
    pub fn merges(&self) -> &MergeRules {
        &self.merges
    }

    /// Train the tokenizer on text data, replacing any previous model.
    ///
    /// The configuration is checked before anything else; on error the
    /// current model is left untouched.
    pub fn train(&mut self, data: &str) -> Result<TrainingReport> {
        self.config.validate()?;

        let normalized = self.normalizer.normalize(data);
        let pieces = self.splitter.split(&normalized);
        info!(
            "training {} tokenizer on {} pre-tokens",
            self.config.kind,
            pieces.len()
        );

        let TrainedModel {
            vocab,
            merges,
            report,
        } = if self.config.kind.is_word_level() {
            WordLevelTrainer::new(self.config.vocab_size, &self.config.reserved.unk)
                .train(pieces)?
        } else {
            BpeTrainer::new(self.config.training_config()).train_words(pieces)?
        };

        self.vocab = vocab;
        self.merges = merges;
        Ok(report)
    }

    /// Train on every `.txt` file of a corpus directory.
    pub fn train_from_dir(&mut self, dir: impl AsRef<Path>) -> Result<TrainingReport> {
        let corpus = read_corpus_dir(dir)?;
        self.train(&corpus)
    }

    fn encoder(&self) -> BpeEncoder<'_> {
        BpeEncoder::new(&self.vocab, &self.merges, &self.config.reserved.word_end)
    }

    /// Split text into tokens. Never fails.
    ///
    /// Word-level kinds return the pre-tokens as they are, even when they
    /// are not in the vocabulary. Truncation applies here as in
    /// [`Self::encode`].
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let normalized = self.normalizer.normalize(text);
        let pieces = self.splitter.split(&normalized);

        let tokens: Vec<String> = if self.config.kind.is_word_level() {
            pieces.into_iter().map(str::to_string).collect()
        } else {
            self.encoder()
                .tokenize(pieces)
                .into_iter()
                .map(String::from)
                .collect()
        };
        self.truncate(tokens)
    }

    /// Encode text to IDs, one per token of [`Self::tokenize`]. Never fails.
    pub fn encode(&self, text: &str) -> Vec<u32> {
        let normalized = self.normalizer.normalize(text);
        let pieces = self.splitter.split(&normalized);

        let ids: Vec<u32> = if self.config.kind.is_word_level() {
            pieces.into_iter().map(|p| self.vocab.lookup(p)).collect()
        } else {
            self.encoder().encode(pieces)
        };
        self.truncate(ids)
    }

    fn truncate<T>(&self, mut items: Vec<T>) -> Vec<T> {
        if let Some(max_length) = self.config.truncation {
            items.truncate(max_length);
        }
        items
    }

    /// Encode text, keeping tokens and IDs side by side.
    pub fn encode_with_tokens(&self, text: &str) -> Encoding {
        let tokens = self.tokenize(text);
        let ids = tokens.iter().map(|t| self.vocab.lookup(t)).collect();
        Encoding { ids, tokens }
    }

    /// Encode a batch of texts (parallelized). Results keep input order.
    pub fn encode_batch<S>(&self, texts: &[S]) -> Vec<Vec<u32>>
    where
        S: AsRef<str> + Sync,
    {
        texts.par_iter().map(|text| self.encode(text.as_ref())).collect()
    }

    /// Encode with BPE-dropout: each applicable merge is skipped with
    /// probability `dropout`.
    ///
    /// Word-level kinds have no merges and return [`Self::encode`].
    pub fn encode_with_dropout<R>(&self, text: &str, dropout: f64, rng: &mut R) -> Vec<u32>
    where
        R: Rng + ?Sized,
    {
        if self.config.kind.is_word_level() {
            return self.encode(text);
        }

        let normalized = self.normalizer.normalize(text);
        let encoder = self.encoder();
        let mut symbols: Vec<Symbol> = Vec::new();
        for word in self.splitter.split(&normalized) {
            symbols.extend(encoder.segment_word_with_dropout(word, dropout, &mut *rng));
        }
        self.truncate(encoder.symbols_to_ids(&symbols))
    }

    /// Decode IDs back to text. Never fails.
    ///
    /// Unknown IDs decode to the unknown symbol. Original spacing is not
    /// preserved: BPE and whitespace tokenizers join words with one space,
    /// regex tokenizers concatenate their matches.
    pub fn decode(&self, ids: &[u32]) -> String {
        match self.config.kind {
            TokenizerKind::Bpe => BpeDecoder::new(
                &self.vocab,
                &self.config.reserved.word_start,
                &self.config.reserved.word_end,
            )
            .decode(ids),
            TokenizerKind::Whitespace => {
                let words: Vec<&str> = ids.iter().map(|&id| self.vocab.reverse_lookup(id)).collect();
                words.join(" ")
            }
            TokenizerKind::Regex(_) => ids
                .iter()
                .map(|&id| self.vocab.reverse_lookup(id))
                .collect(),
        }
    }

    /// Save the tokenizer to a directory.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        TokenizerSaver::new(self).save(dir.as_ref())
    }

    /// Load a tokenizer from a directory.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        TokenizerLoader::load(dir.as_ref())
    }

    /// Replace this tokenizer with the one saved in `dir`.
    ///
    /// On error the current state is left untouched. Runtime-only settings
    /// (parallelism, training limits, abort handle) are kept.
    pub fn reload(&mut self, dir: impl AsRef<Path>) -> Result<()> {
        let mut loaded = TokenizerLoader::load(dir.as_ref())?;
        loaded.config.parallel = self.config.parallel;
        loaded.config.max_merges = self.config.max_merges;
        loaded.config.time_budget = self.config.time_budget;
        loaded.config.abort = self.config.abort.take();
        *self = loaded;
        Ok(())
    }

    /// Serialize to the JSON document written by [`Self::save`].
    pub fn to_json(&self) -> Result<String> {
        TokenizerSaver::new(self).to_json()
    }
}

impl std::str::FromStr for Tokenizer {
    type Err = TokenizerError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        TokenizerLoader::from_json(s)
    }
}

/// Result of encoding text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoding {
    /// Token IDs
    pub ids: Vec<u32>,
    /// Tokens, parallel to `ids`
    pub tokens: Vec<String>,
}

impl Encoding {
    /// Get the number of tokens.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if the encoding is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
