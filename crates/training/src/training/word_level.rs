//! Vocabulary training for the word-level tokenizer kinds.
//!
//! Every pre-token becomes a candidate symbol; the most frequent ones are
//! kept, ties broken lexicographically, after the unknown symbol.

use super::trainer::{StopReason, TrainedModel, TrainingReport};
use ahash::AHashMap;
use log::info;
use std::cmp::Reverse;
use subword_core::{MergeRules, Result, TokenizerError, Vocabulary};

/// Frequency-ranked vocabulary trainer.
pub struct WordLevelTrainer {
    vocab_size: usize,
    unk: String,
}

impl WordLevelTrainer {
    pub fn new(vocab_size: usize, unk: &str) -> Self {
        Self {
            vocab_size,
            unk: unk.to_string(),
        }
    }

    /// Build a vocabulary from a pre-token sequence.
    ///
    /// The result never contains merge rules.
    pub fn train<'w, I>(&self, tokens: I) -> Result<TrainedModel>
    where
        I: IntoIterator<Item = &'w str>,
    {
        if self.vocab_size == 0 || u32::try_from(self.vocab_size).is_err() {
            return Err(TokenizerError::InvalidConfig(format!(
                "vocab_size {} must leave room for the unknown symbol",
                self.vocab_size
            )));
        }
        let mut vocab = Vocabulary::new(&[self.unk.as_str()])?;

        let mut counts: AHashMap<&str, u64> = AHashMap::new();
        for token in tokens {
            if !token.is_empty() && token != self.unk {
                *counts.entry(token).or_insert(0) += 1;
            }
        }
        let distinct = counts.len();

        let mut ranked: Vec<(&str, u64)> = counts.into_iter().collect();
        ranked.sort_unstable_by_key(|&(token, count)| (Reverse(count), token));

        for (token, _) in ranked.into_iter().take(self.vocab_size - 1) {
            vocab.add_symbol(token)?;
        }

        let stop_reason = if distinct + 1 > self.vocab_size {
            StopReason::TargetReached
        } else {
            StopReason::Exhausted
        };
        info!(
            "kept {} of {} distinct tokens ({})",
            vocab.len() - 1,
            distinct,
            stop_reason
        );

        let report = TrainingReport {
            merges: 0,
            vocab_size: vocab.len(),
            words: distinct,
            stop_reason,
        };
        Ok(TrainedModel {
            vocab,
            merges: MergeRules::new(),
            report,
        })
    }
}
