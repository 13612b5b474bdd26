//! BPE trainer implementation.
//!
//! Learns an ordered list of merge rules from a corpus: starting from
//! single-character symbols, repeatedly merge the most frequent adjacent
//! pair until the vocabulary reaches its target size or no pair qualifies.

use super::counter::PairCounter;
use log::{debug, info};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use subword_core::{
    select_best, MergeCandidate, MergeRules, ReservedSymbols, Result, TokenizerError, Vocabulary,
};

/// Cloneable flag for stopping a training run from another thread.
///
/// The trainer checks it between merge steps; the merges learned so far are
/// kept.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that training stop after the current merge step.
    pub fn abort(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Configuration for BPE training.
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    /// Target vocabulary size, reserved symbols included
    pub vocab_size: usize,
    /// Minimum frequency for a pair to be merged
    pub min_frequency: u64,
    /// Whether to use parallel processing
    pub parallel: bool,
    /// Upper bound on merge steps
    pub max_merges: Option<usize>,
    /// Wall-clock limit for the merge loop
    pub time_budget: Option<Duration>,
    /// Reserved symbol spellings
    pub reserved: ReservedSymbols,
    /// External stop signal
    pub abort: Option<AbortHandle>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            vocab_size: 30_000,
            min_frequency: 2,
            parallel: true,
            max_merges: None,
            time_budget: None,
            reserved: ReservedSymbols::default(),
            abort: None,
        }
    }
}

impl TrainingConfig {
    /// Check the configuration before any training work starts.
    pub fn validate(&self) -> Result<()> {
        if self.vocab_size < ReservedSymbols::COUNT {
            return Err(TokenizerError::InvalidConfig(format!(
                "vocab_size {} is smaller than the {} reserved symbols",
                self.vocab_size,
                ReservedSymbols::COUNT
            )));
        }
        if u32::try_from(self.vocab_size).is_err() {
            return Err(TokenizerError::InvalidConfig(format!(
                "vocab_size {} does not fit 32-bit IDs",
                self.vocab_size
            )));
        }
        self.reserved.validate()
    }
}

/// Why the merge loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The vocabulary reached the target size
    TargetReached,
    /// No adjacent pair is left that may be merged
    Exhausted,
    /// The best pair occurs fewer than `min_frequency` times
    BelowMinFrequency,
    /// `max_merges` steps were taken
    MaxMerges,
    /// `time_budget` ran out
    TimeBudget,
    /// The abort handle was triggered
    Aborted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            StopReason::TargetReached => "target vocabulary size reached",
            StopReason::Exhausted => "no pairs left to merge",
            StopReason::BelowMinFrequency => "best pair below minimum frequency",
            StopReason::MaxMerges => "merge limit reached",
            StopReason::TimeBudget => "time budget exhausted",
            StopReason::Aborted => "aborted",
        };
        f.write_str(reason)
    }
}

/// Summary of a finished training run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingReport {
    /// Number of merge rules learned
    pub merges: usize,
    /// Final vocabulary size
    pub vocab_size: usize,
    /// Number of distinct corpus words
    pub words: usize,
    pub stop_reason: StopReason,
}

/// Output of a training run.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub vocab: Vocabulary,
    pub merges: MergeRules,
    pub report: TrainingReport,
}

/// BPE trainer.
///
/// Trains a BPE model from text by iteratively merging the most frequent
/// adjacent symbol pairs. Runs are independent: the trainer holds no state
/// besides its configuration.
pub struct BpeTrainer {
    /// Configuration
    config: TrainingConfig,
}

impl BpeTrainer {
    /// Create a new BPE trainer with the given configuration.
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train on raw text, split into words on whitespace.
    pub fn train(&self, text: &str) -> Result<TrainedModel> {
        self.train_words(text.split_whitespace())
    }

    /// Train on an already split word sequence.
    pub fn train_words<'w, I>(&self, words: I) -> Result<TrainedModel>
    where
        I: IntoIterator<Item = &'w str>,
    {
        self.config.validate()?;
        let reserved = &self.config.reserved;

        let mut counter = PairCounter::new(&reserved.word_end);
        for word in words {
            counter.add_word(word);
        }

        let mut vocab = reserved.vocabulary()?;
        for symbol in counter.alphabet() {
            vocab.add_symbol(symbol)?;
        }
        info!(
            "training on {} distinct words ({} total), initial vocabulary {}",
            counter.word_count(),
            counter.total_word_occurrences(),
            vocab.len()
        );

        let mut merges = MergeRules::new();
        let stop_reason = self.merge_loop(&mut counter, &mut vocab, &mut merges)?;

        info!(
            "training stopped after {} merges with {} symbols: {}",
            merges.len(),
            vocab.len(),
            stop_reason
        );

        let report = TrainingReport {
            merges: merges.len(),
            vocab_size: vocab.len(),
            words: counter.word_count(),
            stop_reason,
        };
        Ok(TrainedModel {
            vocab,
            merges,
            report,
        })
    }

    fn merge_loop(
        &self,
        counter: &mut PairCounter,
        vocab: &mut Vocabulary,
        merges: &mut MergeRules,
    ) -> Result<StopReason> {
        let config = &self.config;
        let start = Instant::now();

        loop {
            if vocab.len() >= config.vocab_size {
                return Ok(StopReason::TargetReached);
            }
            if config.max_merges.is_some_and(|max| merges.len() >= max) {
                return Ok(StopReason::MaxMerges);
            }
            if config.abort.as_ref().is_some_and(AbortHandle::is_aborted) {
                return Ok(StopReason::Aborted);
            }
            if config.time_budget.is_some_and(|budget| start.elapsed() >= budget) {
                return Ok(StopReason::TimeBudget);
            }

            let pair_counts = if config.parallel {
                counter.count_pairs_parallel()
            } else {
                counter.count_pairs_sequential()
            };
            let best = select_best(
                pair_counts
                    .iter()
                    .filter(|((left, right), _)| config.reserved.admits_merge(left, right))
                    .map(|((left, right), &count)| MergeCandidate::new(left, right, count)),
            );
            let Some(best) = best else {
                return Ok(StopReason::Exhausted);
            };
            if best.count < config.min_frequency {
                return Ok(StopReason::BelowMinFrequency);
            }

            let rank = merges.add_merge(best.left, best.right);
            let Some(rule) = merges.get(rank) else {
                return Ok(StopReason::Exhausted);
            };
            let merged = rule.merged.clone();
            let id = vocab.add_symbol(&merged)?;
            let changed = counter.merge_pair_in_words(best.left, best.right, &merged);

            debug!(
                "merge {}: {:?} + {:?} -> {:?} (id {}, count {}, {} words)",
                rank, best.left, best.right, merged, id, best.count, changed
            );
        }
    }
}
