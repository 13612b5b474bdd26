//! Subword-training - vocabulary and merge rule learning
//!
//! This crate turns a corpus into a trained model: a vocabulary plus, for
//! BPE, the ordered merge rules.
//!
//! # Features
//!
//! - Corpus directory loading (`.txt` files in name order)
//! - Pair frequency counting with parallel processing support
//! - Deterministic merge selection with stop conditions (target size,
//!   minimum frequency, merge limit, time budget, abort)
//! - Frequency-ranked word-level vocabularies
//!
//! # Example
//!
//! ```rust
//! use subword_training::{BpeTrainer, StopReason, TrainingConfig};
//!
//! let trainer = BpeTrainer::new(TrainingConfig {
//!     vocab_size: 18,
//!     min_frequency: 1,
//!     ..Default::default()
//! });
//! let model = trainer.train("low lower newest widest")?;
//!
//! assert_eq!(model.merges.len(), 5);
//! assert_eq!(model.report.stop_reason, StopReason::TargetReached);
//! # Ok::<(), subword_training::TokenizerError>(())
//! ```

pub use subword_core::{Result, TokenizerError};

pub mod corpus;
pub use corpus::{read_corpus_dir, read_corpus_files};

// Training infrastructure
pub mod training;
pub use training::{
    AbortHandle, BpeTrainer, PairCounter, StopReason, TrainedModel, TrainingConfig,
    TrainingReport, WordLevelTrainer,
};
