//! Training infrastructure for subword tokenizers.
//!
//! BPE training learns ordered merge rules; word-level training only ranks
//! whole pre-tokens by frequency.

pub mod counter;
pub mod trainer;
pub mod word_level;

pub use counter::{PairCounter, PairCounts};
pub use trainer::{
    AbortHandle, BpeTrainer, StopReason, TrainedModel, TrainingConfig, TrainingReport,
};
pub use word_level::WordLevelTrainer;
