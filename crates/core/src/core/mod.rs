//! Core BPE data structures.
//!
//! This module contains the vocabulary store, the ordered merge rules and
//! the merge candidate ordering used by training.

pub mod merges;
pub mod priority;
pub mod vocab;

pub use merges::{merge_symbols, MergeMap, MergeRule, MergeRules, Pair};
pub use priority::{select_best, MergeCandidate};
pub use vocab::{ReservedSymbols, Symbol, Vocab, Vocabulary, UNK_ID};
