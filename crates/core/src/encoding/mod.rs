//! Applying a trained BPE model.
//!
//! Segmentation turns words into symbols and IDs; decoding turns IDs back
//! into text.

pub mod decoder;
pub mod segmenter;

pub use decoder::BpeDecoder;
pub use segmenter::{initial_segmentation, BpeEncoder};
