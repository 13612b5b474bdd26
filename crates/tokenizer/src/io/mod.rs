//! Persistence for trained tokenizers.
//!
//! A tokenizer directory holds one `tokenizer.json` document carrying the
//! kind, reserved symbols, vocabulary, ordered merge rules and the
//! pre-tokenization settings.

pub mod format;
pub mod load;
pub mod save;

pub use format::{SerializedConfig, SerializedTokenizer, FORMAT_VERSION, TOKENIZER_FILE};
pub use load::TokenizerLoader;
pub use save::TokenizerSaver;
