//! CLI commands for the subword tokenizers.

pub mod decode;
pub mod encode;
pub mod tokenize;
pub mod train;

pub use decode::DecodeCommand;
pub use encode::EncodeCommand;
pub use tokenize::TokenizeCommand;
pub use train::TrainCommand;

use anyhow::{Context, Result};
use std::io::Read;

/// Return `input`, or all of stdin when it is `-`.
pub(crate) fn read_input(input: String) -> Result<String> {
    if input != "-" {
        return Ok(input);
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("failed to read stdin")?;
    Ok(buffer)
}
