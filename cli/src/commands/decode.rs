//! Decode command implementation.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use subword_tokenizer::Tokenizer;

/// Decode command arguments.
#[derive(Parser)]
pub struct DecodeCommand {
    /// Directory of the trained tokenizer
    #[arg(short, long)]
    pub tokenizer: PathBuf,

    /// Token IDs separated by commas or whitespace
    #[arg(short, long)]
    pub ids: String,
}

/// Parse `1,2 3` style ID lists.
fn parse_ids(ids: &str) -> Result<Vec<u32>> {
    ids.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u32>()
                .with_context(|| format!("invalid token ID {:?}", part))
        })
        .collect()
}

pub fn run(cmd: DecodeCommand) -> Result<()> {
    let tokenizer = Tokenizer::load(&cmd.tokenizer)?;
    let ids = parse_ids(&cmd.ids)?;

    println!("{}", tokenizer.decode(&ids));

    Ok(())
}
