//! Tokenize command implementation.

use super::read_input;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use subword_tokenizer::Tokenizer;

/// Tokenize command arguments.
#[derive(Parser)]
pub struct TokenizeCommand {
    /// Directory of the trained tokenizer
    #[arg(short, long)]
    pub tokenizer: PathBuf,

    /// Text to tokenize, or - for stdin
    #[arg(short, long)]
    pub input: String,
}

pub fn run(cmd: TokenizeCommand) -> Result<()> {
    let tokenizer = Tokenizer::load(&cmd.tokenizer)?;
    let text = read_input(cmd.input)?;

    // Debug formatting keeps whitespace tokens visible.
    println!("{:?}", tokenizer.tokenize(&text));

    Ok(())
}
