//! Encode command implementation.

use super::read_input;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use subword_tokenizer::Tokenizer;

/// Encode command arguments.
#[derive(Parser)]
pub struct EncodeCommand {
    /// Directory of the trained tokenizer
    #[arg(short, long)]
    pub tokenizer: PathBuf,

    /// Text to encode, or - for stdin
    #[arg(short, long)]
    pub input: String,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(cmd: EncodeCommand) -> Result<()> {
    let tokenizer = Tokenizer::load(&cmd.tokenizer)?;
    let text = read_input(cmd.input)?;

    let ids = tokenizer.encode(&text);
    let output = ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(" ");

    match &cmd.output {
        Some(path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Encoded {} tokens to {}", ids.len(), path.display());
        }
        None => println!("{}", output),
    }

    Ok(())
}
