//! Train command implementation.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use subword_tokenizer::{NormalizationForm, RegexPattern, Tokenizer, TokenizerKind};

/// Tokenizer kinds selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Whitespace,
    Regex,
    Bpe,
}

/// Normalization forms selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NormalizationArg {
    None,
    Nfc,
    Nfd,
    Nfkc,
    Nfkd,
}

impl From<NormalizationArg> for NormalizationForm {
    fn from(arg: NormalizationArg) -> Self {
        match arg {
            NormalizationArg::None => NormalizationForm::None,
            NormalizationArg::Nfc => NormalizationForm::NFC,
            NormalizationArg::Nfd => NormalizationForm::NFD,
            NormalizationArg::Nfkc => NormalizationForm::NFKC,
            NormalizationArg::Nfkd => NormalizationForm::NFKD,
        }
    }
}

/// Train command arguments.
#[derive(Parser)]
pub struct TrainCommand {
    /// Tokenizer kind
    #[arg(short, long, value_enum, default_value_t = KindArg::Bpe)]
    pub kind: KindArg,

    /// Directory of .txt files to train on
    #[arg(short, long)]
    pub corpus: PathBuf,

    /// Output directory for the trained model
    #[arg(short, long)]
    pub output: PathBuf,

    /// Target vocabulary size
    #[arg(long, default_value_t = 30_000)]
    pub vocab_size: usize,

    /// Minimum frequency for merges
    #[arg(short, long, default_value_t = 2)]
    pub min_frequency: u64,

    /// Pattern (basic, gpt2 or gpt4) for the regex kind, or the bpe pre-split
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// Stop after this many merges
    #[arg(long)]
    pub max_merges: Option<usize>,

    /// Keep at most this many tokens per encoded text
    #[arg(long)]
    pub truncation: Option<usize>,

    /// Stop merging after this many seconds
    #[arg(long)]
    pub time_budget: Option<u64>,

    /// Unicode normalization applied before splitting
    #[arg(long, value_enum, default_value_t = NormalizationArg::None)]
    pub normalization: NormalizationArg,

    /// Lowercase text before splitting
    #[arg(long)]
    pub lowercase: bool,

    /// Count pairs on a single thread
    #[arg(long)]
    pub sequential: bool,
}

impl TrainCommand {
    fn pattern(&self) -> Result<Option<RegexPattern>> {
        Ok(match &self.pattern {
            Some(name) => Some(name.parse::<RegexPattern>()?),
            None => None,
        })
    }

    fn tokenizer_kind(&self) -> Result<TokenizerKind> {
        Ok(match self.kind {
            KindArg::Whitespace => TokenizerKind::Whitespace,
            KindArg::Bpe => TokenizerKind::Bpe,
            KindArg::Regex => TokenizerKind::Regex(self.pattern()?.unwrap_or_default()),
        })
    }
}

pub fn run(cmd: TrainCommand) -> Result<()> {
    let kind = cmd.tokenizer_kind()?;

    let mut builder = Tokenizer::builder()
        .kind(kind)
        .vocab_size(cmd.vocab_size)
        .min_frequency(cmd.min_frequency)
        .normalization(cmd.normalization.into())
        .lowercase(cmd.lowercase)
        .parallel(!cmd.sequential);
    if cmd.kind != KindArg::Regex {
        if let Some(pattern) = cmd.pattern()? {
            builder = builder.pre_split(pattern);
        }
    }
    if let Some(max_length) = cmd.truncation {
        builder = builder.truncation(max_length);
    }
    if let Some(max) = cmd.max_merges {
        builder = builder.max_merges(max);
    }
    if let Some(secs) = cmd.time_budget {
        builder = builder.time_budget(Duration::from_secs(secs));
    }
    let mut tokenizer = builder.build()?;

    let start = Instant::now();
    let report = tokenizer
        .train_from_dir(&cmd.corpus)
        .with_context(|| format!("training on {}", cmd.corpus.display()))?;
    info!("training took {:.2}s", start.elapsed().as_secs_f64());

    tokenizer
        .save(&cmd.output)
        .with_context(|| format!("saving to {}", cmd.output.display()))?;

    println!(
        "Trained {} tokenizer: {} symbols, {} merges ({})",
        kind, report.vocab_size, report.merges, report.stop_reason
    );
    println!("Model saved to {}", cmd.output.display());

    Ok(())
}
