//! Named pre-tokenization patterns for the regex tokenizer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use subword_core::TokenizerError;

/// Words, or any single non-space character.
pub const BASIC_PATTERN: &str = r"\b\w+\b|\S";

/// GPT-2 style split: contractions, letter runs, digit runs, punctuation
/// runs, each optionally led by one space.
pub const GPT2_PATTERN: &str =
    r"'(?:[sdmt]|ll|ve|re)| ?\p{L}+| ?\p{N}+| ?[^\s\p{L}\p{N}]+|\s+(?!\S)|\s+";

/// GPT-4 style split: case-insensitive contractions, digits in groups of
/// at most three, newline-aware whitespace.
pub const GPT4_PATTERN: &str = r"'(?i:[sdmt]|ll|ve|re)|[^\r\n\p{L}\p{N}]?+\p{L}+|\p{N}{1,3}| ?[^\s\p{L}\p{N}]++[\r\n]*|\s*[\r\n]|\s+(?!\S)|\s+";

/// One of the built-in patterns, selected by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegexPattern {
    #[default]
    Basic,
    Gpt2,
    Gpt4,
}

impl RegexPattern {
    /// Every pattern, in display order.
    pub const ALL: [RegexPattern; 3] = [RegexPattern::Basic, RegexPattern::Gpt2, RegexPattern::Gpt4];

    pub fn name(&self) -> &'static str {
        match self {
            RegexPattern::Basic => "basic",
            RegexPattern::Gpt2 => "gpt2",
            RegexPattern::Gpt4 => "gpt4",
        }
    }

    /// The regular expression source.
    pub fn pattern(&self) -> &'static str {
        match self {
            RegexPattern::Basic => BASIC_PATTERN,
            RegexPattern::Gpt2 => GPT2_PATTERN,
            RegexPattern::Gpt4 => GPT4_PATTERN,
        }
    }

    /// Whether the pattern needs look-around or possessive quantifiers.
    pub fn is_fancy(&self) -> bool {
        !matches!(self, RegexPattern::Basic)
    }
}

impl fmt::Display for RegexPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RegexPattern {
    type Err = TokenizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|p| p.name()).collect();
                TokenizerError::InvalidConfig(format!(
                    "unknown pattern name {:?}, choose from: {}",
                    s,
                    names.join(", ")
                ))
            })
    }
}
