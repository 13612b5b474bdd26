//! Text splitting for pre-tokenization.
//!
//! The whitespace splitter drops the separators. A pattern splitter keeps
//! exactly the matches of its pattern, which for the GPT patterns includes
//! whitespace runs.

use super::patterns::RegexPattern;
use log::warn;
use subword_core::{Result, TokenizerError};

/// Splitting strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitPattern {
    /// Split on whitespace
    Whitespace,
    /// Keep the matches of a named pattern
    Regex(RegexPattern),
}

#[derive(Debug, Clone)]
enum Matcher {
    Whitespace,
    Basic(regex::Regex),
    Fancy(fancy_regex::Regex),
}

/// Text splitter for pre-tokenization.
#[derive(Debug, Clone)]
pub struct Splitter {
    /// Pattern to split on
    pattern: SplitPattern,
    matcher: Matcher,
}

impl Splitter {
    /// Create a new splitter, compiling its pattern.
    pub fn new(pattern: SplitPattern) -> Result<Self> {
        let matcher = match pattern {
            SplitPattern::Whitespace => Matcher::Whitespace,
            SplitPattern::Regex(named) => compile(named)?,
        };

        Ok(Self { pattern, matcher })
    }

    /// Create a whitespace splitter.
    pub fn whitespace() -> Self {
        Self {
            pattern: SplitPattern::Whitespace,
            matcher: Matcher::Whitespace,
        }
    }

    /// Create a splitter for a named pattern.
    pub fn regex(pattern: RegexPattern) -> Result<Self> {
        Self::new(SplitPattern::Regex(pattern))
    }

    pub fn pattern(&self) -> SplitPattern {
        self.pattern
    }

    /// Split text into chunks.
    ///
    /// Never fails: a match error from the backtracking engine ends the
    /// split at that point and is logged.
    pub fn split<'t>(&self, text: &'t str) -> Vec<&'t str> {
        match &self.matcher {
            Matcher::Whitespace => text.split_whitespace().collect(),
            Matcher::Basic(re) => re.find_iter(text).map(|m| m.as_str()).collect(),
            Matcher::Fancy(re) => {
                let mut pieces = Vec::new();
                for found in re.find_iter(text) {
                    match found {
                        Ok(m) => pieces.push(m.as_str()),
                        Err(err) => {
                            warn!(
                                "pattern match failed after {} pieces, dropping the rest: {}",
                                pieces.len(),
                                err
                            );
                            break;
                        }
                    }
                }
                pieces
            }
        }
    }
}

impl Default for Splitter {
    fn default() -> Self {
        Self::whitespace()
    }
}

fn compile(named: RegexPattern) -> Result<Matcher> {
    let source = named.pattern();
    let invalid = |reason: String| TokenizerError::InvalidPattern {
        pattern: named.name().to_string(),
        reason,
    };

    if named.is_fancy() {
        fancy_regex::Regex::new(source)
            .map(Matcher::Fancy)
            .map_err(|e| invalid(e.to_string()))
    } else {
        regex::Regex::new(source)
            .map(Matcher::Basic)
            .map_err(|e| invalid(e.to_string()))
    }
}
