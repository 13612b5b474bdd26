//! Merge rule management for BPE.
//!
//! Merge rules are kept in creation order. That order is the rule's rank:
//! during segmentation the earliest-learned applicable rule is applied first,
//! so the order has to survive save and load unchanged.

use super::vocab::Symbol;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// A pair of adjacent symbols.
pub type Pair = (Symbol, Symbol);

/// Rank lookup: left -> right -> rank.
///
/// Nested so that lookups work on borrowed `&str` without building a key.
pub type MergeMap = AHashMap<Symbol, AHashMap<Symbol, u32>>;

/// A learned instruction to replace `left right` with `merged`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRule {
    pub left: Symbol,
    pub right: Symbol,
    pub merged: Symbol,
}

impl MergeRule {
    /// Create a rule whose result is the concatenation of both parts.
    pub fn new(left: &str, right: &str) -> Self {
        let mut merged = Symbol::with_capacity(left.len() + right.len());
        merged.push_str(left);
        merged.push_str(right);

        Self {
            left: Symbol::new(left),
            right: Symbol::new(right),
            merged,
        }
    }
}

/// Collection of BPE merge rules, ordered by creation.
#[derive(Debug, Clone, Default)]
pub struct MergeRules {
    /// Rules in creation order; the index is the rank
    rules: Vec<MergeRule>,
    /// Rank lookup
    ranks: MergeMap,
}

impl MergeRules {
    /// Create a new empty collection of merge rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a merge rule and return its rank.
    ///
    /// If the pair already has a rule, the earlier rank is kept for lookups;
    /// the new rule is still recorded so that the creation history stays
    /// complete.
    pub fn add_merge(&mut self, left: &str, right: &str) -> u32 {
        let rank = self.rules.len() as u32;
        self.ranks
            .entry(Symbol::new(left))
            .or_default()
            .entry(Symbol::new(right))
            .or_insert(rank);
        self.rules.push(MergeRule::new(left, right));

        rank
    }

    /// Get the rank of the rule merging `left right`, if any.
    #[inline]
    pub fn rank(&self, left: &str, right: &str) -> Option<u32> {
        self.ranks.get(left)?.get(right).copied()
    }

    /// Get the rule with the given rank.
    #[inline]
    pub fn get(&self, rank: u32) -> Option<&MergeRule> {
        self.rules.get(rank as usize)
    }

    /// Iterate over the rules in creation order.
    pub fn iter(&self) -> std::slice::Iter<'_, MergeRule> {
        self.rules.iter()
    }

    /// Get the number of merge rules.
    #[inline]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if there are no merge rules.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Create merge rules from pairs, ranked in the given order.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        let mut rules = Self::new();
        for (left, right) in pairs {
            rules.add_merge(left.as_ref(), right.as_ref());
        }
        rules
    }
}

impl PartialEq for MergeRules {
    fn eq(&self, other: &Self) -> bool {
        self.rules == other.rules
    }
}

impl Eq for MergeRules {}

impl<'a> IntoIterator for &'a MergeRules {
    type Item = &'a MergeRule;
    type IntoIter = std::slice::Iter<'a, MergeRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// Replace every non-overlapping `left right` occurrence with `merged`,
/// scanning left to right.
///
/// Returns the number of replacements made.
pub fn merge_symbols(
    symbols: &mut Vec<Symbol>,
    left: &str,
    right: &str,
    merged: &Symbol,
) -> usize {
    if !symbols.windows(2).any(|w| w[0] == left && w[1] == right) {
        return 0;
    }

    let mut replaced = 0;
    let mut out = Vec::with_capacity(symbols.len());
    let mut iter = std::mem::take(symbols).into_iter().peekable();

    while let Some(symbol) = iter.next() {
        if symbol == left && iter.peek().is_some_and(|next| *next == right) {
            iter.next();
            out.push(merged.clone());
            replaced += 1;
        } else {
            out.push(symbol);
        }
    }

    *symbols = out;
    replaced
}
