//! Merge candidate ordering for BPE training.
//!
//! Training picks the adjacent pair with the highest frequency. Ties are
//! broken deterministically: the pair whose concatenation sorts first
//! lexicographically wins, and if two pairs spell the same concatenation
//! (`ab c` vs `a bc`) the one with the shorter left part wins.

use std::cmp::Ordering;

/// A merge candidate during BPE training.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeCandidate<'a> {
    /// Left symbol of the pair
    pub left: &'a str,
    /// Right symbol of the pair
    pub right: &'a str,
    /// The frequency/count of this pair
    pub count: u64,
}

impl<'a> MergeCandidate<'a> {
    /// Create a new merge candidate.
    pub fn new(left: &'a str, right: &'a str, count: u64) -> Self {
        Self { left, right, count }
    }

    /// The symbol this candidate would create.
    pub fn merged(&self) -> String {
        let mut merged = String::with_capacity(self.left.len() + self.right.len());
        merged.push_str(self.left);
        merged.push_str(self.right);
        merged
    }

    fn joined_bytes(&self) -> impl Iterator<Item = u8> + 'a {
        self.left.bytes().chain(self.right.bytes())
    }
}

// Greater = better candidate, so `Iterator::max` selects the winner.
impl Ord for MergeCandidate<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.count
            .cmp(&other.count)
            .then_with(|| other.joined_bytes().cmp(self.joined_bytes()))
            .then_with(|| other.left.len().cmp(&self.left.len()))
    }
}

impl PartialOrd for MergeCandidate<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Select the best candidate, or `None` when there are no candidates.
pub fn select_best<'a, I>(candidates: I) -> Option<MergeCandidate<'a>>
where
    I: IntoIterator<Item = MergeCandidate<'a>>,
{
    candidates.into_iter().max()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highest_count_wins() {
        let best = select_best([
            MergeCandidate::new("a", "b", 10),
            MergeCandidate::new("b", "c", 20),
            MergeCandidate::new("c", "d", 15),
        ])
        .unwrap();

        assert_eq!((best.left, best.right, best.count), ("b", "c", 20));
    }

    #[test]
    fn test_tie_broken_by_joined_string() {
        let best = select_best([
            MergeCandidate::new("w", "e", 2),
            MergeCandidate::new("l", "o", 2),
            MergeCandidate::new("e", "s", 2),
            MergeCandidate::new("t", "</w>", 2),
        ])
        .unwrap();

        assert_eq!(best.merged(), "es");
    }

    #[test]
    fn test_tie_is_order_independent() {
        let forward = [
            MergeCandidate::new("ab", "c", 3),
            MergeCandidate::new("a", "bc", 3),
        ];
        let mut backward = forward;
        backward.reverse();

        let a = select_best(forward).unwrap();
        let b = select_best(backward).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.left, "a");
    }

    #[test]
    fn test_empty() {
        assert!(select_best(Vec::new()).is_none());
    }
}
