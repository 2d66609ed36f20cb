//! Inclusive character-index ranges

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Inclusive interval `[lower, upper]` over the character indices of one line
///
/// Serialized as a two-element array `[lower, upper]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "(usize, usize)", into = "(usize, usize)")]
pub struct ClosedIndexRange {
    lower: usize,
    upper: usize,
}

impl ClosedIndexRange {
    /// Returns `None` when `lower > upper`
    pub fn new(lower: usize, upper: usize) -> Option<Self> {
        (lower <= upper).then_some(Self { lower, upper })
    }

    /// Single-index range
    pub fn single(index: usize) -> Self {
        Self {
            lower: index,
            upper: index,
        }
    }

    pub fn lower(&self) -> usize {
        self.lower
    }

    pub fn upper(&self) -> usize {
        self.upper
    }

    /// Whether two inclusive ranges share at least one index
    pub fn intersects(&self, other: &ClosedIndexRange) -> bool {
        self.lower <= other.upper && other.lower <= self.upper
    }

    /// Whether this range shares an index with a half-open range
    ///
    /// An empty half-open range overlaps nothing.
    pub fn overlaps(&self, chars: &Range<usize>) -> bool {
        chars.start < chars.end && self.lower < chars.end && chars.start <= self.upper
    }

    /// Equivalent half-open range
    ///
    /// An upper bound of `usize::MAX` saturates, dropping that one index.
    pub fn to_half_open(&self) -> Range<usize> {
        self.lower..self.upper.saturating_add(1)
    }
}

impl TryFrom<(usize, usize)> for ClosedIndexRange {
    type Error = String;

    fn try_from((lower, upper): (usize, usize)) -> Result<Self, Self::Error> {
        Self::new(lower, upper)
            .ok_or_else(|| format!("range lower bound {} exceeds upper bound {}", lower, upper))
    }
}

impl From<ClosedIndexRange> for (usize, usize) {
    fn from(range: ClosedIndexRange) -> Self {
        (range.lower, range.upper)
    }
}

impl fmt::Display for ClosedIndexRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lower, self.upper)
    }
}
