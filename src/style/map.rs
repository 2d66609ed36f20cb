//! Resolved range → style mapping
//!
//! Spans are kept sorted by range start so that iteration order is stable and
//! glyph lookup is a binary search. Overlapping spans are tolerated but
//! detected on construction: they violate the disjointness the markup
//! promises, and lookups then fall back to an ordered scan.

use std::fmt;
use std::ops::Range;

use super::range::ClosedIndexRange;
use super::types::{Style, StyleSpan};

/// Errors raised while building a [`StyleMap`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleError {
    /// Explicit ranges share character indices
    OverlappingRanges(Vec<(ClosedIndexRange, ClosedIndexRange)>),
}

impl fmt::Display for StyleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleError::OverlappingRanges(pairs) => {
                write!(f, "overlapping style ranges:")?;
                for (a, b) in pairs {
                    write!(f, " {} & {}", a, b)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for StyleError {}

/// Sorted list of style spans
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyleMap {
    spans: Vec<StyleSpan>,
    overlapping: bool,
}

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from spans in any order, accepting overlaps
    pub fn from_spans(spans: impl IntoIterator<Item = StyleSpan>) -> Self {
        let mut spans: Vec<StyleSpan> = spans.into_iter().collect();
        // Stable, so equal ranges keep their input order
        spans.sort_by_key(|s| (s.range.lower(), s.range.upper()));
        let overlapping = Self::detect_overlap(&spans);
        Self { spans, overlapping }
    }

    /// Build from spans, rejecting any overlap
    pub fn try_from_spans(spans: impl IntoIterator<Item = StyleSpan>) -> Result<Self, StyleError> {
        let map = Self::from_spans(spans);
        if map.overlapping {
            Err(StyleError::OverlappingRanges(map.overlaps()))
        } else {
            Ok(map)
        }
    }

    // Sweep with the running maximum upper bound; a long span may overlap a
    // later, non-adjacent one
    fn detect_overlap(spans: &[StyleSpan]) -> bool {
        let mut max_upper: Option<usize> = None;
        for span in spans {
            if max_upper.is_some_and(|upper| span.range.lower() <= upper) {
                return true;
            }
            max_upper = Some(max_upper.map_or(span.range.upper(), |u| u.max(span.range.upper())));
        }
        false
    }

    /// Every pair of spans sharing at least one index, in map order
    pub fn overlaps(&self) -> Vec<(ClosedIndexRange, ClosedIndexRange)> {
        let mut pairs = Vec::new();
        if !self.overlapping {
            return pairs;
        }
        for (i, a) in self.spans.iter().enumerate() {
            for b in &self.spans[i + 1..] {
                if b.range.lower() > a.range.upper() {
                    break;
                }
                pairs.push((a.range, b.range));
            }
        }
        pairs
    }

    pub fn has_overlaps(&self) -> bool {
        self.overlapping
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StyleSpan> {
        self.spans.iter()
    }

    pub fn spans(&self) -> &[StyleSpan] {
        &self.spans
    }

    /// Style bound to exactly `range`
    pub fn get(&self, range: &ClosedIndexRange) -> Option<&Style> {
        self.spans
            .iter()
            .find(|s| s.range == *range)
            .map(|s| &s.style)
    }

    /// First span (lowest start) sharing an index with `chars`
    pub fn find(&self, chars: &Range<usize>) -> Option<&StyleSpan> {
        if self.overlapping {
            return self.spans.iter().find(|s| s.range.overlaps(chars));
        }
        // Disjoint and sorted by start, so upper bounds ascend too
        let first = self.spans.partition_point(|s| s.range.upper() < chars.start);
        self.spans
            .get(first)
            .filter(|s| s.range.overlaps(chars))
    }
}

impl<'a> IntoIterator for &'a StyleMap {
    type Item = &'a StyleSpan;
    type IntoIter = std::slice::Iter<'a, StyleSpan>;

    fn into_iter(self) -> Self::IntoIter {
        self.spans.iter()
    }
}

impl FromIterator<StyleSpan> for StyleMap {
    fn from_iter<I: IntoIterator<Item = StyleSpan>>(iter: I) -> Self {
        Self::from_spans(iter)
    }
}
