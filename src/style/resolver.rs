//! Completion of partial style ranges
//!
//! Lines arrive with a handful of explicit overrides. When a main style is
//! given, every character not covered by an override is bound to it, so the
//! resolved map partitions the whole line.

use super::map::StyleMap;
use super::range::ClosedIndexRange;
use super::types::{LyricLine, Style, StyleSpan};

/// Complete `partial` so that every index in `0..line_len` has a style
///
/// - no `main`: `partial` is returned unchanged
/// - `line_len == 0`: the result is empty
/// - otherwise each maximal run of uncovered indices becomes a new span
///   bound to `main`
///
/// Explicit spans reaching past the line are kept as they are; only the
/// uncovered part of `0..line_len` is synthesized.
pub fn resolve(line_len: usize, partial: &StyleMap, main: Option<&Style>) -> StyleMap {
    if line_len == 0 {
        return StyleMap::new();
    }

    if partial.has_overlaps() {
        for (a, b) in partial.overlaps() {
            tracing::warn!("[StyleMap] Overlapping style ranges {} and {}", a, b);
        }
    }

    let Some(main) = main else {
        return partial.clone();
    };

    let gaps = uncovered_runs(line_len, partial);
    if gaps.is_empty() {
        return partial.clone();
    }

    tracing::trace!(
        "[StyleMap] Filling {} gap(s) of a {}-char line with the main style",
        gaps.len(),
        line_len
    );

    partial
        .iter()
        .cloned()
        .chain(
            gaps.into_iter()
                .map(|range| StyleSpan::new(range, main.clone())),
        )
        .collect()
}

/// Resolve a lyric line's own overrides against `main`
pub fn resolve_line(line: &LyricLine, main: Option<&Style>) -> StyleMap {
    let partial = StyleMap::from_spans(line.partial_style.iter().cloned());
    resolve(line.char_len(), &partial, main)
}

/// Maximal runs of indices in `0..line_len` not covered by any span
///
/// Spans are visited in ascending start order, advancing a cursor past each
/// one; every jump of the cursor leaves a gap behind.
fn uncovered_runs(line_len: usize, map: &StyleMap) -> Vec<ClosedIndexRange> {
    let mut runs = Vec::new();
    let mut cursor = 0usize;

    for span in map {
        if cursor >= line_len {
            break;
        }
        let lower = span.range.lower();
        if lower > cursor {
            let end = lower.min(line_len);
            runs.extend(ClosedIndexRange::new(cursor, end - 1));
        }
        cursor = cursor.max(span.range.upper().saturating_add(1));
    }

    if cursor < line_len {
        runs.extend(ClosedIndexRange::new(cursor, line_len - 1));
    }

    runs
}
