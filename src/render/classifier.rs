//! Per-glyph style lookup

use std::ops::Range;

use crate::style::{Style, StyleMap};

/// Effective style of a glyph covering `chars`
///
/// The first span (lowest start) sharing a character with the glyph wins.
/// `None` means the glyph is drawn plain.
pub fn classify<'m>(chars: &Range<usize>, styles: &'m StyleMap) -> Option<&'m Style> {
    if styles.is_empty() {
        return None;
    }
    styles.find(chars).map(|span| &span.style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{ClosedIndexRange, Rgba, StyleSpan};

    fn styles() -> StyleMap {
        StyleMap::from_spans(vec![
            StyleSpan::new(
                ClosedIndexRange::new(0, 3).unwrap(),
                Style::colored(Rgba::rgb(1, 0, 0)),
            ),
            StyleSpan::new(
                ClosedIndexRange::new(6, 8).unwrap(),
                Style::colored(Rgba::rgb(2, 0, 0)),
            ),
        ])
    }

    #[test]
    fn test_empty_map_fast_path() {
        assert!(classify(&(0..1), &StyleMap::new()).is_none());
    }

    #[test]
    fn test_glyph_inside_range() {
        let map = styles();
        assert_eq!(classify(&(2..3), &map).and_then(|s| s.color), Some(Rgba::rgb(1, 0, 0)));
        assert_eq!(classify(&(8..9), &map).and_then(|s| s.color), Some(Rgba::rgb(2, 0, 0)));
    }

    #[test]
    fn test_glyph_outside_every_range() {
        let map = styles();
        assert!(classify(&(4..5), &map).is_none());
        assert!(classify(&(9..12), &map).is_none());
    }

    #[test]
    fn test_multi_char_glyph_straddling_boundary() {
        // A ligature over chars 3..7 touches both spans; the lower one wins
        let map = styles();
        assert_eq!(classify(&(3..7), &map).and_then(|s| s.color), Some(Rgba::rgb(1, 0, 0)));
        assert_eq!(classify(&(5..7), &map).and_then(|s| s.color), Some(Rgba::rgb(2, 0, 0)));
    }
}
