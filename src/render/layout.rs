//! Laid-out text as seen by the renderer
//!
//! A line is split into sub-lines (wrapping), sub-lines into runs and runs into
//! glyphs. Glyph character ranges are relative to their run; the run carries
//! the additive offset into the line. The glyph payload `G` is whatever the
//! target [`Canvas`](super::Canvas) needs to rasterize a silhouette.

use std::ops::Range;

use crate::geometry::{Rect, Size};

/// Receives every glyph of a line in layout order
pub trait GlyphVisitor<G> {
    /// `chars` is absolute within the line, `bounds` is the typographic box
    fn visit(&mut self, glyph: &G, chars: Range<usize>, bounds: Rect);
}

#[derive(Debug, Clone)]
pub struct LaidGlyph<G> {
    pub glyph: G,
    /// Half-open character range relative to the owning run
    pub chars: Range<usize>,
    pub bounds: Rect,
}

#[derive(Debug, Clone)]
pub struct GlyphRun<G> {
    /// Character index of the run start within the line
    pub char_offset: usize,
    pub glyphs: Vec<LaidGlyph<G>>,
}

impl<G> GlyphRun<G> {
    pub fn absolute_chars(&self, glyph: &LaidGlyph<G>) -> Range<usize> {
        glyph.chars.start + self.char_offset..glyph.chars.end + self.char_offset
    }
}

/// One visual line after wrapping
#[derive(Debug, Clone)]
pub struct SubLine<G> {
    pub bounds: Rect,
    pub runs: Vec<GlyphRun<G>>,
}

#[derive(Debug, Clone)]
pub struct LaidOutLine<G> {
    pub sub_lines: Vec<SubLine<G>>,
    /// Font size the layout was produced with, if known
    pub font_size: Option<f32>,
}

impl<G> Default for LaidOutLine<G> {
    fn default() -> Self {
        Self {
            sub_lines: Vec::new(),
            font_size: None,
        }
    }
}

impl<G> LaidOutLine<G> {
    pub fn new(sub_lines: Vec<SubLine<G>>, font_size: Option<f32>) -> Self {
        Self {
            sub_lines,
            font_size,
        }
    }

    /// Visit every glyph in layout order
    pub fn walk<V: GlyphVisitor<G>>(&self, visitor: &mut V) {
        for sub_line in &self.sub_lines {
            for run in &sub_line.runs {
                for glyph in &run.glyphs {
                    visitor.visit(&glyph.glyph, run.absolute_chars(glyph), glyph.bounds);
                }
            }
        }
    }

    /// Glyph payloads in layout order
    pub fn glyphs(&self) -> impl Iterator<Item = &G> + '_ {
        self.sub_lines
            .iter()
            .flat_map(|l| l.runs.iter())
            .flat_map(|r| r.glyphs.iter())
            .map(|g| &g.glyph)
    }

    pub fn glyph_count(&self) -> usize {
        self.sub_lines
            .iter()
            .flat_map(|l| l.runs.iter())
            .map(|r| r.glyphs.len())
            .sum()
    }

    /// Box that mask line fractions are mapped onto
    ///
    /// Width of the first sub-line (wrapped sub-lines are assumed to be of
    /// uniform width), height summed over all sub-lines.
    pub fn rendered_size(&self) -> Size {
        let width = self.sub_lines.first().map_or(0.0, |l| l.bounds.width);
        let height = self.sub_lines.iter().map(|l| l.bounds.height).sum();
        Size::new(width, height)
    }

    /// Union of all sub-line boxes
    pub fn bounds(&self) -> Rect {
        let mut iter = self.sub_lines.iter().map(|l| l.bounds);
        let Some(first) = iter.next() else {
            return Rect::default();
        };
        iter.fold(first, |acc, r| {
            let x = acc.x.min(r.x);
            let y = acc.y.min(r.y);
            Rect::new(x, y, acc.max_x().max(r.max_x()) - x, acc.max_y().max(r.max_y()) - y)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Collect(Vec<(u32, Range<usize>)>);

    impl GlyphVisitor<u32> for Collect {
        fn visit(&mut self, glyph: &u32, chars: Range<usize>, _bounds: Rect) {
            self.0.push((*glyph, chars));
        }
    }

    fn glyph(id: u32, chars: Range<usize>, x: f32) -> LaidGlyph<u32> {
        LaidGlyph {
            glyph: id,
            chars,
            bounds: Rect::new(x, 0.0, 10.0, 20.0),
        }
    }

    fn two_line_layout() -> LaidOutLine<u32> {
        LaidOutLine::new(
            vec![
                SubLine {
                    bounds: Rect::new(0.0, 0.0, 100.0, 20.0),
                    runs: vec![
                        GlyphRun {
                            char_offset: 0,
                            glyphs: vec![glyph(0, 0..1, 0.0), glyph(1, 1..2, 10.0)],
                        },
                        GlyphRun {
                            char_offset: 2,
                            glyphs: vec![glyph(2, 0..2, 20.0)],
                        },
                    ],
                },
                SubLine {
                    bounds: Rect::new(0.0, 20.0, 60.0, 25.0),
                    runs: vec![GlyphRun {
                        char_offset: 4,
                        glyphs: vec![glyph(3, 0..1, 0.0)],
                    }],
                },
            ],
            Some(24.0),
        )
    }

    #[test]
    fn test_walk_applies_run_offsets() {
        let mut collect = Collect(Vec::new());
        two_line_layout().walk(&mut collect);
        assert_eq!(
            collect.0,
            vec![(0, 0..1), (1, 1..2), (2, 2..4), (3, 4..5)]
        );
    }

    #[test]
    fn test_glyph_order_and_count() {
        let layout = two_line_layout();
        assert_eq!(layout.glyph_count(), 4);
        assert_eq!(layout.glyphs().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_rendered_size_uses_first_width_and_total_height() {
        let size = two_line_layout().rendered_size();
        assert_eq!(size, Size::new(100.0, 45.0));
    }

    #[test]
    fn test_bounds_union() {
        assert_eq!(two_line_layout().bounds(), Rect::new(0.0, 0.0, 100.0, 45.0));
        assert_eq!(LaidOutLine::<u32>::default().bounds(), Rect::default());
    }
}
