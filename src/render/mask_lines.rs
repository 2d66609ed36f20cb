//! Decorative strokes clipped to a style range's glyphs

use super::canvas::Canvas;
use super::layout::LaidOutLine;
use super::scale::EffectScale;
use crate::geometry::{Point, Segment, Size, Vector};
use crate::style::StyleMap;

/// Overlay every mask line of `styles` onto an already drawn line
///
/// Glyphs are addressed by their position in layout order, starting at the
/// range's lower bound and stopping before its upper bound. Ranges starting
/// past the last glyph are skipped.
pub fn render_mask_lines<C: Canvas>(
    canvas: &mut C,
    styles: &StyleMap,
    line: &LaidOutLine<C::Glyph>,
    scale: EffectScale,
) {
    let size = line.rendered_size();
    let glyphs: Vec<&C::Glyph> = line.glyphs().collect();
    let glyph_count = glyphs.len();

    for span in styles {
        if span.style.mask_lines.is_empty() {
            continue;
        }

        let lower = span.range.lower();
        if lower >= glyph_count {
            tracing::debug!(
                "[MaskLines] Range {} starts past the last of {} glyphs, skipping",
                span.range,
                glyph_count
            );
            continue;
        }
        let clip = &glyphs[lower..span.range.upper().min(glyph_count)];

        for mask in &span.style.mask_lines {
            let segment = Segment::new(to_line_box(mask.start, size), to_line_box(mask.end, size));
            let width = scale.apply(mask.width);
            canvas.clip_to_silhouette(clip, Vector::ZERO, |layer| {
                layer.stroke(segment, mask.color, width);
            });
        }
    }
}

/// Map a `[0, 1]` fraction of the line box to logical coordinates
fn to_line_box(p: Point, size: Size) -> Point {
    Point::new(p.x * size.width, p.y * size.height)
}
