//! Styled line rendering
//!
//! Backend-agnostic half of the pipeline. A resolved [`StyleMap`] and a
//! [`LaidOutLine`] go in, draw calls on a [`Canvas`] come out:
//!
//! 1. every glyph is classified and composited (shadow → stroke → fill)
//! 2. mask lines are overlaid, clipped to the glyphs of their range
//!
//! ## Key Components
//!
//! - `Canvas`: drawing capability (clip, blur, fill, stroke)
//! - `LaidOutLine` / `GlyphVisitor`: layout abstraction
//! - `classify`: per-glyph style lookup
//! - `composite` / `StyledGlyphPainter`: layered glyph drawing
//! - `render_mask_lines`: decorative strokes
//! - `EffectScale`: font-size proportional effect magnitudes

pub mod canvas;
pub mod classifier;
pub mod compositor;
pub mod layout;
pub mod mask_lines;
pub mod scale;

#[cfg(test)]
pub(crate) mod recording;

pub use canvas::Canvas;
pub use classifier::classify;
pub use compositor::{StyledGlyphPainter, composite};
pub use layout::{GlyphRun, GlyphVisitor, LaidGlyph, LaidOutLine, SubLine};
pub use mask_lines::render_mask_lines;
pub use scale::{EffectScale, FALLBACK_FONT_SIZE, REFERENCE_POINT_SIZE};

use crate::style::StyleMap;

/// Draw one laid-out line with its resolved styles
pub fn render_line<C: Canvas>(
    canvas: &mut C,
    line: &LaidOutLine<C::Glyph>,
    styles: &StyleMap,
    scale: EffectScale,
) {
    {
        let mut painter = StyledGlyphPainter::new(&mut *canvas, styles, scale);
        line.walk(&mut painter);
    }
    render_mask_lines(canvas, styles, line, scale);
}

#[cfg(test)]
mod tests {
    use super::recording::{Op, RecordingCanvas};
    use super::*;
    use crate::geometry::{Point, Rect};
    use crate::style::{ClosedIndexRange, MaskLine, Rgba, Shadow, Style, StyleSpan, resolve};

    fn layout(count: usize) -> LaidOutLine<u32> {
        LaidOutLine::new(
            vec![SubLine {
                bounds: Rect::new(0.0, 0.0, count as f32 * 10.0, 30.0),
                runs: vec![GlyphRun {
                    char_offset: 0,
                    glyphs: (0..count)
                        .map(|i| LaidGlyph {
                            glyph: i as u32,
                            chars: i..i + 1,
                            bounds: Rect::new(i as f32 * 10.0, 0.0, 10.0, 30.0),
                        })
                        .collect(),
                }],
            }],
            Some(30.0),
        )
    }

    fn decorated() -> Style {
        Style::colored(Rgba::rgb(255, 0, 0))
            .with_shadow(Shadow {
                x: 1.0,
                y: 1.0,
                blur: 0.0,
                color: Rgba::BLACK,
            })
            .with_mask_line(MaskLine {
                start: Point::new(0.0, 0.5),
                end: Point::new(1.0, 0.5),
                width: 2.0,
                color: Rgba::rgb(0, 0, 255),
            })
    }

    #[test]
    fn test_unmatched_glyphs_draw_plain() {
        let styles = StyleMap::from_spans(vec![StyleSpan::new(
            ClosedIndexRange::new(2, 3).unwrap(),
            decorated(),
        )]);
        let mut canvas = RecordingCanvas::new(Rgba::WHITE);
        render_line(&mut canvas, &layout(6), &styles, EffectScale::new(30.0));

        for plain in [0u32, 1, 4, 5] {
            assert!(canvas.ops.contains(&Op::Draw(plain)));
            let in_clip = canvas.ops.iter().any(
                |op| matches!(op, Op::BeginClip { glyphs, .. } if glyphs.contains(&plain)),
            );
            assert!(!in_clip, "glyph {} picked up an effect", plain);
        }
    }

    #[test]
    fn test_mask_lines_follow_all_glyphs() {
        let styles = StyleMap::from_spans(vec![StyleSpan::new(
            ClosedIndexRange::new(0, 4).unwrap(),
            decorated(),
        )]);
        let mut canvas = RecordingCanvas::new(Rgba::WHITE);
        render_line(&mut canvas, &layout(6), &styles, EffectScale::new(30.0));

        let first_stroke = canvas
            .ops
            .iter()
            .position(|op| matches!(op, Op::Stroke { .. }))
            .unwrap();
        let last_fill = canvas
            .ops
            .iter()
            .rposition(|op| matches!(op, Op::Fill { .. }))
            .unwrap();
        assert!(last_fill < first_stroke, "mask lines are drawn after every glyph");
        assert_eq!(canvas.strokes()[0].0, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_resolved_main_style_reaches_every_glyph() {
        let main = Style::colored(Rgba::rgb(9, 9, 9));
        let partial = StyleMap::from_spans(vec![StyleSpan::new(
            ClosedIndexRange::new(1, 1).unwrap(),
            Style::colored(Rgba::rgb(1, 1, 1)),
        )]);
        let styles = resolve(4, &partial, Some(&main));
        let mut canvas = RecordingCanvas::new(Rgba::WHITE);
        render_line(&mut canvas, &layout(4), &styles, EffectScale::new(30.0));

        let colors: Vec<Rgba> = canvas.fills().into_iter().map(|(_, c)| c).collect();
        assert_eq!(
            colors,
            vec![
                Rgba::rgb(9, 9, 9),
                Rgba::rgb(1, 1, 1),
                Rgba::rgb(9, 9, 9),
                Rgba::rgb(9, 9, 9)
            ]
        );
        assert!(!canvas.ops.iter().any(|op| matches!(op, Op::Draw(_))));
    }
}
