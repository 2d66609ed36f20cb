//! Layered drawing of a single glyph
//!
//! A styled glyph is painted as up to six clipped layers, bottom to top:
//! shadow, four diagonal stroke copies, fill. Each layer is clipped to the
//! glyph's own silhouette at the layer's offset, so the fill always sits on
//! top of the stroke, which sits on top of the shadow.

use std::ops::Range;

use super::canvas::Canvas;
use super::classifier::classify;
use super::layout::GlyphVisitor;
use super::scale::EffectScale;
use crate::geometry::{Rect, Vector};
use crate::style::{Rgba, Style, StyleMap};

/// Diagonal directions of the four stroke copies
const STROKE_DIRECTIONS: [(f32, f32); 4] = [(1.0, 1.0), (1.0, -1.0), (-1.0, 1.0), (-1.0, -1.0)];

/// Draw `glyph` with its effective style
pub fn composite<C: Canvas>(
    canvas: &mut C,
    glyph: &C::Glyph,
    bounds: Rect,
    style: Option<&Style>,
    scale: EffectScale,
) {
    let Some(style) = style else {
        canvas.draw(glyph);
        return;
    };

    if let Some(shadow) = &style.shadow {
        let offset = scale.offset(shadow.x, shadow.y);
        paint_layer(
            canvas,
            glyph,
            bounds,
            offset,
            scale.apply(shadow.blur),
            shadow.color,
        );
    }

    if let Some(stroke) = &style.stroke {
        let width = scale.apply(stroke.width);
        let blur = scale.apply(stroke.radius);
        for (sx, sy) in STROKE_DIRECTIONS {
            let offset = Vector::new(sx * width, sy * width);
            paint_layer(canvas, glyph, bounds, offset, blur, stroke.color);
        }
    }

    let fill = style.color.unwrap_or_else(|| canvas.foreground());
    paint_layer(canvas, glyph, bounds, Vector::ZERO, 0.0, fill);
}

/// Fill a copy of the glyph translated by `offset`
///
/// The fill covers the whole layer so ink outside the advance box (marks,
/// overhangs) is kept. `bounds` is only used when the canvas reports no
/// layer extent.
fn paint_layer<C: Canvas>(
    canvas: &mut C,
    glyph: &C::Glyph,
    bounds: Rect,
    offset: Vector,
    blur: f32,
    color: Rgba,
) {
    canvas.clip_to_silhouette(&[glyph], offset, |layer| {
        if blur > 0.0 {
            layer.add_blur_filter(blur);
        }
        let rect = layer
            .clip_bounds()
            .unwrap_or_else(|| bounds.translate(offset).inflate(blur));
        layer.fill(rect, color);
    });
}

/// Visitor painting each glyph with the style the map assigns it
pub struct StyledGlyphPainter<'a, C: Canvas> {
    canvas: &'a mut C,
    styles: &'a StyleMap,
    scale: EffectScale,
}

impl<'a, C: Canvas> StyledGlyphPainter<'a, C> {
    pub fn new(canvas: &'a mut C, styles: &'a StyleMap, scale: EffectScale) -> Self {
        Self {
            canvas,
            styles,
            scale,
        }
    }
}

impl<C: Canvas> GlyphVisitor<C::Glyph> for StyledGlyphPainter<'_, C> {
    fn visit(&mut self, glyph: &C::Glyph, chars: Range<usize>, bounds: Rect) {
        let style = classify(&chars, self.styles);
        composite(&mut *self.canvas, glyph, bounds, style, self.scale);
    }
}
