//! Software [`Canvas`] over premultiplied float layers
//!
//! Every `clip_to_silhouette` call pushes a transparent layer covering just
//! the silhouette's pixels. When the paint closure returns, the layer is
//! masked to the union silhouette, grown and blurred if a filter was
//! requested, and composited source-over onto its parent.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use cosmic_text::{CacheKey, FontSystem, SwashCache, SwashContent};
use parking_lot::Mutex;

use super::blur;
use super::surface::{Coverage, GlyphMask, Region, Surface};
use crate::geometry::{Rect, Segment, Vector};
use crate::render::Canvas;
use crate::style::Rgba;

/// Radius to standard deviation, as Skia converts blur radii
const BLUR_SIGMA_SCALE: f32 = 0.57735;
const BLUR_SIGMA_BIAS: f32 = 0.5;

/// Turns glyph handles into coverage masks
pub trait GlyphRasterizer {
    type Glyph;

    /// Coverage of `glyph` in layout pixel space, `None` for blank glyphs
    fn silhouette(&mut self, glyph: &Self::Glyph) -> Option<GlyphMask>;
}

impl<R: GlyphRasterizer + ?Sized> GlyphRasterizer for &mut R {
    type Glyph = R::Glyph;

    fn silhouette(&mut self, glyph: &Self::Glyph) -> Option<GlyphMask> {
        (**self).silhouette(glyph)
    }
}

/// Physical glyph produced by the text shaper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RasterGlyph {
    pub cache_key: CacheKey,
    /// Pen position in whole pixels
    pub x: i32,
    /// Baseline in whole pixels
    pub y: i32,
}

/// Rasterizes glyphs through cosmic-text's swash cache
pub struct SwashRasterizer {
    font_system: Arc<Mutex<FontSystem>>,
    cache: SwashCache,
}

impl SwashRasterizer {
    pub fn new(font_system: Arc<Mutex<FontSystem>>) -> Self {
        Self {
            font_system,
            cache: SwashCache::new(),
        }
    }
}

impl GlyphRasterizer for SwashRasterizer {
    type Glyph = RasterGlyph;

    fn silhouette(&mut self, glyph: &RasterGlyph) -> Option<GlyphMask> {
        let mut font_system = self.font_system.lock();
        let image = self.cache.get_image(&mut font_system, glyph.cache_key).as_ref()?;

        let placement = image.placement;
        let pixels = placement.width as usize * placement.height as usize;
        if pixels == 0 {
            return None;
        }
        let stride = image.data.len() / pixels;
        if stride == 0 {
            return None;
        }

        let alpha = image
            .data
            .chunks_exact(stride)
            .map(|px| {
                let a = match image.content {
                    SwashContent::Mask => px[0],
                    SwashContent::Color => px[stride - 1],
                    SwashContent::SubpixelMask => px[..stride.min(3)].iter().copied().max().unwrap_or(0),
                };
                a as f32 / 255.0
            })
            .collect();

        Some(GlyphMask {
            left: glyph.x + placement.left,
            top: glyph.y - placement.top,
            width: placement.width,
            height: placement.height,
            alpha,
        })
    }
}

struct Layer {
    surface: Surface,
    clip: Coverage,
    blur: f32,
}

/// Canvas rendering into an RGBA pixel buffer
pub struct RasterCanvas<R: GlyphRasterizer> {
    rasterizer: R,
    foreground: Rgba,
    /// Pixel offset applied to everything drawn
    origin: (i32, i32),
    base: Surface,
    layers: Vec<Layer>,
}

impl<R: GlyphRasterizer> RasterCanvas<R> {
    pub fn new(rasterizer: R, width: u32, height: u32, foreground: Rgba) -> Self {
        Self {
            rasterizer,
            foreground,
            origin: (0, 0),
            base: Surface::new(width, height),
            layers: Vec::new(),
        }
    }

    /// Shift layout coordinates by whole pixels, e.g. to leave room for padding
    pub fn with_origin(mut self, x: i32, y: i32) -> Self {
        self.origin = (x, y);
        self
    }

    pub fn width(&self) -> u32 {
        self.base.width()
    }

    pub fn height(&self) -> u32 {
        self.base.height()
    }

    /// Composited result so far
    pub fn surface(&self) -> &Surface {
        &self.base
    }

    pub fn into_image(self) -> image::RgbaImage {
        self.base.to_image()
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        self.base
            .to_image()
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::debug!(
            "[RasterCanvas] Saved {}x{} line to {}",
            self.width(),
            self.height(),
            path.display()
        );
        Ok(())
    }

    fn offset(&self) -> Vector {
        Vector::new(self.origin.0 as f32, self.origin.1 as f32)
    }

    fn target(&mut self) -> &mut Surface {
        match self.layers.last_mut() {
            Some(layer) => &mut layer.surface,
            None => &mut self.base,
        }
    }
}

impl<R: GlyphRasterizer> Canvas for RasterCanvas<R> {
    type Glyph = R::Glyph;

    fn foreground(&self) -> Rgba {
        self.foreground
    }

    fn draw(&mut self, glyph: &Self::Glyph) {
        let Some(mut mask) = self.rasterizer.silhouette(glyph) else {
            return;
        };
        mask.left += self.origin.0;
        mask.top += self.origin.1;
        let color = self.foreground;
        self.target().draw_mask(&mask, color);
    }

    fn clip_to_silhouette<F>(&mut self, glyphs: &[&Self::Glyph], offset: Vector, paint: F)
    where
        F: FnOnce(&mut Self),
    {
        let shift = self.offset() + offset;
        let masks: Vec<GlyphMask> = glyphs
            .iter()
            .filter_map(|glyph| self.rasterizer.silhouette(glyph))
            .collect();
        let canvas = Region::new(0, 0, self.width(), self.height());
        let Some(region) = masks
            .iter()
            .map(|mask| mask.footprint(shift.dx, shift.dy))
            .reduce(Region::union)
            .and_then(|region| region.intersect(canvas))
        else {
            return;
        };

        let mut clip = Coverage::empty(region);
        for mask in &masks {
            clip.union_mask(mask, shift.dx, shift.dy);
        }
        // Blank glyphs such as spaces leave nothing to paint into
        if clip.is_empty() {
            return;
        }

        self.layers.push(Layer {
            surface: Surface::for_region(region),
            clip,
            blur: 0.0,
        });
        paint(self);

        let Some(Layer {
            mut surface,
            clip,
            blur: radius,
        }) = self.layers.pop()
        else {
            return;
        };
        surface.apply_clip(&clip);
        if radius > 0.0 {
            let sigma = radius * BLUR_SIGMA_SCALE + BLUR_SIGMA_BIAS;
            surface = surface.padded(blur::extent(sigma, blur::DEFAULT_PASSES) as u32);
            surface.blur(sigma);
        }
        surface.composite_onto(self.target());
    }

    fn clip_bounds(&self) -> Option<Rect> {
        let layer = self.layers.last()?;
        let (x, y) = self.origin;
        Some(
            layer
                .surface
                .region()
                .to_rect()
                .translate(Vector::new(-x as f32, -y as f32)),
        )
    }

    fn add_blur_filter(&mut self, radius: f32) {
        match self.layers.last_mut() {
            Some(layer) if radius > 0.0 => layer.blur = radius,
            Some(_) => {}
            None => tracing::debug!("[RasterCanvas] Blur requested outside a layer, ignoring"),
        }
    }

    fn fill(&mut self, rect: Rect, color: Rgba) {
        let rect = rect.translate(self.offset());
        self.target().fill_rect(rect, color);
    }

    fn stroke(&mut self, segment: Segment, color: Rgba, width: f32) {
        let shift = self.offset();
        let segment = Segment::new(segment.from.translate(shift), segment.to.translate(shift));
        self.target().stroke_segment(segment, color, width);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::render::{EffectScale, composite};
    use crate::style::{Shadow, Stroke, Style};

    /// Rasterizer drawing every glyph as a solid box
    pub(crate) struct BoxRasterizer;

    /// `(left, top, size)` in layout pixels
    pub(crate) type BoxGlyph = (i32, i32, u32);

    impl GlyphRasterizer for BoxRasterizer {
        type Glyph = BoxGlyph;

        fn silhouette(&mut self, glyph: &BoxGlyph) -> Option<GlyphMask> {
            let (left, top, size) = *glyph;
            (size > 0).then(|| GlyphMask {
                left,
                top,
                width: size,
                height: size,
                alpha: vec![1.0; (size * size) as usize],
            })
        }
    }

    const RED: Rgba = Rgba::rgb(255, 0, 0);
    const BLUE: Rgba = Rgba::rgb(0, 0, 255);
    const GREEN: Rgba = Rgba::rgb(0, 255, 0);

    fn canvas() -> RasterCanvas<BoxRasterizer> {
        RasterCanvas::new(BoxRasterizer, 40, 40, Rgba::WHITE)
    }

    fn glyph_box(glyph: BoxGlyph) -> Rect {
        Rect::new(glyph.0 as f32, glyph.1 as f32, glyph.2 as f32, glyph.2 as f32)
    }

    #[test]
    fn test_draw_uses_foreground() {
        let mut canvas = canvas();
        canvas.draw(&(5, 5, 4));
        assert_eq!(canvas.surface().rgba(6, 6), Rgba::WHITE);
        assert_eq!(canvas.surface().rgba(10, 10), Rgba::TRANSPARENT);
    }

    #[test]
    fn test_fill_is_clipped_to_silhouette() {
        let mut canvas = canvas();
        let glyph = (10, 10, 5);
        canvas.clip_to_silhouette(&[&glyph], Vector::ZERO, |layer| {
            layer.fill(Rect::new(0.0, 0.0, 40.0, 40.0), RED);
        });
        assert_eq!(canvas.surface().rgba(12, 12), RED);
        assert_eq!(canvas.surface().rgba(9, 12), Rgba::TRANSPARENT);
        assert_eq!(canvas.surface().rgba(15, 12), Rgba::TRANSPARENT);
    }

    #[test]
    fn test_clip_offset_moves_the_silhouette() {
        let mut canvas = canvas();
        let glyph = (10, 10, 4);
        canvas.clip_to_silhouette(&[&glyph], Vector::new(6.0, 0.0), |layer| {
            layer.fill(Rect::new(0.0, 0.0, 40.0, 40.0), RED);
        });
        assert_eq!(canvas.surface().rgba(11, 11), Rgba::TRANSPARENT);
        assert_eq!(canvas.surface().rgba(17, 11), RED);
    }

    #[test]
    fn test_origin_shifts_everything() {
        let mut canvas = canvas().with_origin(3, 2);
        canvas.draw(&(0, 0, 2));
        canvas.fill(Rect::new(10.0, 10.0, 1.0, 1.0), RED);
        assert_eq!(canvas.surface().rgba(3, 2), Rgba::WHITE);
        assert_eq!(canvas.surface().rgba(0, 0), Rgba::TRANSPARENT);
        assert_eq!(canvas.surface().rgba(13, 12), RED);
    }

    #[test]
    fn test_blur_softens_the_layer_edge() {
        let mut canvas = canvas();
        let glyph = (10, 10, 10);
        canvas.clip_to_silhouette(&[&glyph], Vector::ZERO, |layer| {
            layer.add_blur_filter(4.0);
            layer.fill(glyph_box(glyph), RED);
        });
        let center = canvas.surface().rgba(15, 15).a;
        let edge = canvas.surface().rgba(10, 15).a;
        let outside = canvas.surface().rgba(8, 15).a;
        assert!(edge < center, "edge {} should be softer than center {}", edge, center);
        assert!(outside > 0, "blur should leak past the silhouette");
    }

    #[test]
    fn test_clip_bounds_track_the_layer() {
        let mut canvas = canvas().with_origin(2, 3);
        assert_eq!(canvas.clip_bounds(), None);
        let glyph = (10, 10, 4);
        let mut seen = None;
        canvas.clip_to_silhouette(&[&glyph], Vector::ZERO, |layer| {
            seen = layer.clip_bounds();
        });
        let bounds = seen.unwrap();
        assert!(bounds.x <= 10.0 && bounds.y <= 10.0);
        assert!(bounds.max_x() >= 14.0 && bounds.max_y() >= 14.0);
        assert!(bounds.width < 10.0, "layer is sized to the glyph, not the canvas");
    }

    #[test]
    fn test_zero_advance_glyph_keeps_its_ink() {
        let mut plain = canvas();
        let mut styled = canvas();
        let glyph = (10, 10, 10);
        let advance = Rect::new(10.0, 10.0, 0.0, 10.0);

        composite(&mut plain, &glyph, advance, None, EffectScale::new(30.0));
        composite(&mut styled, &glyph, advance, Some(&Style::colored(RED)), EffectScale::new(30.0));

        assert_eq!(plain.surface().rgba(15, 15), Rgba::WHITE);
        assert_eq!(styled.surface().rgba(15, 15), RED);
    }

    #[test]
    fn test_overhanging_ink_is_filled_past_the_advance() {
        let mut canvas = canvas();
        let glyph = (10, 10, 10);
        let narrow_advance = Rect::new(10.0, 10.0, 4.0, 10.0);
        let style = Style::colored(RED).with_stroke(Stroke {
            width: 1.0,
            radius: 0.0,
            color: GREEN,
        });
        composite(&mut canvas, &glyph, narrow_advance, Some(&style), EffectScale::new(30.0));

        assert_eq!(canvas.surface().rgba(17, 15), RED);
        assert_eq!(canvas.surface().rgba(20, 15), GREEN);
    }

    #[test]
    fn test_blurred_layer_spreads_past_its_clip_region() {
        let mut canvas = canvas();
        let glyph = (15, 15, 4);
        canvas.clip_to_silhouette(&[&glyph], Vector::ZERO, |layer| {
            layer.add_blur_filter(6.0);
            layer.fill(Rect::new(0.0, 0.0, 40.0, 40.0), RED);
        });
        assert!(canvas.surface().rgba(11, 17).a > 0, "blur reaches beyond the glyph footprint");
        assert_eq!(canvas.surface().rgba(0, 0).a, 0);
    }

    #[test]
    fn test_blank_silhouette_skips_painting() {
        let mut canvas = canvas();
        let mut painted = false;
        canvas.clip_to_silhouette(&[&(5, 5, 0)], Vector::ZERO, |layer| {
            painted = true;
            layer.fill(Rect::new(0.0, 0.0, 40.0, 40.0), RED);
        });
        assert!(!painted);
        assert!(canvas.surface().is_transparent());
    }

    #[test]
    fn test_blur_outside_layer_is_ignored() {
        let mut canvas = canvas();
        canvas.add_blur_filter(5.0);
        canvas.fill(Rect::new(0.0, 0.0, 2.0, 2.0), RED);
        assert_eq!(canvas.surface().rgba(1, 1), RED);
        assert_eq!(canvas.surface().rgba(2, 2), Rgba::TRANSPARENT);
    }

    #[test]
    fn test_fill_covers_stroke_covers_shadow() {
        let mut canvas = canvas();
        let glyph = (10, 10, 10);
        let style = Style::colored(RED)
            .with_shadow(Shadow {
                x: 4.0,
                y: 4.0,
                blur: 0.0,
                color: BLUE,
            })
            .with_stroke(Stroke {
                width: 1.0,
                radius: 0.0,
                color: GREEN,
            });
        composite(&mut canvas, &glyph, glyph_box(glyph), Some(&style), EffectScale::new(30.0));

        let s = canvas.surface();
        // Interior belongs to the fill
        assert_eq!(s.rgba(14, 14), RED);
        // Stroke copies poke one pixel out of the glyph
        assert_eq!(s.rgba(20, 15), GREEN);
        assert_eq!(s.rgba(9, 15), GREEN);
        // Shadow shows only where neither stroke nor fill reaches
        assert_eq!(s.rgba(23, 23), BLUE);
        assert_eq!(s.rgba(30, 30), Rgba::TRANSPARENT);
    }

    #[test]
    fn test_into_image_dimensions() {
        let image = RasterCanvas::new(BoxRasterizer, 7, 3, Rgba::WHITE).into_image();
        assert_eq!(image.dimensions(), (7, 3));
    }

    #[test]
    fn test_save_png_round_trip() {
        let mut canvas = RasterCanvas::new(BoxRasterizer, 4, 4, Rgba::WHITE);
        canvas.fill(Rect::new(0.0, 0.0, 2.0, 2.0), RED);

        let path = std::env::temp_dir()
            .join(format!("lyric-styler-canvas-{}", std::process::id()))
            .join("line.png");
        canvas.save_png(&path).unwrap();

        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded.dimensions(), (4, 4));
        assert_eq!(loaded.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(loaded.get_pixel(3, 3).0[3], 0);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
