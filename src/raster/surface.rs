//! Premultiplied RGBA pixel buffers and coverage masks
//!
//! Buffers cover a [`Region`] of canvas pixel space. Drawing calls take
//! canvas coordinates, so a layer only as large as its glyph can be painted
//! with the same calls as the full canvas.

use super::blur;
use crate::geometry::{Point, Rect, Segment};
use crate::style::Rgba;

/// Alpha coverage of one glyph, positioned in pixel space
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphMask {
    /// Pixel column of the mask's left edge
    pub left: i32,
    /// Pixel row of the mask's top edge
    pub top: i32,
    pub width: u32,
    pub height: u32,
    /// Row-major coverage in `[0, 1]`
    pub alpha: Vec<f32>,
}

impl GlyphMask {
    /// Pixels a copy translated by `(dx, dy)` can touch, bilinear spill included
    pub fn footprint(&self, dx: f32, dy: f32) -> Region {
        Region::new(
            (self.left as f32 + dx).floor() as i32 - 1,
            (self.top as f32 + dy).floor() as i32 - 1,
            self.width + 3,
            self.height + 3,
        )
    }

    fn at(&self, x: i32, y: i32) -> f32 {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return 0.0;
        }
        self.alpha[y as usize * self.width as usize + x as usize]
    }

    /// Bilinear coverage at a point in mask-local pixel coordinates
    ///
    /// Pixel `(i, j)` is centered on `(i + 0.5, j + 0.5)`.
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let fx = x - 0.5;
        let fy = y - 0.5;
        let x0 = fx.floor();
        let y0 = fy.floor();
        let tx = fx - x0;
        let ty = fy - y0;
        let (x0, y0) = (x0 as i32, y0 as i32);

        let top = self.at(x0, y0) * (1.0 - tx) + self.at(x0 + 1, y0) * tx;
        let bottom = self.at(x0, y0 + 1) * (1.0 - tx) + self.at(x0 + 1, y0 + 1) * tx;
        top * (1.0 - ty) + bottom * ty
    }
}

/// Pixel-aligned rectangle of canvas space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub const fn new(left: i32, top: i32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.left + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.top + self.height as i32
    }

    /// Smallest region holding both
    pub fn union(self, other: Region) -> Region {
        let left = self.left.min(other.left);
        let top = self.top.min(other.top);
        Region::new(
            left,
            top,
            (self.right().max(other.right()) - left) as u32,
            (self.bottom().max(other.bottom()) - top) as u32,
        )
    }

    /// Shared pixels, `None` when the regions do not meet
    pub fn intersect(self, other: Region) -> Option<Region> {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        (right > left && bottom > top)
            .then(|| Region::new(left, top, (right - left) as u32, (bottom - top) as u32))
    }

    /// Grow by `pad` pixels on every side
    pub fn inflate(self, pad: u32) -> Region {
        Region::new(
            self.left - pad as i32,
            self.top - pad as i32,
            self.width + pad * 2,
            self.height + pad * 2,
        )
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(
            self.left as f32,
            self.top as f32,
            self.width as f32,
            self.height as f32,
        )
    }

    fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Buffer index of canvas pixel `(x, y)`
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < self.left || y < self.top || x >= self.right() || y >= self.bottom() {
            return None;
        }
        Some((y - self.top) as usize * self.width as usize + (x - self.left) as usize)
    }
}

/// Coverage over a region, used as a clip
#[derive(Debug, Clone)]
pub struct Coverage {
    region: Region,
    alpha: Vec<f32>,
}

impl Coverage {
    pub fn empty(region: Region) -> Self {
        Self {
            region,
            alpha: vec![0.0; region.len()],
        }
    }

    /// Union in `mask` translated by a possibly fractional pixel offset
    pub fn union_mask(&mut self, mask: &GlyphMask, dx: f32, dy: f32) {
        let Some(area) = mask.footprint(dx, dy).intersect(self.region) else {
            return;
        };

        for py in area.top..area.bottom() {
            for px in area.left..area.right() {
                let local_x = px as f32 + 0.5 - mask.left as f32 - dx;
                let local_y = py as f32 + 0.5 - mask.top as f32 - dy;
                let a = mask.sample(local_x, local_y);
                if let Some(i) = self.region.index(px, py).filter(|_| a > 0.0) {
                    self.alpha[i] = self.alpha[i].max(a);
                }
            }
        }
    }

    /// Coverage at canvas pixel `(x, y)`, zero outside the region
    pub fn get(&self, x: i32, y: i32) -> f32 {
        self.region.index(x, y).map_or(0.0, |i| self.alpha[i])
    }

    pub fn is_empty(&self) -> bool {
        self.alpha.iter().all(|a| *a <= 0.0)
    }
}

/// Premultiplied RGBA float image over a region of canvas space
#[derive(Debug, Clone)]
pub struct Surface {
    region: Region,
    pixels: Vec<[f32; 4]>,
}

impl Surface {
    /// Surface anchored at the canvas origin
    pub fn new(width: u32, height: u32) -> Self {
        Self::for_region(Region::new(0, 0, width, height))
    }

    pub fn for_region(region: Region) -> Self {
        Self {
            region,
            pixels: vec![[0.0; 4]; region.len()],
        }
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn width(&self) -> u32 {
        self.region.width
    }

    pub fn height(&self) -> u32 {
        self.region.height
    }

    /// Premultiplied pixel at canvas position `(x, y)`, transparent outside
    pub fn pixel(&self, x: u32, y: u32) -> [f32; 4] {
        self.region
            .index(x as i32, y as i32)
            .map_or([0.0; 4], |i| self.pixels[i])
    }

    /// Straight-alpha 8-bit pixel at canvas position `(x, y)`
    pub fn rgba(&self, x: u32, y: u32) -> Rgba {
        let [r, g, b, a] = self.pixel(x, y);
        unpremultiply(r, g, b, a)
    }

    /// Source-over blend of `color` at partial coverage
    fn blend(&mut self, x: i32, y: i32, color: [f32; 4], coverage: f32) {
        if coverage <= 0.0 {
            return;
        }
        let Some(i) = self.region.index(x, y) else {
            return;
        };
        let dst = &mut self.pixels[i];
        let k = 1.0 - color[3] * coverage;
        for i in 0..4 {
            dst[i] = color[i] * coverage + dst[i] * k;
        }
    }

    /// Fill a rectangle with anti-aliased edges
    pub fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        let src = color.premultiplied();
        let (x0, y0, x1, y1) = self.pixel_span(rect);

        for py in y0..y1 {
            let cov_y = span_overlap(py as f32, rect.y, rect.max_y());
            for px in x0..x1 {
                let cov_x = span_overlap(px as f32, rect.x, rect.max_x());
                self.blend(px, py, src, cov_x * cov_y);
            }
        }
    }

    /// Stroke a segment with round caps
    pub fn stroke_segment(&mut self, segment: Segment, color: Rgba, width: f32) {
        if width.is_nan() || width <= 0.0 {
            return;
        }
        let src = color.premultiplied();
        let half = width / 2.0;
        let (x0, y0, x1, y1) = self.pixel_span(segment.bounds().inflate(half + 1.0));

        for py in y0..y1 {
            for px in x0..x1 {
                let center = Point::new(px as f32 + 0.5, py as f32 + 0.5);
                let coverage = (half + 0.5 - segment.distance_to(center)).clamp(0.0, 1.0);
                self.blend(px, py, src, coverage);
            }
        }
    }

    /// Paint `color` through a glyph mask placed at its own position
    pub fn draw_mask(&mut self, mask: &GlyphMask, color: Rgba) {
        let src = color.premultiplied();
        for row in 0..mask.height as i32 {
            for col in 0..mask.width as i32 {
                let a = mask.alpha[(row * mask.width as i32 + col) as usize];
                self.blend(mask.left + col, mask.top + row, src, a);
            }
        }
    }

    /// Integer pixel bounds of `rect` inside the region, as `(x0, y0, x1, y1)`
    fn pixel_span(&self, rect: Rect) -> (i32, i32, i32, i32) {
        let x0 = (rect.x.floor() as i32).max(self.region.left);
        let y0 = (rect.y.floor() as i32).max(self.region.top);
        let x1 = (rect.max_x().ceil() as i32).min(self.region.right());
        let y1 = (rect.max_y().ceil() as i32).min(self.region.bottom());
        (x0, y0, x1, y1)
    }

    /// Keep only what lies inside `clip`
    pub fn apply_clip(&mut self, clip: &Coverage) {
        let region = self.region;
        for y in region.top..region.bottom() {
            for x in region.left..region.right() {
                let a = clip.get(x, y);
                if let Some(i) = region.index(x, y) {
                    for c in self.pixels[i].iter_mut() {
                        *c *= a;
                    }
                }
            }
        }
    }

    /// Copy grown by `pad` transparent pixels on every side
    pub fn padded(&self, pad: u32) -> Surface {
        let mut out = Surface::for_region(self.region.inflate(pad));
        let width = self.region.width as usize;
        for (row, src) in self.pixels.chunks_exact(width.max(1)).enumerate() {
            let y = self.region.top + row as i32;
            if let Some(start) = out.region.index(self.region.left, y) {
                out.pixels[start..start + src.len()].copy_from_slice(src);
            }
        }
        out
    }

    pub fn blur(&mut self, sigma: f32) {
        blur::blur(
            &mut self.pixels,
            self.region.width as usize,
            self.region.height as usize,
            sigma,
            blur::DEFAULT_PASSES,
        );
    }

    /// Source-over composite of `self` onto the overlapping part of `dst`
    pub fn composite_onto(&self, dst: &mut Surface) {
        let Some(area) = self.region.intersect(dst.region) else {
            return;
        };
        for y in area.top..area.bottom() {
            for x in area.left..area.right() {
                let (Some(si), Some(di)) = (self.region.index(x, y), dst.region.index(x, y)) else {
                    continue;
                };
                let s = self.pixels[si];
                let d = &mut dst.pixels[di];
                let k = 1.0 - s[3];
                for i in 0..4 {
                    d[i] = s[i] + d[i] * k;
                }
            }
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.pixels.iter().all(|p| p[3] <= 1e-6)
    }

    /// Convert to a straight-alpha 8-bit image of the region
    pub fn to_image(&self) -> image::RgbaImage {
        let region = self.region;
        image::RgbaImage::from_fn(region.width, region.height, |x, y| {
            let [r, g, b, a] = self.pixels[y as usize * region.width as usize + x as usize];
            let c = unpremultiply(r, g, b, a);
            image::Rgba([c.r, c.g, c.b, c.a])
        })
    }
}

fn unpremultiply(r: f32, g: f32, b: f32, a: f32) -> Rgba {
    if a <= 0.0 {
        return Rgba::TRANSPARENT;
    }
    let channel = |c: f32| ((c / a).clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgba::new(
        channel(r),
        channel(g),
        channel(b),
        (a.clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

/// Length of `[start, end]` inside the unit pixel `[p, p + 1]`
fn span_overlap(p: f32, start: f32, end: f32) -> f32 {
    (end.min(p + 1.0) - start.max(p)).clamp(0.0, 1.0)
}
