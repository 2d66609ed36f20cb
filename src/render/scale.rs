//! Font-size proportional effect scaling

use crate::geometry::Vector;

/// Font size at which declared effect values equal logical pixels
pub const REFERENCE_POINT_SIZE: f32 = 30.0;

/// Font size assumed when the layout cannot report one
pub const FALLBACK_FONT_SIZE: f32 = 14.0;

/// Converts declared style magnitudes into logical pixels
///
/// `physical = declared * factor / 30`, where `factor` is the font size in
/// effect while drawing. Effects therefore grow linearly with the text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectScale {
    factor: f32,
}

impl EffectScale {
    /// Scale for a known font size; unusable sizes fall back to
    /// [`FALLBACK_FONT_SIZE`]
    pub fn new(font_size: f32) -> Self {
        Self::resolve(Some(font_size), FALLBACK_FONT_SIZE)
    }

    /// Scale for a font size the layout may not have reported
    pub fn from_font_size(font_size: Option<f32>) -> Self {
        Self::resolve(font_size, FALLBACK_FONT_SIZE)
    }

    /// Like [`from_font_size`](Self::from_font_size) with a custom fallback
    pub fn resolve(font_size: Option<f32>, fallback: f32) -> Self {
        let usable = |size: &f32| size.is_finite() && *size > 0.0;
        let factor = font_size
            .filter(usable)
            .or(Some(fallback).filter(usable))
            .unwrap_or(FALLBACK_FONT_SIZE);
        Self { factor }
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    /// Physical magnitude of a declared value
    pub fn apply(&self, declared: f32) -> f32 {
        declared * self.factor / REFERENCE_POINT_SIZE
    }

    /// Physical offset of a declared `(x, y)` pair
    pub fn offset(&self, x: f32, y: f32) -> Vector {
        Vector::new(self.apply(x), self.apply(y))
    }
}

impl Default for EffectScale {
    fn default() -> Self {
        Self {
            factor: FALLBACK_FONT_SIZE,
        }
    }
}
