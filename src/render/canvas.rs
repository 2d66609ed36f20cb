//! Drawing capability used by the compositor

use crate::geometry::{Rect, Segment, Vector};
use crate::style::Rgba;

/// Minimal drawing surface
///
/// Implementations keep a stack of layers: [`clip_to_silhouette`] opens a
/// layer, the closure paints into it, and on return the layer is masked to
/// the silhouette, blurred if a filter was added, and composited onto its
/// parent.
///
/// [`clip_to_silhouette`]: Canvas::clip_to_silhouette
pub trait Canvas {
    /// Glyph handle understood by this canvas
    type Glyph;

    /// Ambient fill color for unstyled text
    fn foreground(&self) -> Rgba;

    /// Draw a glyph in the ambient foreground
    fn draw(&mut self, glyph: &Self::Glyph);

    /// Paint inside a layer clipped to the union silhouette of `glyphs`
    /// translated by `offset`
    fn clip_to_silhouette<F>(&mut self, glyphs: &[&Self::Glyph], offset: Vector, paint: F)
    where
        F: FnOnce(&mut Self);

    /// Extent of the current layer in layout coordinates
    ///
    /// Covers the whole clip silhouette. `None` outside a layer or when the
    /// canvas does not track layer extents.
    fn clip_bounds(&self) -> Option<Rect>;

    /// Blur the current layer by `radius` logical pixels when it is composited
    fn add_blur_filter(&mut self, radius: f32);

    fn fill(&mut self, rect: Rect, color: Rgba);

    fn stroke(&mut self, segment: Segment, color: Rgba, width: f32);
}
