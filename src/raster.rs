//! Software rasterization backend
//!
//! Shapes lines with cosmic-text and paints them into premultiplied RGBA
//! layers, producing an `image::RgbaImage`.

pub mod blur;
pub mod canvas;
pub mod shaper;
pub mod surface;

pub use canvas::{GlyphRasterizer, RasterCanvas, RasterGlyph, SwashRasterizer};
pub use shaper::{FontOverride, ShapeParams, TextShaper, load_font_file};
pub use surface::{Coverage, GlyphMask, Region, Surface};
