//! lyric-styler - Per-character styling for rendered lyric lines
//!
//! Lyric lines carry partial style overrides (color, font, shadow, stroke,
//! decorative mask lines) on character ranges. This crate completes those
//! ranges against a main style, classifies every shaped glyph, and paints
//! each one as shadow, stroke and fill layers before overlaying mask lines.
//!
//! ## Modules
//!
//! - `style`: data model, range maps and the range resolver
//! - `render`: backend-agnostic compositing over a [`render::Canvas`]
//! - `raster`: cosmic-text shaping and a software RGBA canvas
//! - `engine`: [`LineRenderer`], the memoizing façade
//! - `settings`: persisted [`RenderSettings`]

pub mod engine;
pub mod geometry;
pub mod raster;
pub mod render;
pub mod settings;
pub mod style;

pub use engine::{LineRenderer, SharedFontSystem};
pub use settings::{FontSettings, OverlapPolicy, RenderSettings, SettingsError};
pub use style::{
    ClosedIndexRange, LyricLine, MaskLine, Rgba, Shadow, Stroke, Style, StyleError, StyleMap,
    StyleSpan, resolve, resolve_line,
};

/// Route `tracing` output through the test harness
#[cfg(test)]
pub(crate) fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}
