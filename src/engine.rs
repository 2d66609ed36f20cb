//! Line renderer
//!
//! Ties the pipeline together for one lyric line:
//!
//! 1. resolve partial styles against the main style (memoized)
//! 2. shape the text with cosmic-text (memoized)
//! 3. composite every glyph and overlay mask lines on a raster canvas
//!
//! ## Key Components
//!
//! - `LineRenderer`: owns the caches, the shaper and the glyph rasterizer
//! - `SharedFontSystem`: font database shared with other renderers

use std::collections::HashMap;
use std::sync::Arc;

use cosmic_text::FontSystem;
use parking_lot::Mutex;
use xxhash_rust::xxh3::Xxh3;

use crate::raster::{RasterCanvas, RasterGlyph, ShapeParams, SwashRasterizer, TextShaper};
use crate::render::{EffectScale, LaidOutLine, render_line};
use crate::settings::{OverlapPolicy, RenderSettings};
use crate::style::{LyricLine, Style, StyleError, StyleMap, resolve};

/// Font system shared between shapers and rasterizers
pub type SharedFontSystem = Arc<Mutex<FontSystem>>;

/// Renders styled lyric lines into RGBA images
pub struct LineRenderer {
    settings: RenderSettings,
    shaper: TextShaper,
    rasterizer: Mutex<SwashRasterizer>,
    /// Resolved style maps keyed by a hash of (text, partial styles, main style)
    resolved: Mutex<HashMap<u64, StyleMap>>,
}

impl LineRenderer {
    /// Create a renderer with shared font system
    ///
    /// The font system should be created once and shared to avoid the
    /// expensive `FontSystem::new()` call.
    pub fn new_with_font_system(settings: RenderSettings, font_system: SharedFontSystem) -> Self {
        let shaper = TextShaper::with_config(Arc::clone(&font_system), settings.font.clone())
            .with_cache_capacity(settings.shape_cache_capacity);
        Self {
            rasterizer: Mutex::new(SwashRasterizer::new(font_system)),
            shaper,
            settings,
            resolved: Mutex::new(HashMap::new()),
        }
    }

    /// Create a renderer with its own font system
    pub fn new(settings: RenderSettings) -> Self {
        let font_system: SharedFontSystem = Arc::new(Mutex::new(FontSystem::new()));
        Self::new_with_font_system(settings, font_system)
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn shaper(&self) -> &TextShaper {
        &self.shaper
    }

    /// Resolved style map of `line`, honoring the overlap policy
    pub fn resolve(&self, line: &LyricLine, main: Option<&Style>) -> Result<StyleMap, StyleError> {
        // An empty line has nothing to style, whatever its ranges claim
        if line.char_len() == 0 {
            return Ok(StyleMap::new());
        }

        let partial = match self.settings.overlap_policy {
            OverlapPolicy::Reject => StyleMap::try_from_spans(line.partial_style.iter().cloned())?,
            OverlapPolicy::Warn => StyleMap::from_spans(line.partial_style.iter().cloned()),
        };

        let Some(key) = resolve_key(line, main) else {
            return Ok(resolve(line.char_len(), &partial, main));
        };
        if let Some(cached) = self.resolved.lock().get(&key) {
            return Ok(cached.clone());
        }

        let styles = resolve(line.char_len(), &partial, main);
        let mut cache = self.resolved.lock();
        if cache.len() >= self.settings.resolve_cache_capacity {
            tracing::debug!("[LineRenderer] Resolve cache full ({} maps), clearing", cache.len());
            cache.clear();
        }
        cache.insert(key, styles.clone());
        Ok(styles)
    }

    pub fn cached_resolutions(&self) -> usize {
        self.resolved.lock().len()
    }

    /// Shape `line` at the font size effects will be scaled with
    pub fn layout(&self, line: &LyricLine, styles: &StyleMap, scale: EffectScale) -> LaidOutLine<RasterGlyph> {
        let params = ShapeParams {
            font_size: scale.factor(),
            line_height_ratio: self.settings.line_height_ratio,
            max_width: self.settings.max_width,
        };
        self.shaper.shape(&line.original, styles, params)
    }

    /// Render one line
    ///
    /// `font_size` falls back to the configured size when absent,
    /// non-finite or non-positive.
    pub fn render(
        &self,
        line: &LyricLine,
        main: Option<&Style>,
        font_size: Option<f32>,
    ) -> Result<image::RgbaImage, StyleError> {
        let styles = self.resolve(line, main)?;
        let scale = EffectScale::resolve(font_size, self.settings.fallback_font_size);
        let layout = self.layout(line, &styles, scale);

        let bounds = layout.bounds();
        let padding = self.settings.padding as f32;
        let width = (bounds.width + padding * 2.0).ceil().max(1.0) as u32;
        let height = (bounds.height + padding * 2.0).ceil().max(1.0) as u32;
        let origin_x = (padding - bounds.x).floor() as i32;
        let origin_y = (padding - bounds.y).floor() as i32;

        let mut rasterizer = self.rasterizer.lock();
        let mut canvas = RasterCanvas::new(&mut *rasterizer, width, height, self.settings.foreground)
            .with_origin(origin_x, origin_y);
        render_line(&mut canvas, &layout, &styles, scale);

        tracing::debug!(
            "[LineRenderer] Rendered {} glyphs into {}x{} with {} style ranges",
            layout.glyph_count(),
            width,
            height,
            styles.len()
        );
        Ok(canvas.into_image())
    }
}

/// Cache key of a resolution request
///
/// JSON writes non-finite floats as `null`, so the raw bits of every effect
/// value are hashed after the serialized form.
fn resolve_key(line: &LyricLine, main: Option<&Style>) -> Option<u64> {
    let bytes = match serde_json::to_vec(&(&line.original, &line.partial_style, main)) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!("[LineRenderer] Could not hash line for caching: {}", e);
            return None;
        }
    };

    let mut hasher = Xxh3::new();
    hasher.update(&bytes);
    let styles = line.partial_style.iter().map(|s| &s.style).chain(main);
    for value in styles.flat_map(effect_values) {
        hasher.update(&value.to_bits().to_le_bytes());
    }
    Some(hasher.digest())
}

fn effect_values(style: &Style) -> Vec<f32> {
    let mut values = Vec::new();
    if let Some(shadow) = &style.shadow {
        values.extend([shadow.x, shadow.y, shadow.blur]);
    }
    if let Some(stroke) = &style.stroke {
        values.extend([stroke.width, stroke.radius]);
    }
    for line in &style.mask_lines {
        values.extend([line.start.x, line.start.y, line.end.x, line.end.y, line.width]);
    }
    values
}
