//! Text shaping and layout using cosmic-text
//!
//! Turns a lyric line into a [`LaidOutLine`] of physical glyphs. Font
//! overrides from the line's style map are applied while shaping, as rich
//! text spans.
//!
//! ## Caching
//!
//! Shaping is expensive, so results are cached based on:
//! - Text content
//! - Font size (rounded to avoid cache misses from floating point differences)
//! - Max width (rounded)
//! - Font overrides

use std::collections::HashMap;
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, Weight};
use parking_lot::Mutex;

use super::canvas::RasterGlyph;
use crate::geometry::Rect;
use crate::render::{GlyphRun, LaidGlyph, LaidOutLine, SubLine};
use crate::settings::FontSettings;
use crate::style::StyleMap;

/// Shaped lines kept before the cache is flushed
const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Font family forced onto a character range
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontOverride {
    pub chars: Range<usize>,
    pub family: String,
}

impl FontOverride {
    /// Overrides carried by `styles`, first span wins where they overlap
    pub fn from_styles(styles: &StyleMap) -> Vec<FontOverride> {
        let mut overrides: Vec<FontOverride> = Vec::new();
        for span in styles {
            let Some(family) = &span.style.font_override else {
                continue;
            };
            let chars = span.range.to_half_open();
            let start = overrides
                .last()
                .map_or(chars.start, |prev| chars.start.max(prev.chars.end));
            if start < chars.end {
                overrides.push(FontOverride {
                    chars: start..chars.end,
                    family: family.clone(),
                });
            }
        }
        overrides
    }
}

/// Cache key for shaped lines
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ShapingCacheKey {
    text: String,
    /// Font size (multiplied by 100 and rounded to avoid float comparison issues)
    font_size_x100: u32,
    /// Max width (rounded to nearest 10 pixels), 0 when unbounded
    max_width_rounded: u32,
    overrides: Vec<FontOverride>,
}

/// Layout parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeParams {
    pub font_size: f32,
    pub line_height_ratio: f32,
    pub max_width: Option<f32>,
}

impl ShapeParams {
    pub fn new(font_size: f32) -> Self {
        Self {
            font_size,
            line_height_ratio: 1.4,
            max_width: None,
        }
    }

    pub fn line_height(&self) -> f32 {
        self.font_size * self.line_height_ratio
    }
}

/// Text shaper using cosmic-text
pub struct TextShaper {
    /// Shared font system
    font_system: Arc<Mutex<FontSystem>>,
    config: FontSettings,
    cache: Mutex<HashMap<ShapingCacheKey, LaidOutLine<RasterGlyph>>>,
    cache_capacity: usize,
}

impl TextShaper {
    /// Create a new text shaper with default font settings
    pub fn new(font_system: Arc<Mutex<FontSystem>>) -> Self {
        Self::with_config(font_system, FontSettings::default())
    }

    /// Create a new text shaper with custom font settings
    pub fn with_config(font_system: Arc<Mutex<FontSystem>>, config: FontSettings) -> Self {
        if config.debug_logging {
            if let Some(ref family) = config.family {
                tracing::debug!("[TextShaper] Using font family: {}", family);
            } else {
                tracing::debug!("[TextShaper] Using fallback font: SansSerif");
            }
        }
        {
            let mut font_system = font_system.lock();
            for path in &config.font_files {
                load_font_file(&mut font_system, path, config.debug_logging);
            }
        }
        Self {
            font_system,
            config,
            cache: Mutex::new(HashMap::new()),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn font_system(&self) -> &Arc<Mutex<FontSystem>> {
        &self.font_system
    }

    pub fn cached_lines(&self) -> usize {
        self.cache.lock().len()
    }

    fn make_cache_key(text: &str, params: &ShapeParams, overrides: &[FontOverride]) -> ShapingCacheKey {
        ShapingCacheKey {
            text: text.to_string(),
            font_size_x100: (params.font_size * 100.0).round() as u32,
            max_width_rounded: params
                .max_width
                .map_or(0, |w| ((w / 10.0).round() * 10.0) as u32),
            overrides: overrides.to_vec(),
        }
    }

    fn default_attrs(&self) -> Attrs<'_> {
        let family = match &self.config.family {
            Some(name) => Family::Name(name),
            None => Family::SansSerif,
        };
        Attrs::new().family(family).weight(Weight(self.config.weight))
    }

    /// Lay out one lyric line
    ///
    /// Line breaks inside `text` are shaped as spaces so character indices
    /// stay aligned with the style ranges.
    pub fn shape(&self, text: &str, styles: &StyleMap, params: ShapeParams) -> LaidOutLine<RasterGlyph> {
        if text.is_empty() {
            return LaidOutLine::new(Vec::new(), Some(params.font_size));
        }

        let overrides = FontOverride::from_styles(styles);
        let cache_key = Self::make_cache_key(text, &params, &overrides);
        {
            let cache = self.cache.lock();
            if let Some(cached) = cache.get(&cache_key) {
                return cached.clone();
            }
        }

        let result = self.shape_uncached(text, &overrides, params);

        {
            let mut cache = self.cache.lock();
            if cache.len() >= self.cache_capacity {
                tracing::debug!("[TextShaper] Cache full ({} lines), clearing", cache.len());
                cache.clear();
            }
            cache.insert(cache_key, result.clone());
        }

        result
    }

    fn shape_uncached(
        &self,
        text: &str,
        overrides: &[FontOverride],
        params: ShapeParams,
    ) -> LaidOutLine<RasterGlyph> {
        let text: String = text
            .chars()
            .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
            .collect();
        let byte_to_char = byte_to_char_table(&text);

        let mut font_system = self.font_system.lock();
        let metrics = Metrics::new(params.font_size, params.line_height());
        let mut buffer = Buffer::new(&mut font_system, metrics);
        buffer.set_size(&mut font_system, params.max_width, None);

        let default_attrs = self.default_attrs();
        let spans = rich_text_spans(&text, overrides, &default_attrs);
        buffer.set_rich_text(
            &mut font_system,
            spans,
            &default_attrs,
            Shaping::Advanced,
            None,
        );
        buffer.shape_until_scroll(&mut font_system, false);

        let char_at = |byte: usize| byte_to_char[byte.min(byte_to_char.len() - 1)];
        let mut sub_lines = Vec::new();
        for run in buffer.layout_runs() {
            let char_offset = run.glyphs.iter().map(|g| char_at(g.start)).min().unwrap_or(0);
            let baseline = run.line_y.round() as i32;

            let glyphs = run
                .glyphs
                .iter()
                .map(|glyph| {
                    let physical = glyph.physical((0.0, 0.0), 1.0);
                    let start = char_at(glyph.start);
                    let end = char_at(glyph.end).max(start + 1);
                    LaidGlyph {
                        glyph: RasterGlyph {
                            cache_key: physical.cache_key,
                            x: physical.x,
                            y: baseline + physical.y,
                        },
                        chars: start - char_offset..end - char_offset,
                        bounds: Rect::new(glyph.x, run.line_top, glyph.w, run.line_height),
                    }
                })
                .collect();

            sub_lines.push(SubLine {
                bounds: Rect::new(0.0, run.line_top, run.line_w, run.line_height),
                runs: vec![GlyphRun {
                    char_offset,
                    glyphs,
                }],
            });
        }

        if self.config.debug_logging {
            tracing::debug!(
                "[TextShaper] Shaped {:?} into {} sub-lines",
                text,
                sub_lines.len()
            );
        }

        LaidOutLine::new(sub_lines, Some(params.font_size))
    }
}

/// Load a font file into the font database
pub fn load_font_file(font_system: &mut FontSystem, path: &Path, debug_logging: bool) -> bool {
    match std::fs::read(path) {
        Ok(data) => {
            font_system.db_mut().load_font_data(data);
            if debug_logging {
                tracing::debug!("[TextShaper] Loaded custom font: {}", path.display());
            }
            true
        }
        Err(e) => {
            tracing::warn!("[TextShaper] Failed to load font {}: {}", path.display(), e);
            false
        }
    }
}

/// Char index for every byte offset, plus one entry for the end of text
fn byte_to_char_table(text: &str) -> Vec<usize> {
    let mut table = Vec::with_capacity(text.len() + 1);
    for (index, c) in text.chars().enumerate() {
        table.extend(std::iter::repeat_n(index, c.len_utf8()));
    }
    table.push(text.chars().count());
    table
}

/// Split `text` into default and overridden spans
fn rich_text_spans<'t, 'a>(
    text: &'t str,
    overrides: &'a [FontOverride],
    default_attrs: &Attrs<'a>,
) -> Vec<(&'t str, Attrs<'a>)> {
    let char_count = text.chars().count();
    let byte_at = |char_index: usize| {
        text.char_indices()
            .nth(char_index)
            .map_or(text.len(), |(byte, _)| byte)
    };

    let mut spans = Vec::new();
    let mut cursor = 0;
    for o in overrides {
        let start = o.chars.start.min(char_count);
        let end = o.chars.end.min(char_count);
        if start >= end {
            continue;
        }
        if cursor < start {
            spans.push((&text[byte_at(cursor)..byte_at(start)], default_attrs.clone()));
        }
        spans.push((
            &text[byte_at(start)..byte_at(end)],
            default_attrs.clone().family(Family::Name(&o.family)),
        ));
        cursor = end;
    }
    if cursor < char_count {
        spans.push((&text[byte_at(cursor)..], default_attrs.clone()));
    }
    spans
}
