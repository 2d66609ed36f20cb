//! Style data carried by lyric lines
//!
//! Every value is immutable input handed over by the lyric-data collaborator.
//! Offsets, blur radii and widths use a normalized unit where `30` equals
//! one unit of the effective font size (see [`EffectScale`]).
//!
//! [`EffectScale`]: crate::render::EffectScale

use serde::{Deserialize, Serialize};

use super::color::Rgba;
use super::range::ClosedIndexRange;
use crate::geometry::Point;

/// Visual override for a range of characters
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    /// Fill color; the canvas foreground is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgba>,
    /// Substituted font family name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_override: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Shadow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Stroke>,
    /// Decorative strokes clipped to this range's glyphs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mask_lines: Vec<MaskLine>,
}

impl Style {
    /// Style that only changes the fill color
    pub fn colored(color: Rgba) -> Self {
        Self {
            color: Some(color),
            ..Default::default()
        }
    }

    pub fn with_shadow(mut self, shadow: Shadow) -> Self {
        self.shadow = Some(shadow);
        self
    }

    pub fn with_stroke(mut self, stroke: Stroke) -> Self {
        self.stroke = Some(stroke);
        self
    }

    pub fn with_font(mut self, family: impl Into<String>) -> Self {
        self.font_override = Some(family.into());
        self
    }

    pub fn with_mask_line(mut self, line: MaskLine) -> Self {
        self.mask_lines.push(line);
        self
    }
}

/// Drop shadow
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub blur: f32,
    pub color: Rgba,
}

/// Pseudo-outline drawn as four diagonally offset copies of the glyph
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub width: f32,
    /// Blur applied to each offset copy
    #[serde(default)]
    pub radius: f32,
    pub color: Rgba,
}

/// Straight decorative line in line-box fractions (`[0, 1]` on both axes)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaskLine {
    pub start: Point,
    pub end: Point,
    pub width: f32,
    pub color: Rgba,
}

/// One explicit (or synthesized) range → style binding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleSpan {
    pub range: ClosedIndexRange,
    pub style: Style,
}

impl StyleSpan {
    pub fn new(range: ClosedIndexRange, style: Style) -> Self {
        Self { range, style }
    }
}

/// A lyric line with its explicit style overrides
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricLine {
    pub original: String,
    /// Expected to be pairwise disjoint and within the line
    #[serde(default)]
    pub partial_style: Vec<StyleSpan>,
}

impl LyricLine {
    pub fn new(original: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            partial_style: Vec::new(),
        }
    }

    /// Add an override for the inclusive range `[lower, upper]`
    ///
    /// Inverted bounds are ignored.
    pub fn styled(mut self, lower: usize, upper: usize, style: Style) -> Self {
        if let Some(range) = ClosedIndexRange::new(lower, upper) {
            self.partial_style.push(StyleSpan::new(range, style));
        }
        self
    }

    /// Line length in characters
    pub fn char_len(&self) -> usize {
        self.original.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_line() {
        let json = r##"{
            "original": "Hello world",
            "partialStyle": [
                {
                    "range": [6, 10],
                    "style": {
                        "color": "#FF0000",
                        "fontOverride": "Noto Serif",
                        "shadow": { "x": 2, "y": 3, "blur": 4, "color": "#00000080" },
                        "stroke": { "width": 1.5, "color": "#FFFFFF" },
                        "maskLines": [
                            { "start": { "x": 0, "y": 0.5 }, "end": { "x": 1, "y": 0.5 },
                              "width": 2, "color": "#0000FF" }
                        ]
                    }
                }
            ]
        }"##;

        let line: LyricLine = serde_json::from_str(json).unwrap();
        assert_eq!(line.original, "Hello world");
        assert_eq!(line.partial_style.len(), 1);

        let span = &line.partial_style[0];
        assert_eq!(span.range, ClosedIndexRange::new(6, 10).unwrap());
        assert_eq!(span.style.color, Some(Rgba::rgb(255, 0, 0)));
        assert_eq!(span.style.font_override.as_deref(), Some("Noto Serif"));

        let shadow = span.style.shadow.unwrap();
        assert_eq!((shadow.x, shadow.y, shadow.blur), (2.0, 3.0, 4.0));
        assert_eq!(shadow.color.a, 0x80);

        let stroke = span.style.stroke.unwrap();
        assert_eq!(stroke.radius, 0.0, "radius defaults to zero");
        assert_eq!(span.style.mask_lines.len(), 1);
    }

    #[test]
    fn test_deserialize_minimal_style() {
        let style: Style = serde_json::from_str("{}").unwrap();
        assert_eq!(style, Style::default());
        assert!(style.shadow.is_none() && style.stroke.is_none());
    }

    #[test]
    fn test_serialize_skips_absent_fields() {
        let json = serde_json::to_string(&Style::colored(Rgba::rgb(1, 2, 3))).unwrap();
        assert_eq!(json, r##"{"color":"#010203"}"##);
    }

    #[test]
    fn test_line_builder_ignores_inverted_range() {
        let line = LyricLine::new("abc")
            .styled(0, 1, Style::default())
            .styled(2, 1, Style::default());
        assert_eq!(line.partial_style.len(), 1);
        assert_eq!(line.char_len(), 3);
    }

    #[test]
    fn test_char_len_counts_scalars() {
        assert_eq!(LyricLine::new("你好!").char_len(), 3);
    }
}
