//! Renderer settings persistence
//!
//! Handles saving and loading rendering preferences as JSON.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::render::FALLBACK_FONT_SIZE;
use crate::style::Rgba;

/// What to do when a line's style ranges overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Log a warning and render with first-match classification
    #[default]
    Warn,
    /// Refuse to render the line
    Reject,
}

impl std::fmt::Display for OverlapPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverlapPolicy::Warn => write!(f, "warn"),
            OverlapPolicy::Reject => write!(f, "reject"),
        }
    }
}

/// Renderer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Font selection and loading
    #[serde(default)]
    pub font: FontSettings,
    /// Font size used to scale effects when a line has none (default: 14)
    #[serde(default = "default_fallback_font_size")]
    pub fallback_font_size: f32,
    /// Wrap width in logical pixels, unbounded when absent
    #[serde(default)]
    pub max_width: Option<f32>,
    /// Line height as a multiple of the font size
    #[serde(default = "default_line_height_ratio")]
    pub line_height_ratio: f32,
    /// Fill color of unstyled text
    #[serde(default = "default_foreground")]
    pub foreground: Rgba,
    /// Transparent margin around the rendered line, room for shadows and strokes
    #[serde(default = "default_padding")]
    pub padding: u32,
    #[serde(default)]
    pub overlap_policy: OverlapPolicy,
    /// Resolved style maps kept in memory
    #[serde(default = "default_resolve_cache_capacity")]
    pub resolve_cache_capacity: usize,
    /// Shaped lines kept in memory
    #[serde(default = "default_shape_cache_capacity")]
    pub shape_cache_capacity: usize,
}

/// Font-related settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSettings {
    /// Font family name, system sans-serif when absent
    #[serde(default)]
    pub family: Option<String>,
    /// CSS-style weight (400 = regular, 700 = bold)
    #[serde(default = "default_weight")]
    pub weight: u16,
    /// Extra font files loaded into the font database
    #[serde(default)]
    pub font_files: Vec<PathBuf>,
    /// Enable debug logging for font loading and shaping
    #[serde(default)]
    pub debug_logging: bool,
}

fn default_fallback_font_size() -> f32 {
    FALLBACK_FONT_SIZE
}

fn default_line_height_ratio() -> f32 {
    1.4
}

fn default_foreground() -> Rgba {
    Rgba::WHITE
}

fn default_padding() -> u32 {
    16
}

fn default_resolve_cache_capacity() -> usize {
    256
}

fn default_shape_cache_capacity() -> usize {
    1000
}

fn default_weight() -> u16 {
    400
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            font: FontSettings::default(),
            fallback_font_size: default_fallback_font_size(),
            max_width: None,
            line_height_ratio: default_line_height_ratio(),
            foreground: default_foreground(),
            padding: default_padding(),
            overlap_policy: OverlapPolicy::default(),
            resolve_cache_capacity: default_resolve_cache_capacity(),
            shape_cache_capacity: default_shape_cache_capacity(),
        }
    }
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            family: None,
            weight: default_weight(),
            font_files: Vec::new(),
            debug_logging: false,
        }
    }
}

impl FontSettings {
    /// Settings for a specific font family
    pub fn with_family(family: impl Into<String>) -> Self {
        Self {
            family: Some(family.into()),
            ..Default::default()
        }
    }
}

impl RenderSettings {
    /// Get the settings file path
    pub fn file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "lyric-styler", "LyricStyler")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from file, or return defaults if not found
    pub fn load() -> Self {
        Self::file_path()
            .and_then(|path| Self::load_from_file(&path).ok())
            .unwrap_or_default()
    }

    /// Load settings from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self, SettingsError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| SettingsError::Io(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| SettingsError::Parse(e.to_string()))
    }

    /// Save settings to the default file
    pub fn save(&self) -> Result<(), SettingsError> {
        if let Some(path) = Self::file_path() {
            self.save_to_file(&path)
        } else {
            Err(SettingsError::Io(
                "Could not determine config directory".to_string(),
            ))
        }
    }

    /// Save settings to a specific file
    pub fn save_to_file(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SettingsError::Io(e.to_string()))?;
        }

        let content =
            serde_json::to_string_pretty(self).map_err(|e| SettingsError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| SettingsError::Io(e.to_string()))?;
        Ok(())
    }
}

/// Errors that can occur with settings
#[derive(Debug, Clone)]
pub enum SettingsError {
    Io(String),
    Parse(String),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "IO error: {}", e),
            SettingsError::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for SettingsError {}
