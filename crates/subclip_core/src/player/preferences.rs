//! Subtitle display preferences and their storage.
//!
//! Font size and vertical position are kept per [`DisplayMode`]; the text
//! color is stored once under `shared.color_hex` and applies to both modes.
//!
//! Keys are `"{mode}.{property}"`:
//!
//! | key                               | default (normal / fullscreen) |
//! |-----------------------------------|-------------------------------|
//! | `normal.font_size_px`             | 24                            |
//! | `normal.bottom_offset_percent`    | 10                            |
//! | `fullscreen.font_size_px`         | 36                            |
//! | `fullscreen.bottom_offset_percent`| 12                            |
//! | `shared.color_hex`                | `#FFFFFF`                     |

use std::collections::BTreeMap;
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Allowed subtitle font sizes in pixels.
pub const FONT_SIZE_RANGE: RangeInclusive<u32> = 12..=72;

/// Allowed distance from the bottom of the viewport, in percent.
pub const BOTTOM_OFFSET_RANGE: RangeInclusive<f64> = 0.0..=100.0;

pub const DEFAULT_COLOR_HEX: &str = "#FFFFFF";

/// Key of the color shared by all modes.
pub const COLOR_KEY: &str = "shared.color_hex";

const FONT_SIZE_PROPERTY: &str = "font_size_px";
const BOTTOM_OFFSET_PROPERTY: &str = "bottom_offset_percent";

/// Presentation context that scopes size and position preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Normal,
    Fullscreen,
}

impl DisplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Fullscreen => "fullscreen",
        }
    }

    /// Storage key for a mode-scoped property.
    pub fn key(&self, property: &str) -> String {
        format!("{}.{}", self.as_str(), property)
    }

    pub fn font_size_key(&self) -> String {
        self.key(FONT_SIZE_PROPERTY)
    }

    pub fn bottom_offset_key(&self) -> String {
        self.key(BOTTOM_OFFSET_PROPERTY)
    }

    /// Defaults used when the store has no value.
    pub fn default_preferences(&self) -> DisplayPreferences {
        let (font_size_px, bottom_offset_percent) = match self {
            Self::Normal => (24, 10.0),
            Self::Fullscreen => (36, 12.0),
        };
        DisplayPreferences {
            font_size_px,
            bottom_offset_percent,
            color_hex: DEFAULT_COLOR_HEX.to_string(),
        }
    }
}

impl std::fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "fullscreen" => Ok(Self::Fullscreen),
            other => Err(format!("unknown display mode '{other}'")),
        }
    }
}

/// Resolved display preferences for one mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayPreferences {
    pub font_size_px: u32,
    pub bottom_offset_percent: f64,
    pub color_hex: String,
}

/// Partial update. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreferencePatch {
    pub font_size_px: Option<u32>,
    pub bottom_offset_percent: Option<f64>,
    pub color_hex: Option<String>,
}

impl PreferencePatch {
    pub fn font_size(px: u32) -> Self {
        Self {
            font_size_px: Some(px),
            ..Default::default()
        }
    }

    pub fn bottom_offset(percent: f64) -> Self {
        Self {
            bottom_offset_percent: Some(percent),
            ..Default::default()
        }
    }

    pub fn color(hex: impl Into<String>) -> Self {
        Self {
            color_hex: Some(hex.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.font_size_px.is_none()
            && self.bottom_offset_percent.is_none()
            && self.color_hex.is_none()
    }
}

/// Clamp a font size into [`FONT_SIZE_RANGE`].
pub fn clamp_font_size(px: u32) -> u32 {
    px.clamp(*FONT_SIZE_RANGE.start(), *FONT_SIZE_RANGE.end())
}

/// Clamp a bottom offset into [`BOTTOM_OFFSET_RANGE`]. NaN maps to `fallback`.
pub fn clamp_bottom_offset(percent: f64, fallback: f64) -> f64 {
    if percent.is_nan() {
        return fallback;
    }
    percent.clamp(*BOTTOM_OFFSET_RANGE.start(), *BOTTOM_OFFSET_RANGE.end())
}

/// Normalize `#RGB` / `#RRGGBB` (hash optional) to uppercase `#RRGGBB`.
pub fn normalize_color(input: &str) -> Option<String> {
    let hex = input.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let full: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };
    Some(format!("#{}", full.to_ascii_uppercase()))
}

/// Errors from preference persistence.
#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("Failed to write preferences to '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize preferences: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Store refused the write (read-only or quota).
    #[error("Preference store unavailable: {0}")]
    Unavailable(String),
}

/// Key-value storage for display preferences.
///
/// Assumed synchronous and local. Values are JSON so stores can keep
/// numbers and strings without a schema.
pub trait PreferenceStore: Send {
    fn get(&self, key: &str) -> Option<Value>;

    fn set(&mut self, key: &str, value: Value) -> Result<(), PreferenceError>;

    /// Numeric value for `key`, or `default` if missing or not a number.
    fn get_f64(&self, key: &str, default: f64) -> f64 {
        self.get(key).and_then(|v| v.as_f64()).unwrap_or(default)
    }

    /// String value for `key`, or `default` if missing or not a string.
    fn get_string(&self, key: &str, default: &str) -> String {
        self.get(key)
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| default.to_string())
    }
}

/// Volatile store (tests, and sessions without a writable location).
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    values: BTreeMap<String, Value>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), PreferenceError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Store backed by a flat JSON object on disk.
///
/// Every `set` rewrites the file atomically (temp file, then rename).
#[derive(Debug, Clone)]
pub struct JsonPreferenceStore {
    path: PathBuf,
    values: BTreeMap<String, Value>,
}

impl JsonPreferenceStore {
    /// Open the store, loading existing values.
    ///
    /// Missing or unreadable files start empty; nothing is written until
    /// the first `set`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let values = if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => match serde_json::from_str::<BTreeMap<String, Value>>(&content) {
                    Ok(values) => {
                        tracing::debug!("Loaded {} preferences from {}", values.len(), path.display());
                        values
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse {}: {}", path.display(), e);
                        BTreeMap::new()
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored entries, sorted by key.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn save(&self) -> Result<(), PreferenceError> {
        let write_err = |source| PreferenceError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let json = serde_json::to_string_pretty(&self.values)?;

        let temp_file = self.path.with_extension("json.tmp");
        fs::write(&temp_file, json).map_err(write_err)?;
        fs::rename(&temp_file, &self.path).map_err(write_err)?;

        Ok(())
    }
}

impl PreferenceStore for JsonPreferenceStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), PreferenceError> {
        if self.values.get(key) == Some(&value) {
            return Ok(());
        }
        self.values.insert(key.to_string(), value);
        self.save()
    }
}

/// Read the preferences for `mode` from a store, applying defaults and clamps.
pub fn load_preferences(store: &dyn PreferenceStore, mode: DisplayMode) -> DisplayPreferences {
    let defaults = mode.default_preferences();

    let font = store.get_f64(&mode.font_size_key(), f64::from(defaults.font_size_px));
    let font_size_px = if font.is_finite() {
        clamp_font_size(font.round().clamp(0.0, f64::from(u32::MAX)) as u32)
    } else {
        defaults.font_size_px
    };

    let bottom_offset_percent = clamp_bottom_offset(
        store.get_f64(&mode.bottom_offset_key(), defaults.bottom_offset_percent),
        defaults.bottom_offset_percent,
    );

    let color_hex = normalize_color(&store.get_string(COLOR_KEY, &defaults.color_hex))
        .unwrap_or(defaults.color_hex);

    DisplayPreferences {
        font_size_px,
        bottom_offset_percent,
        color_hex,
    }
}
