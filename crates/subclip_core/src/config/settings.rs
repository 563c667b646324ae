//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use serde::{Deserialize, Serialize};

use crate::logging::LogLevel;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Playback and shortcut tuning.
    #[serde(default)]
    pub player: PlayerSettings,

    /// Display preference persistence.
    #[serde(default)]
    pub preferences: PreferenceSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Subtitle import limits.
    #[serde(default)]
    pub import: ImportSettings,

    /// Managed backend connection.
    #[serde(default)]
    pub backend: BackendSettings,
}

/// Player polling and keyboard step sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSettings {
    /// Interval between playback clock samples.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Offset change per `[` / `]` press, in seconds.
    #[serde(default = "default_offset_step_secs")]
    pub offset_step_secs: f64,

    /// Interactive offset adjustment is clamped to +/- this value.
    #[serde(default = "default_offset_limit_secs")]
    pub offset_limit_secs: f64,

    /// Seek distance for arrow keys, in seconds.
    #[serde(default = "default_seek_step_secs")]
    pub seek_step_secs: f64,

    /// Volume change per up/down press (0.0 - 1.0 scale).
    #[serde(default = "default_volume_step")]
    pub volume_step: f64,
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_offset_step_secs() -> f64 {
    0.1
}

fn default_offset_limit_secs() -> f64 {
    10.0
}

fn default_seek_step_secs() -> f64 {
    5.0
}

fn default_volume_step() -> f64 {
    0.1
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            offset_step_secs: default_offset_step_secs(),
            offset_limit_secs: default_offset_limit_secs(),
            seek_step_secs: default_seek_step_secs(),
            volume_step: default_volume_step(),
        }
    }
}

/// Where display preferences are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceSettings {
    /// JSON preference file. Relative paths resolve against the config directory.
    #[serde(default = "default_store_path")]
    pub store_path: String,
}

fn default_store_path() -> String {
    "preferences.json".to_string()
}

impl Default for PreferenceSettings {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default level when RUST_LOG is unset.
    #[serde(default)]
    pub level: LogLevel,

    /// Also write logs to daily files in `logs_folder`.
    #[serde(default)]
    pub file_logging: bool,

    /// Folder for log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            file_logging: false,
            logs_folder: default_logs_folder(),
        }
    }
}

/// Subtitle import limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSettings {
    /// Files larger than this are rejected before decoding.
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
}

fn default_max_file_bytes() -> u64 {
    2 * 1024 * 1024
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_file_bytes(),
        }
    }
}

/// Managed backend connection. Empty URL runs against the in-memory demo catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendSettings {
    #[serde(default)]
    pub url: String,

    /// Public (anonymous) API key.
    #[serde(default)]
    pub anon_key: String,
}

impl BackendSettings {
    /// Whether no backend is configured.
    pub fn is_demo_mode(&self) -> bool {
        self.url.trim().is_empty() || self.anon_key.trim().is_empty()
    }
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Player,
    Preferences,
    Logging,
    Import,
    Backend,
}

impl ConfigSection {
    /// All sections, in file order.
    pub const ALL: [ConfigSection; 5] = [
        ConfigSection::Player,
        ConfigSection::Preferences,
        ConfigSection::Logging,
        ConfigSection::Import,
        ConfigSection::Backend,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Player => "player",
            ConfigSection::Preferences => "preferences",
            ConfigSection::Logging => "logging",
            ConfigSection::Import => "import",
            ConfigSection::Backend => "backend",
        }
    }

    /// Comment written above the section header.
    pub fn description(&self) -> &'static str {
        match self {
            ConfigSection::Player => "Playback polling and keyboard step sizes",
            ConfigSection::Preferences => "Subtitle display preference storage",
            ConfigSection::Logging => "Logging configuration",
            ConfigSection::Import => "Subtitle import limits",
            ConfigSection::Backend => "Managed backend (leave empty for demo mode)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_serializes() {
        let settings = Settings::default();
        let toml = toml::to_string_pretty(&settings).unwrap();
        assert!(toml.contains("[player]"));
        assert!(toml.contains("[logging]"));
        assert!(toml.contains("poll_interval_ms = 100"));
        assert!(toml.contains("level = \"info\""));
    }

    #[test]
    fn settings_round_trip() {
        let settings = Settings::default();
        let toml = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.player, settings.player);
        assert_eq!(parsed.logging, settings.logging);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let minimal = "[player]\npoll_interval_ms = 250";
        let parsed: Settings = toml::from_str(minimal).unwrap();
        // Custom value preserved
        assert_eq!(parsed.player.poll_interval_ms, 250);
        // Defaults applied for missing
        assert_eq!(parsed.player.offset_limit_secs, 10.0);
        assert_eq!(parsed.preferences.store_path, "preferences.json");
        assert!(parsed.backend.is_demo_mode());
    }

    #[test]
    fn backend_needs_url_and_key() {
        let mut backend = BackendSettings {
            url: "https://example.supabase.co".to_string(),
            anon_key: String::new(),
        };
        assert!(backend.is_demo_mode());
        backend.anon_key = "public-key".to_string();
        assert!(!backend.is_demo_mode());
    }
}
