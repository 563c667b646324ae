//! Configuration management for subclip.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//! - Validation on load with automatic defaults
//!
//! # Example
//!
//! ```no_run
//! use subclip_core::config::{ConfigManager, ConfigSection};
//!
//! let mut config = ConfigManager::new(".config/subclip.toml");
//! config.load_or_create().unwrap();
//!
//! println!("Poll interval: {}ms", config.settings().player.poll_interval_ms);
//!
//! config.settings_mut().player.seek_step_secs = 10.0;
//! config.update_section(ConfigSection::Player).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    BackendSettings, ConfigSection, ImportSettings, LoggingSettings, PlayerSettings,
    PreferenceSettings, Settings,
};
