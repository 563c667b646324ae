//! Subtitle synchronizer: active cue lookup plus display preferences.
//!
//! Wraps a [`CueResolver`] and owns the preferences for the current
//! [`DisplayMode`]. Preference changes are written through to the
//! [`PreferenceStore`] immediately; write failures are logged and
//! otherwise ignored, so the in-memory value still applies for the
//! rest of the session.

use serde_json::json;

use super::preferences::{
    clamp_bottom_offset, clamp_font_size, load_preferences, normalize_color, DisplayMode,
    DisplayPreferences, PreferencePatch, PreferenceStore, COLOR_KEY,
};
use crate::subtitles::{Cue, CueResolver, SubtitleTrack};

pub struct SubtitleSynchronizer {
    resolver: CueResolver,
    store: Box<dyn PreferenceStore>,
    mode: DisplayMode,
    /// Preferences for `mode`, loaded on construction and mode change.
    current: DisplayPreferences,
}

impl SubtitleSynchronizer {
    /// Create a synchronizer in normal mode with an empty track.
    pub fn new(store: Box<dyn PreferenceStore>) -> Self {
        let mode = DisplayMode::Normal;
        let current = load_preferences(store.as_ref(), mode);
        Self {
            resolver: CueResolver::new(),
            store,
            mode,
            current,
        }
    }

    /// Replace the active track. An empty track is valid.
    pub fn set_track(&mut self, track: SubtitleTrack) {
        tracing::debug!("[Sync] Track set: {} cues", track.len());
        self.resolver.set_track(track);
    }

    pub fn track(&self) -> &SubtitleTrack {
        self.resolver.track()
    }

    /// Set the sync offset in seconds. Not clamped here.
    pub fn set_offset(&mut self, offset_secs: f64) {
        self.resolver.set_offset(offset_secs);
    }

    pub fn offset(&self) -> f64 {
        self.resolver.offset()
    }

    /// The cue visible at raw playback time `raw_secs`.
    pub fn evaluate(&self, raw_secs: f64) -> Option<&Cue> {
        self.resolver.evaluate(raw_secs)
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Preferences for the current mode.
    pub fn preferences(&self) -> &DisplayPreferences {
        &self.current
    }

    /// Preferences for any mode. Other modes are read from the store.
    pub fn preferences_for(&self, mode: DisplayMode) -> DisplayPreferences {
        if mode == self.mode {
            self.current.clone()
        } else {
            load_preferences(self.store.as_ref(), mode)
        }
    }

    /// Apply a patch to `mode` and write it through to the store.
    ///
    /// Values are clamped; an invalid color is ignored. Returns the
    /// resulting preferences for `mode`.
    pub fn set_preferences(&mut self, mode: DisplayMode, patch: PreferencePatch) -> DisplayPreferences {
        let mut prefs = self.preferences_for(mode);

        if let Some(px) = patch.font_size_px {
            prefs.font_size_px = clamp_font_size(px);
            self.persist(&mode.font_size_key(), json!(prefs.font_size_px));
        }

        if let Some(percent) = patch.bottom_offset_percent {
            prefs.bottom_offset_percent = clamp_bottom_offset(percent, prefs.bottom_offset_percent);
            self.persist(&mode.bottom_offset_key(), json!(prefs.bottom_offset_percent));
        }

        if let Some(color) = patch.color_hex.as_deref() {
            match normalize_color(color) {
                Some(hex) => {
                    self.persist(COLOR_KEY, json!(hex));
                    // Shared across modes
                    self.current.color_hex = hex.clone();
                    prefs.color_hex = hex;
                }
                None => tracing::warn!("[Sync] Ignoring invalid color '{}'", color),
            }
        }

        if mode == self.mode {
            self.current = prefs.clone();
        }
        prefs
    }

    /// Switch display mode, reloading that mode's stored values.
    ///
    /// In-memory values of the previous mode are not carried over.
    pub fn on_mode_change(&mut self, mode: DisplayMode) {
        if mode == self.mode {
            return;
        }
        tracing::debug!("[Sync] Mode change: {} -> {}", self.mode, mode);
        self.mode = mode;
        self.current = load_preferences(self.store.as_ref(), mode);
    }

    fn persist(&mut self, key: &str, value: serde_json::Value) {
        if let Err(e) = self.store.set(key, value) {
            tracing::warn!("[Sync] Failed to persist '{}': {}", key, e);
        }
    }
}

impl std::fmt::Debug for SubtitleSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubtitleSynchronizer")
            .field("cues", &self.resolver.track().len())
            .field("offset", &self.resolver.offset())
            .field("mode", &self.mode)
            .field("current", &self.current)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::init_test_tracing;
    use crate::player::preferences::{MemoryPreferenceStore, PreferenceError};
    use serde_json::Value;
    use std::sync::{Arc, Mutex};

    /// Memory store whose contents stay visible to the test after boxing.
    #[derive(Clone, Default)]
    struct SharedStore(Arc<Mutex<MemoryPreferenceStore>>);

    impl PreferenceStore for SharedStore {
        fn get(&self, key: &str) -> Option<Value> {
            self.0.lock().unwrap().get(key)
        }

        fn set(&mut self, key: &str, value: Value) -> Result<(), PreferenceError> {
            self.0.lock().unwrap().set(key, value)
        }
    }

    struct FailingStore;

    impl PreferenceStore for FailingStore {
        fn get(&self, _key: &str) -> Option<Value> {
            None
        }

        fn set(&mut self, _key: &str, _value: Value) -> Result<(), PreferenceError> {
            Err(PreferenceError::Unavailable("quota exceeded".to_string()))
        }
    }

    fn synchronizer() -> (SubtitleSynchronizer, SharedStore) {
        let store = SharedStore::default();
        (SubtitleSynchronizer::new(Box::new(store.clone())), store)
    }

    #[test]
    fn scenario_mode_change_reloads_stored_values() {
        let (mut sync, _) = synchronizer();
        sync.set_preferences(DisplayMode::Normal, PreferencePatch::font_size(40));
        assert_eq!(sync.preferences().font_size_px, 40);

        sync.on_mode_change(DisplayMode::Fullscreen);
        assert_eq!(sync.preferences().font_size_px, 36);

        sync.on_mode_change(DisplayMode::Normal);
        assert_eq!(sync.preferences().font_size_px, 40);
    }

    #[test]
    fn mode_isolation_both_directions() {
        let (mut sync, store) = synchronizer();

        sync.set_preferences(DisplayMode::Fullscreen, PreferencePatch::font_size(50));
        assert_eq!(store.get_f64("normal.font_size_px", -1.0), -1.0);
        assert_eq!(sync.preferences().font_size_px, 24);

        sync.set_preferences(DisplayMode::Normal, PreferencePatch::font_size(18));
        assert_eq!(store.get_f64("fullscreen.font_size_px", -1.0), 50.0);
        assert_eq!(sync.preferences_for(DisplayMode::Fullscreen).font_size_px, 50);
    }

    #[test]
    fn color_is_shared_across_modes() {
        let (mut sync, store) = synchronizer();
        sync.set_preferences(DisplayMode::Fullscreen, PreferencePatch::color("#ff0"));

        // Current (normal) mode sees it without a reload
        assert_eq!(sync.preferences().color_hex, "#FFFF00");
        assert_eq!(store.get_string(COLOR_KEY, ""), "#FFFF00");

        sync.on_mode_change(DisplayMode::Fullscreen);
        assert_eq!(sync.preferences().color_hex, "#FFFF00");
    }

    #[test]
    fn patches_are_clamped_before_storing() {
        let (mut sync, store) = synchronizer();
        let prefs = sync.set_preferences(
            DisplayMode::Normal,
            PreferencePatch {
                font_size_px: Some(4),
                bottom_offset_percent: Some(140.0),
                color_hex: Some("nope".to_string()),
            },
        );
        assert_eq!(prefs.font_size_px, 12);
        assert_eq!(prefs.bottom_offset_percent, 100.0);
        assert_eq!(prefs.color_hex, "#FFFFFF");
        assert_eq!(store.get_f64("normal.font_size_px", 0.0), 12.0);
        assert!(store.get(COLOR_KEY).is_none());
    }

    #[test]
    fn store_failures_are_swallowed() {
        init_test_tracing();
        let mut sync = SubtitleSynchronizer::new(Box::new(FailingStore));

        let prefs = sync.set_preferences(DisplayMode::Normal, PreferencePatch::font_size(40));
        assert_eq!(prefs.font_size_px, 40);
        assert_eq!(sync.preferences().font_size_px, 40);

        // Nothing reached the store, so a round trip through another mode resets
        sync.on_mode_change(DisplayMode::Fullscreen);
        sync.on_mode_change(DisplayMode::Normal);
        assert_eq!(sync.preferences().font_size_px, 24);
    }

    #[test]
    fn existing_store_values_load_on_construction() {
        let store = SharedStore::default();
        store.0.lock().unwrap().set("normal.bottom_offset_percent", serde_json::json!(33.5)).unwrap();

        let sync = SubtitleSynchronizer::new(Box::new(store));
        assert_eq!(sync.preferences().bottom_offset_percent, 33.5);
    }

    #[test]
    fn evaluation_delegates_to_track_and_offset() {
        let (mut sync, _) = synchronizer();
        sync.set_track(SubtitleTrack::from_cues(vec![
            Cue::with_id("1", 10_000, 12_000, "Hello"),
            Cue::with_id("2", 12_000, 14_000, "World"),
        ]));
        assert_eq!(sync.evaluate(12.0).map(|c| c.text.as_str()), Some("Hello"));

        sync.set_offset(-2.0);
        assert_eq!(sync.evaluate(13.0).map(|c| c.text.as_str()), Some("Hello"));
        assert_eq!(sync.offset(), -2.0);

        // Preferences have no effect on lookup
        sync.on_mode_change(DisplayMode::Fullscreen);
        assert_eq!(sync.evaluate(13.0).map(|c| c.text.as_str()), Some("Hello"));
    }
}
