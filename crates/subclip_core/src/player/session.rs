//! Playback session: one controller, one synchronizer, one frame per tick.

use serde::Serialize;

use super::controller::{PlaybackClock, PlaybackController, PlayerError};
use super::preferences::{DisplayMode, DisplayPreferences, PreferencePatch};
use super::synchronizer::SubtitleSynchronizer;
use crate::config::PlayerSettings;
use crate::subtitles::SubtitleTrack;

/// Everything a renderer needs for one overlay update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayFrame {
    /// `None` while the player is loading.
    pub clock: Option<PlaybackClock>,
    pub cue_id: Option<String>,
    pub cue_text: Option<String>,
    pub preferences: DisplayPreferences,
    pub offset_secs: f64,
    pub mode: DisplayMode,
}

/// User intents, from shortcuts or on-screen controls.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    TogglePlay,
    Play,
    Pause,
    /// Absolute seek in seconds, clamped to the media.
    Seek(f64),
    /// Relative seek in seconds.
    SeekBy(f64),
    ToggleMute,
    /// Relative volume change, result clamped to 0.0..=1.0.
    VolumeBy(f64),
    ToggleFullscreen,
    ExitFullscreen,
    /// Relative offset change, result clamped to the configured limit.
    OffsetBy(f64),
    SetOffset(f64),
    ResetOffset,
    /// Patch the current mode's display preferences.
    SetPreferences(PreferencePatch),
    SetTrack(SubtitleTrack),
}

/// Step sizes and limits for interactive commands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionOptions {
    pub offset_step_secs: f64,
    pub offset_limit_secs: f64,
    pub seek_step_secs: f64,
    pub volume_step: f64,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from(&PlayerSettings::default())
    }
}

impl From<&PlayerSettings> for SessionOptions {
    fn from(settings: &PlayerSettings) -> Self {
        Self {
            offset_step_secs: settings.offset_step_secs,
            offset_limit_secs: settings.offset_limit_secs.abs(),
            seek_step_secs: settings.seek_step_secs,
            volume_step: settings.volume_step,
        }
    }
}

/// Drives a [`PlaybackController`] and resolves the overlay for it.
pub struct PlaybackSession<C> {
    controller: C,
    sync: SubtitleSynchronizer,
    options: SessionOptions,
}

impl<C: PlaybackController> PlaybackSession<C> {
    pub fn new(controller: C, sync: SubtitleSynchronizer, options: SessionOptions) -> Self {
        Self {
            controller,
            sync,
            options,
        }
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.controller
    }

    pub fn synchronizer(&self) -> &SubtitleSynchronizer {
        &self.sync
    }

    pub fn synchronizer_mut(&mut self) -> &mut SubtitleSynchronizer {
        &mut self.sync
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Sample the controller and resolve the current overlay.
    ///
    /// Also follows fullscreen changes made outside the session (for
    /// example the widget's own exit button).
    pub fn tick(&mut self) -> OverlayFrame {
        if self.controller.is_ready() {
            let mode = if self.controller.is_fullscreen() {
                DisplayMode::Fullscreen
            } else {
                DisplayMode::Normal
            };
            self.sync.on_mode_change(mode);
        }

        let clock = PlaybackClock::sample(&self.controller);
        let cue = clock.and_then(|c| self.sync.evaluate(c.current_time));

        OverlayFrame {
            clock,
            cue_id: cue.map(|c| c.id.clone()),
            cue_text: cue.map(|c| c.text.clone()),
            preferences: self.sync.preferences().clone(),
            offset_secs: self.sync.offset(),
            mode: self.sync.mode(),
        }
    }

    /// Execute one command.
    pub fn apply(&mut self, command: PlayerCommand) -> Result<(), PlayerError> {
        tracing::trace!("[Session] {:?}", command);

        match command {
            PlayerCommand::TogglePlay => {
                if self.controller.is_playing() {
                    self.controller.pause()
                } else {
                    self.controller.play()
                }
            }
            PlayerCommand::Play => self.controller.play(),
            PlayerCommand::Pause => self.controller.pause(),
            PlayerCommand::Seek(target) => self.seek_clamped(target),
            PlayerCommand::SeekBy(delta) => {
                let target = self.controller.current_time() + delta;
                self.seek_clamped(target)
            }
            PlayerCommand::ToggleMute => {
                let muted = self.controller.is_muted();
                self.controller.set_muted(!muted)
            }
            PlayerCommand::VolumeBy(delta) => {
                let volume = (self.controller.volume() + delta).clamp(0.0, 1.0);
                self.controller.set_volume(volume)
            }
            PlayerCommand::ToggleFullscreen => {
                if self.controller.is_fullscreen() {
                    self.exit_fullscreen()
                } else {
                    self.controller.request_fullscreen()?;
                    self.sync.on_mode_change(DisplayMode::Fullscreen);
                    Ok(())
                }
            }
            PlayerCommand::ExitFullscreen => self.exit_fullscreen(),
            PlayerCommand::OffsetBy(delta) => {
                self.set_offset_clamped(self.sync.offset() + delta);
                Ok(())
            }
            PlayerCommand::SetOffset(offset) => {
                self.set_offset_clamped(offset);
                Ok(())
            }
            PlayerCommand::ResetOffset => {
                self.sync.set_offset(0.0);
                Ok(())
            }
            PlayerCommand::SetPreferences(patch) => {
                let mode = self.sync.mode();
                self.sync.set_preferences(mode, patch);
                Ok(())
            }
            PlayerCommand::SetTrack(track) => {
                self.sync.set_track(track);
                Ok(())
            }
        }
    }

    fn seek_clamped(&mut self, target: f64) -> Result<(), PlayerError> {
        if !target.is_finite() {
            return Err(PlayerError::InvalidSeek(target));
        }
        let duration = self.controller.duration();
        let target = if duration > 0.0 {
            target.clamp(0.0, duration)
        } else {
            target.max(0.0)
        };
        self.controller.seek(target)
    }

    fn exit_fullscreen(&mut self) -> Result<(), PlayerError> {
        self.controller.exit_fullscreen()?;
        self.sync.on_mode_change(DisplayMode::Normal);
        Ok(())
    }

    /// Clamp to the configured limit and round to whole milliseconds.
    fn set_offset_clamped(&mut self, offset: f64) {
        if !offset.is_finite() {
            return;
        }
        let limit = self.options.offset_limit_secs;
        let offset = (offset.clamp(-limit, limit) * 1000.0).round() / 1000.0;
        self.sync.set_offset(offset);
    }
}

/// Format an offset for display, e.g. `+0.5s`, `-1.25s`, `0.0s`.
pub fn format_offset(offset_secs: f64) -> String {
    let rounded = (offset_secs * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        "0.0s".to_string()
    } else if rounded.fract() == 0.0 {
        format!("{:+.1}s", rounded)
    } else {
        let text = format!("{:+.3}", rounded);
        format!("{}s", text.trim_end_matches('0'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::preferences::MemoryPreferenceStore;
    use crate::player::SimulatedPlayer;
    use crate::subtitles::Cue;
    use std::time::Duration;

    fn session(player: SimulatedPlayer) -> PlaybackSession<SimulatedPlayer> {
        let mut sync = SubtitleSynchronizer::new(Box::new(MemoryPreferenceStore::new()));
        sync.set_track(SubtitleTrack::from_cues(vec![
            Cue::with_id("1", 10_000, 12_000, "Hello"),
            Cue::with_id("2", 12_000, 14_000, "World"),
        ]));
        PlaybackSession::new(player, sync, SessionOptions::default())
    }

    #[test]
    fn loading_player_yields_empty_frame() {
        let mut session = session(SimulatedPlayer::loading(30.0));
        let frame = session.tick();
        assert!(frame.clock.is_none());
        assert!(frame.cue_text.is_none());
        assert_eq!(frame.mode, DisplayMode::Normal);
    }

    #[test]
    fn frame_carries_active_cue() {
        let mut session = session(SimulatedPlayer::new(30.0));
        session.apply(PlayerCommand::Seek(12.0)).unwrap();
        let frame = session.tick();
        assert_eq!(frame.cue_id.as_deref(), Some("1"));
        assert_eq!(frame.cue_text.as_deref(), Some("Hello"));
        assert_eq!(frame.preferences.font_size_px, 24);
    }

    #[test]
    fn seeks_are_clamped_to_media() {
        let mut session = session(SimulatedPlayer::new(30.0));
        session.apply(PlayerCommand::Seek(99.0)).unwrap();
        assert_eq!(session.controller().current_time(), 30.0);
        session.apply(PlayerCommand::SeekBy(-45.0)).unwrap();
        assert_eq!(session.controller().current_time(), 0.0);
        assert!(session.apply(PlayerCommand::Seek(f64::NAN)).is_err());
    }

    #[test]
    fn offset_is_clamped_and_rounded() {
        let mut session = session(SimulatedPlayer::new(30.0));
        for _ in 0..3 {
            session.apply(PlayerCommand::OffsetBy(0.1)).unwrap();
        }
        assert_eq!(session.synchronizer().offset(), 0.3);

        session.apply(PlayerCommand::SetOffset(-25.0)).unwrap();
        assert_eq!(session.synchronizer().offset(), -10.0);

        session.apply(PlayerCommand::ResetOffset).unwrap();
        assert_eq!(session.synchronizer().offset(), 0.0);
    }

    #[test]
    fn fullscreen_switches_preference_mode() {
        let mut session = session(SimulatedPlayer::new(30.0));
        session
            .apply(PlayerCommand::SetPreferences(PreferencePatch::font_size(40)))
            .unwrap();

        session.apply(PlayerCommand::ToggleFullscreen).unwrap();
        let frame = session.tick();
        assert_eq!(frame.mode, DisplayMode::Fullscreen);
        assert_eq!(frame.preferences.font_size_px, 36);

        session.apply(PlayerCommand::ExitFullscreen).unwrap();
        assert_eq!(session.tick().preferences.font_size_px, 40);
    }

    #[test]
    fn external_fullscreen_exit_is_followed() {
        let mut session = session(SimulatedPlayer::new(30.0));
        session.apply(PlayerCommand::ToggleFullscreen).unwrap();
        session.controller_mut().exit_fullscreen().unwrap();
        assert_eq!(session.tick().mode, DisplayMode::Normal);
    }

    #[test]
    fn volume_and_mute() {
        let mut session = session(SimulatedPlayer::new(30.0));
        session.apply(PlayerCommand::VolumeBy(0.5)).unwrap();
        assert_eq!(session.controller().volume(), 1.0);
        session.apply(PlayerCommand::VolumeBy(-0.25)).unwrap();
        assert_eq!(session.controller().volume(), 0.75);

        session.apply(PlayerCommand::ToggleMute).unwrap();
        assert!(session.controller().is_muted());
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_play_and_cue_transitions() {
        let mut session = session(SimulatedPlayer::new(30.0));
        session.apply(PlayerCommand::Seek(9.5)).unwrap();
        session.apply(PlayerCommand::TogglePlay).unwrap();
        assert!(session.tick().cue_text.is_none());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(session.tick().cue_text.as_deref(), Some("Hello"));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(session.tick().cue_text.as_deref(), Some("World"));

        session.apply(PlayerCommand::TogglePlay).unwrap();
        assert!(!session.tick().clock.unwrap().is_playing);
    }

    #[test]
    fn offset_formatting() {
        assert_eq!(format_offset(0.0), "0.0s");
        assert_eq!(format_offset(0.5), "+0.5s");
        assert_eq!(format_offset(-1.25), "-1.25s");
        assert_eq!(format_offset(2.0), "+2.0s");
        assert_eq!(format_offset(0.30000000000000004), "+0.3s");
    }
}
