//! Playback controller abstraction.
//!
//! The embedded video widget is an external collaborator. The core only
//! sees it through [`PlaybackController`] and samples it on a fixed
//! interval instead of subscribing to its events.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by controller commands.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlayerError {
    /// The widget has not finished loading.
    #[error("Player is not ready")]
    NotReady,

    #[error("Invalid seek target: {0}s")]
    InvalidSeek(f64),

    #[error("Volume must be within 0.0..=1.0, got {0}")]
    InvalidVolume(f64),

    /// The polling task has stopped and no longer accepts commands.
    #[error("Playback session is closed")]
    SessionClosed,

    /// Failure reported by the underlying widget.
    #[error("Player backend error: {0}")]
    Backend(String),
}

/// Trait for video player adapters.
///
/// Getters are cheap and are called on every poll tick. Commands may fail
/// with [`PlayerError::NotReady`] before the widget has loaded.
pub trait PlaybackController: Send {
    /// Whether the widget has loaded and reports meaningful values.
    fn is_ready(&self) -> bool;

    /// Current playback position in seconds.
    fn current_time(&self) -> f64;

    /// Media duration in seconds (0.0 when unknown).
    fn duration(&self) -> f64;

    fn is_playing(&self) -> bool;

    /// Whether playback reached the end.
    fn is_ended(&self) -> bool;

    fn is_muted(&self) -> bool;

    /// Volume in 0.0..=1.0.
    fn volume(&self) -> f64;

    fn is_fullscreen(&self) -> bool;

    fn play(&mut self) -> Result<(), PlayerError>;

    fn pause(&mut self) -> Result<(), PlayerError>;

    /// Jump to an absolute position in seconds.
    fn seek(&mut self, secs: f64) -> Result<(), PlayerError>;

    fn set_muted(&mut self, muted: bool) -> Result<(), PlayerError>;

    fn set_volume(&mut self, volume: f64) -> Result<(), PlayerError>;

    fn request_fullscreen(&mut self) -> Result<(), PlayerError>;

    fn exit_fullscreen(&mut self) -> Result<(), PlayerError>;
}

/// One sample of the controller's playback state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackClock {
    pub current_time: f64,
    pub duration: f64,
    pub is_playing: bool,
    pub has_ended: bool,
}

impl PlaybackClock {
    /// Sample a controller. Returns `None` until it is ready.
    pub fn sample<C: PlaybackController + ?Sized>(controller: &C) -> Option<Self> {
        if !controller.is_ready() {
            return None;
        }
        Some(Self {
            current_time: controller.current_time(),
            duration: controller.duration(),
            is_playing: controller.is_playing(),
            has_ended: controller.is_ended(),
        })
    }

    /// Playback progress in 0.0..=1.0 (0.0 when duration is unknown).
    pub fn progress(&self) -> f64 {
        if self.duration > 0.0 && self.current_time.is_finite() {
            (self.current_time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}
