//! Clock-driven player used by the CLI and tests.
//!
//! Position advances with `tokio::time::Instant`, so tests running with a
//! paused tokio clock control playback exactly.

use tokio::time::Instant;

use super::controller::{PlaybackController, PlayerError};

/// A [`PlaybackController`] with no real media behind it.
#[derive(Debug, Clone)]
pub struct SimulatedPlayer {
    duration: f64,
    ready: bool,
    /// Position at `anchor`.
    position: f64,
    /// Set while playing.
    anchor: Option<Instant>,
    muted: bool,
    volume: f64,
    fullscreen: bool,
}

impl SimulatedPlayer {
    /// A ready, paused player at 0s.
    pub fn new(duration_secs: f64) -> Self {
        Self {
            duration: duration_secs.max(0.0),
            ready: true,
            position: 0.0,
            anchor: None,
            muted: false,
            volume: 1.0,
            fullscreen: false,
        }
    }

    /// A player that reports not ready until [`set_ready`](Self::set_ready).
    pub fn loading(duration_secs: f64) -> Self {
        Self {
            ready: false,
            ..Self::new(duration_secs)
        }
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    fn position_now(&self) -> f64 {
        let pos = match self.anchor {
            Some(anchor) => self.position + anchor.elapsed().as_secs_f64(),
            None => self.position,
        };
        pos.min(self.duration)
    }

    fn ensure_ready(&self) -> Result<(), PlayerError> {
        if self.ready {
            Ok(())
        } else {
            Err(PlayerError::NotReady)
        }
    }
}

impl PlaybackController for SimulatedPlayer {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn current_time(&self) -> f64 {
        self.position_now()
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn is_playing(&self) -> bool {
        self.anchor.is_some() && !self.is_ended()
    }

    fn is_ended(&self) -> bool {
        self.position_now() >= self.duration
    }

    fn is_muted(&self) -> bool {
        self.muted
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    fn play(&mut self) -> Result<(), PlayerError> {
        self.ensure_ready()?;
        if self.is_ended() {
            self.position = 0.0;
        } else {
            self.position = self.position_now();
        }
        self.anchor = Some(Instant::now());
        Ok(())
    }

    fn pause(&mut self) -> Result<(), PlayerError> {
        self.ensure_ready()?;
        self.position = self.position_now();
        self.anchor = None;
        Ok(())
    }

    fn seek(&mut self, secs: f64) -> Result<(), PlayerError> {
        self.ensure_ready()?;
        if !secs.is_finite() || secs < 0.0 {
            return Err(PlayerError::InvalidSeek(secs));
        }
        self.position = secs.min(self.duration);
        if self.anchor.is_some() {
            self.anchor = Some(Instant::now());
        }
        Ok(())
    }

    fn set_muted(&mut self, muted: bool) -> Result<(), PlayerError> {
        self.ensure_ready()?;
        self.muted = muted;
        Ok(())
    }

    fn set_volume(&mut self, volume: f64) -> Result<(), PlayerError> {
        self.ensure_ready()?;
        if !(0.0..=1.0).contains(&volume) {
            return Err(PlayerError::InvalidVolume(volume));
        }
        self.volume = volume;
        Ok(())
    }

    fn request_fullscreen(&mut self) -> Result<(), PlayerError> {
        self.ensure_ready()?;
        self.fullscreen = true;
        Ok(())
    }

    fn exit_fullscreen(&mut self) -> Result<(), PlayerError> {
        self.fullscreen = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlaybackClock;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn position_follows_the_clock() {
        let mut player = SimulatedPlayer::new(30.0);
        player.play().unwrap();
        tokio::time::advance(Duration::from_millis(1500)).await;
        assert!((player.current_time() - 1.5).abs() < 1e-9);

        player.pause().unwrap();
        tokio::time::advance(Duration::from_secs(5)).await;
        assert!((player.current_time() - 1.5).abs() < 1e-9);
        assert!(!player.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn playback_stops_at_duration() {
        let mut player = SimulatedPlayer::new(2.0);
        player.play().unwrap();
        tokio::time::advance(Duration::from_secs(3)).await;
        assert_eq!(player.current_time(), 2.0);
        assert!(player.is_ended());
        assert!(!player.is_playing());

        // Replay from the start
        player.play().unwrap();
        assert_eq!(player.current_time(), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn seek_while_playing_keeps_playing() {
        let mut player = SimulatedPlayer::new(60.0);
        player.play().unwrap();
        player.seek(10.0).unwrap();
        tokio::time::advance(Duration::from_millis(500)).await;
        assert!((player.current_time() - 10.5).abs() < 1e-9);
        assert_eq!(player.seek(-1.0), Err(PlayerError::InvalidSeek(-1.0)));
    }

    #[test]
    fn loading_player_rejects_commands() {
        let mut player = SimulatedPlayer::loading(10.0);
        assert!(PlaybackClock::sample(&player).is_none());
        assert_eq!(player.play(), Err(PlayerError::NotReady));

        player.set_ready(true);
        let clock = PlaybackClock::sample(&player).unwrap();
        assert_eq!(clock.duration, 10.0);
        assert!(!clock.is_playing);
    }

    #[test]
    fn volume_is_validated() {
        let mut player = SimulatedPlayer::new(10.0);
        assert!(player.set_volume(0.5).is_ok());
        assert_eq!(player.set_volume(1.5), Err(PlayerError::InvalidVolume(1.5)));
        assert_eq!(player.volume(), 0.5);
    }
}
