//! Active cue resolution.
//!
//! [`CueResolver`] answers "which cue is visible at this playback time" for
//! a track plus a user offset. The answer is a pure function of
//! `(track, offset, raw_time)`:
//!
//! - `adjusted = raw_time + offset`
//! - the first cue in track order with `start <= adjusted <= end` wins
//! - malformed cues (`start > end`) never match
//! - non-finite input never matches
//!
//! When the track is sorted by start time, cues starting after `adjusted`
//! are pruned with a binary search before the scan. Sorting never changes
//! the result, because stable start order is track order.

use super::types::{Cue, SubtitleTrack};

/// Resolves the active cue for a track and offset.
#[derive(Debug, Clone, Default)]
pub struct CueResolver {
    track: SubtitleTrack,
    offset_secs: f64,
    /// Cached on `set_track`: whether the prefix pruning can be used.
    sorted: bool,
}

impl CueResolver {
    pub fn new() -> Self {
        Self {
            sorted: true,
            ..Default::default()
        }
    }

    /// Create a resolver for a track with zero offset.
    pub fn with_track(track: SubtitleTrack) -> Self {
        let mut resolver = Self::new();
        resolver.set_track(track);
        resolver
    }

    /// Replace the active track.
    pub fn set_track(&mut self, track: SubtitleTrack) {
        self.sorted = track.is_sorted_by_start();
        self.track = track;
    }

    pub fn track(&self) -> &SubtitleTrack {
        &self.track
    }

    /// Set the sync offset in seconds. Positive values delay subtitles.
    pub fn set_offset(&mut self, offset_secs: f64) {
        self.offset_secs = offset_secs;
    }

    pub fn offset(&self) -> f64 {
        self.offset_secs
    }

    /// Raw playback time shifted by the offset.
    pub fn adjusted_time(&self, raw_secs: f64) -> f64 {
        raw_secs + self.offset_secs
    }

    /// The cue visible at `raw_secs`, if any.
    pub fn evaluate(&self, raw_secs: f64) -> Option<&Cue> {
        let adjusted = self.adjusted_time(raw_secs);
        if !adjusted.is_finite() {
            return None;
        }

        let cues = &self.track.cues;
        let candidates = if self.sorted {
            let end = cues.partition_point(|c| c.start_secs() <= adjusted);
            &cues[..end]
        } else {
            &cues[..]
        };

        candidates.iter().find(|c| c.contains(adjusted))
    }
}

/// Linear first-match lookup over an arbitrary slice.
pub fn find_active_cue(cues: &[Cue], adjusted_secs: f64) -> Option<&Cue> {
    cues.iter().find(|c| c.contains(adjusted_secs))
}
