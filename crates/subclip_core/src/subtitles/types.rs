//! Core subtitle types.
//!
//! Timing values are stored as integer milliseconds. Playback works in
//! floating point seconds; conversion happens through [`Cue::start_secs`]
//! and [`Cue::end_secs`].

use serde::{Deserialize, Serialize};

use super::clock::serde_clock;

/// A single timed subtitle line.
///
/// Serialized in the in-app wire form used by the catalog backend:
/// `{ "id", "startTime": "MM:SS.mmm", "endTime": "MM:SS.mmm", "text" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cue {
    /// Opaque identifier, stable across edits.
    pub id: String,
    /// Start time in milliseconds.
    #[serde(rename = "startTime", with = "serde_clock")]
    pub start_ms: u64,
    /// End time in milliseconds.
    #[serde(rename = "endTime", with = "serde_clock")]
    pub end_ms: u64,
    /// Display text (may contain line breaks).
    pub text: String,
}

impl Cue {
    /// Create a cue with a freshly generated id.
    pub fn new(start_ms: u64, end_ms: u64, text: impl Into<String>) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), start_ms, end_ms, text)
    }

    /// Create a cue with an explicit id.
    pub fn with_id(id: impl Into<String>, start_ms: u64, end_ms: u64, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            start_ms,
            end_ms,
            text: text.into(),
        }
    }

    /// Start time in seconds.
    pub fn start_secs(&self) -> f64 {
        self.start_ms as f64 / 1000.0
    }

    /// End time in seconds.
    pub fn end_secs(&self) -> f64 {
        self.end_ms as f64 / 1000.0
    }

    /// Whether `start <= end`.
    pub fn is_well_formed(&self) -> bool {
        self.start_ms <= self.end_ms
    }

    /// Whether the cue covers `secs`, inclusive on both ends.
    ///
    /// Malformed cues cover nothing. NaN covers nothing.
    pub fn contains(&self, secs: f64) -> bool {
        secs >= self.start_secs() && secs <= self.end_secs()
    }

    /// Duration in milliseconds (zero for malformed cues).
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// Shift this cue by a signed offset, clamped to 0.
    pub fn shift(&mut self, offset_ms: i64) {
        self.start_ms = shift_ms(self.start_ms, offset_ms);
        self.end_ms = shift_ms(self.end_ms, offset_ms);
    }
}

fn shift_ms(ms: u64, offset_ms: i64) -> u64 {
    if offset_ms >= 0 {
        ms.saturating_add(offset_ms as u64)
    } else {
        ms.saturating_sub(offset_ms.unsigned_abs())
    }
}

/// Ordered collection of cues for one clip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubtitleTrack {
    /// Cues in track order.
    pub cues: Vec<Cue>,
}

impl SubtitleTrack {
    /// Create an empty track.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a track from cues, keeping their order.
    pub fn from_cues(cues: Vec<Cue>) -> Self {
        Self { cues }
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cue> {
        self.cues.iter()
    }

    pub fn push(&mut self, cue: Cue) {
        self.cues.push(cue);
    }

    /// Look up a cue by id.
    pub fn get(&self, id: &str) -> Option<&Cue> {
        self.cues.iter().find(|c| c.id == id)
    }

    /// Look up a cue by id for editing.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Cue> {
        self.cues.iter_mut().find(|c| c.id == id)
    }

    /// Remove a cue by id.
    pub fn remove(&mut self, id: &str) -> Option<Cue> {
        let index = self.cues.iter().position(|c| c.id == id)?;
        Some(self.cues.remove(index))
    }

    /// Whether cues are in non-decreasing start order.
    pub fn is_sorted_by_start(&self) -> bool {
        self.cues.windows(2).all(|w| w[0].start_ms <= w[1].start_ms)
    }

    /// Sort cues by start time. Stable, so equal starts keep track order.
    pub fn sort_by_time(&mut self) {
        self.cues.sort_by_key(|c| c.start_ms);
    }

    /// End of the last well-formed cue in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.cues
            .iter()
            .filter(|c| c.is_well_formed())
            .map(|c| c.end_ms)
            .max()
            .unwrap_or(0)
    }

    /// Number of cues with `start > end`.
    pub fn malformed_count(&self) -> usize {
        self.cues.iter().filter(|c| !c.is_well_formed()).count()
    }

    /// Shift all cues by a signed offset (clamped to 0).
    pub fn shift_all(&mut self, offset_ms: i64) {
        for cue in &mut self.cues {
            cue.shift(offset_ms);
        }
    }
}

impl<'a> IntoIterator for &'a SubtitleTrack {
    type Item = &'a Cue;
    type IntoIter = std::slice::Iter<'a, Cue>;

    fn into_iter(self) -> Self::IntoIter {
        self.cues.iter()
    }
}

impl FromIterator<Cue> for SubtitleTrack {
    fn from_iter<I: IntoIterator<Item = Cue>>(iter: I) -> Self {
        Self {
            cues: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cue_contains_is_inclusive() {
        let cue = Cue::new(10_000, 12_000, "Hello");
        assert!(cue.contains(10.0));
        assert!(cue.contains(11.0));
        assert!(cue.contains(12.0));
        assert!(!cue.contains(9.999));
        assert!(!cue.contains(12.001));
        assert!(!cue.contains(f64::NAN));
    }

    #[test]
    fn malformed_cue_contains_nothing() {
        let cue = Cue::new(20_000, 10_000, "bad");
        assert!(!cue.is_well_formed());
        for t in [9.0, 10.0, 15.0, 18.0, 20.0, 21.0] {
            assert!(!cue.contains(t));
        }
        assert_eq!(cue.duration_ms(), 0);
    }

    #[test]
    fn test_cue_shift() {
        let mut cue = Cue::new(1000, 2000, "Test");
        cue.shift(500);
        assert_eq!((cue.start_ms, cue.end_ms), (1500, 2500));

        // Negative shift clamped to 0
        cue.shift(-2000);
        assert_eq!((cue.start_ms, cue.end_ms), (0, 500));
    }

    #[test]
    fn sort_is_stable_for_equal_starts() {
        let mut track = SubtitleTrack::from_cues(vec![
            Cue::with_id("b", 5000, 6000, "B"),
            Cue::with_id("a1", 1000, 3000, "A1"),
            Cue::with_id("a2", 1000, 2000, "A2"),
        ]);
        assert!(!track.is_sorted_by_start());
        track.sort_by_time();
        let ids: Vec<&str> = track.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["a1", "a2", "b"]);
        assert!(track.is_sorted_by_start());
    }

    #[test]
    fn duration_ignores_malformed() {
        let track = SubtitleTrack::from_cues(vec![
            Cue::new(1000, 4000, "ok"),
            Cue::new(90_000, 5000, "bad"),
        ]);
        assert_eq!(track.duration_ms(), 4000);
        assert_eq!(track.malformed_count(), 1);
    }

    #[test]
    fn cue_serializes_in_app_clock_form() {
        let cue = Cue::with_id("1", 10_240, 12_800, "(Music starts playing)");
        let json = serde_json::to_value(&cue).unwrap();
        assert_eq!(json["startTime"], "00:10.240");
        assert_eq!(json["endTime"], "00:12.800");

        let back: Cue = serde_json::from_value(json).unwrap();
        assert_eq!(back, cue);
    }

    #[test]
    fn remove_by_id() {
        let mut track = SubtitleTrack::from_cues(vec![
            Cue::with_id("1", 0, 1000, "a"),
            Cue::with_id("2", 1000, 2000, "b"),
        ]);
        assert_eq!(track.remove("1").map(|c| c.text), Some("a".to_string()));
        assert!(track.remove("1").is_none());
        assert_eq!(track.len(), 1);
    }
}
