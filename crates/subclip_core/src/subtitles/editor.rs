//! Subtitle line editor.
//!
//! Lines are edited in the in-app `MM:SS.mmm` text form, so a half-typed
//! time is a legal intermediate state. Conversion to a [`SubtitleTrack`]
//! happens on demand and reports the first line that does not parse.

use serde::{Deserialize, Serialize};

use super::clock::{format_clock, parse_clock};
use super::error::{ParseError, SubtitleError};
use super::types::{Cue, SubtitleTrack};
use super::writers::write_srt;

/// Placeholder text for a freshly added line.
pub const NEW_LINE_TEXT: &str = "Nova linha de legenda";

/// One editable subtitle row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorLine {
    pub id: String,
    pub start_time: String,
    pub end_time: String,
    pub text: String,
}

impl EditorLine {
    fn from_cue(cue: &Cue) -> Self {
        Self {
            id: cue.id.clone(),
            start_time: format_clock(cue.start_ms),
            end_time: format_clock(cue.end_ms),
            text: cue.text.clone(),
        }
    }

    fn to_cue(&self) -> Result<Cue, ParseError> {
        Ok(Cue::with_id(
            self.id.clone(),
            parse_clock(&self.start_time)?,
            parse_clock(&self.end_time)?,
            self.text.clone(),
        ))
    }
}

/// Editable field of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineField {
    Start,
    End,
    Text,
}

/// Problem found by [`SubtitleEditor::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineIssue {
    /// Start or end is not a valid clock value.
    InvalidClock { id: String, value: String },
    /// Line ends before it starts.
    Inverted { id: String },
    /// Line has no visible text.
    EmptyText { id: String },
    /// Line starts before the previous line (in time order) ends.
    Overlap { id: String, previous_id: String },
}

impl LineIssue {
    /// Id of the offending line.
    pub fn line_id(&self) -> &str {
        match self {
            Self::InvalidClock { id, .. }
            | Self::Inverted { id }
            | Self::EmptyText { id }
            | Self::Overlap { id, .. } => id,
        }
    }
}

impl std::fmt::Display for LineIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidClock { id, value } => write!(f, "line {id}: invalid time '{value}'"),
            Self::Inverted { id } => write!(f, "line {id}: ends before it starts"),
            Self::EmptyText { id } => write!(f, "line {id}: no text"),
            Self::Overlap { id, previous_id } => {
                write!(f, "line {id}: overlaps line {previous_id}")
            }
        }
    }
}

/// In-memory editor state for one clip's subtitles.
#[derive(Debug, Clone, Default)]
pub struct SubtitleEditor {
    lines: Vec<EditorLine>,
    dirty: bool,
}

impl SubtitleEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an existing track.
    pub fn from_track(track: &SubtitleTrack) -> Self {
        Self {
            lines: track.iter().map(EditorLine::from_cue).collect(),
            dirty: false,
        }
    }

    pub fn lines(&self) -> &[EditorLine] {
        &self.lines
    }

    /// Whether there are edits since load or the last [`mark_saved`](Self::mark_saved).
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Append a placeholder line at `00:00.000` and return its id.
    pub fn add_line(&mut self) -> String {
        let line = EditorLine::from_cue(&Cue::new(0, 0, NEW_LINE_TEXT));
        let id = line.id.clone();
        self.lines.push(line);
        self.dirty = true;
        id
    }

    /// Remove a line. Returns false if the id is unknown.
    pub fn remove_line(&mut self, id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.id != id);
        let removed = self.lines.len() != before;
        self.dirty |= removed;
        removed
    }

    /// Set one field of a line. Returns false if the id is unknown.
    ///
    /// Time fields are stored as typed; they are checked by
    /// [`validate`](Self::validate) and [`to_track`](Self::to_track).
    pub fn update(&mut self, id: &str, field: LineField, value: impl Into<String>) -> bool {
        let Some(line) = self.lines.iter_mut().find(|l| l.id == id) else {
            return false;
        };
        let value = value.into();
        match field {
            LineField::Start => line.start_time = value,
            LineField::End => line.end_time = value,
            LineField::Text => line.text = value,
        }
        self.dirty = true;
        true
    }

    /// Replace all lines with the contents of an SRT file.
    ///
    /// Returns the number of imported lines. On error the editor is untouched.
    pub fn import_srt(&mut self, bytes: &[u8]) -> Result<usize, SubtitleError> {
        let parsed = super::import_bytes(bytes)?;
        self.lines = parsed.track.iter().map(EditorLine::from_cue).collect();
        self.dirty = true;
        Ok(self.lines.len())
    }

    /// Sort lines by start time. Unparseable lines move to the end.
    pub fn sort_by_time(&mut self) {
        self.lines
            .sort_by_key(|l| parse_clock(&l.start_time).unwrap_or(u64::MAX));
        self.dirty = true;
    }

    /// Convert to a track, failing on the first unparseable time.
    pub fn to_track(&self) -> Result<SubtitleTrack, ParseError> {
        self.lines
            .iter()
            .map(EditorLine::to_cue)
            .collect::<Result<Vec<_>, _>>()
            .map(SubtitleTrack::from_cues)
    }

    /// Render as SRT.
    pub fn export_srt(&self) -> Result<String, ParseError> {
        Ok(write_srt(&self.to_track()?))
    }

    /// List every problem with the current lines.
    pub fn validate(&self) -> Vec<LineIssue> {
        let mut issues = Vec::new();
        let mut timed = Vec::new();

        for line in &self.lines {
            let start = parse_clock(&line.start_time);
            let end = parse_clock(&line.end_time);
            for (value, parsed) in [(&line.start_time, &start), (&line.end_time, &end)] {
                if parsed.is_err() {
                    issues.push(LineIssue::InvalidClock {
                        id: line.id.clone(),
                        value: value.clone(),
                    });
                }
            }
            if line.text.trim().is_empty() {
                issues.push(LineIssue::EmptyText { id: line.id.clone() });
            }
            if let (Ok(start), Ok(end)) = (start, end) {
                if start > end {
                    issues.push(LineIssue::Inverted { id: line.id.clone() });
                } else {
                    timed.push((start, end, line.id.as_str()));
                }
            }
        }

        timed.sort_by_key(|&(start, _, _)| start);
        for pair in timed.windows(2) {
            let (_, prev_end, prev_id) = pair[0];
            let (start, _, id) = pair[1];
            if start < prev_end {
                issues.push(LineIssue::Overlap {
                    id: id.to_string(),
                    previous_id: prev_id.to_string(),
                });
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SubtitleEditor {
        SubtitleEditor::from_track(&SubtitleTrack::from_cues(vec![
            Cue::with_id("1", 10_240, 12_800, "(Music starts playing)"),
            Cue::with_id("2", 13_500, 16_120, "I can see it in your eyes..."),
            Cue::with_id("3", 16_800, 19_300, "...the fire that burns inside."),
        ]))
    }

    #[test]
    fn lines_use_clock_form() {
        let editor = sample();
        assert_eq!(editor.lines()[0].start_time, "00:10.240");
        assert_eq!(editor.lines()[0].end_time, "00:12.800");
        assert!(!editor.is_dirty());
        assert!(editor.validate().is_empty());
    }

    #[test]
    fn add_line_uses_placeholder() {
        let mut editor = SubtitleEditor::new();
        let id = editor.add_line();
        let line = &editor.lines()[0];
        assert_eq!(line.id, id);
        assert_eq!(line.start_time, "00:00.000");
        assert_eq!(line.end_time, "00:00.000");
        assert_eq!(line.text, NEW_LINE_TEXT);
        assert!(editor.is_dirty());
    }

    #[test]
    fn update_and_remove() {
        let mut editor = sample();
        assert!(editor.update("2", LineField::Text, "Changed"));
        assert!(editor.update("2", LineField::Start, "00:14.000"));
        assert!(!editor.update("missing", LineField::Text, "x"));

        let track = editor.to_track().unwrap();
        assert_eq!(track.get("2").unwrap().start_ms, 14_000);
        assert_eq!(track.get("2").unwrap().text, "Changed");

        assert!(editor.remove_line("1"));
        assert!(!editor.remove_line("1"));
        assert_eq!(editor.lines().len(), 2);
    }

    #[test]
    fn half_typed_time_is_reported() {
        let mut editor = sample();
        editor.update("1", LineField::End, "00:1x");

        let issues = editor.validate();
        assert_eq!(
            issues,
            vec![LineIssue::InvalidClock {
                id: "1".to_string(),
                value: "00:1x".to_string()
            }]
        );
        assert!(editor.to_track().is_err());
        assert!(editor.export_srt().is_err());
    }

    #[test]
    fn inverted_and_overlapping_lines_are_reported() {
        let mut editor = sample();
        editor.update("2", LineField::Start, "00:12.000");
        editor.update("3", LineField::End, "00:10.000");

        let issues = editor.validate();
        assert!(issues.contains(&LineIssue::Overlap {
            id: "2".to_string(),
            previous_id: "1".to_string()
        }));
        assert!(issues.contains(&LineIssue::Inverted { id: "3".to_string() }));
        assert_eq!(issues.len(), 2);
    }

    #[test]
    fn import_replaces_lines() {
        let mut editor = sample();
        let count = editor
            .import_srt(b"1\r\n00:00:01,000 --> 00:00:02,500\r\nOla\r\n")
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(editor.lines()[0].end_time, "00:02.500");
    }

    #[test]
    fn failed_import_keeps_lines() {
        let mut editor = sample();
        assert!(editor.import_srt(&[0x00, 0x81]).is_err());
        assert_eq!(editor.lines().len(), 3);
        assert!(!editor.is_dirty());
    }

    #[test]
    fn sort_moves_bad_times_last() {
        let mut editor = sample();
        editor.update("1", LineField::Start, "??");
        editor.sort_by_time();
        let ids: Vec<&str> = editor.lines().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["2", "3", "1"]);
    }

    #[test]
    fn export_renumbers() {
        let mut editor = sample();
        editor.remove_line("1");
        let srt = editor.export_srt().unwrap();
        assert!(srt.starts_with("1\n00:00:13,500 --> 00:00:16,120\n"));
    }
}
