//! SRT subtitle parser.
//!
//! Parses SubRip (.srt) subtitle files.
//!
//! # Format Overview
//!
//! SRT files consist of sequential entries:
//! ```text
//! 1
//! 00:00:01,000 --> 00:00:04,000
//! Hello, world!
//!
//! 2
//! 00:00:05,000 --> 00:00:08,000
//! This is a test.
//! ```
//!
//! Each entry has:
//! - Index number (ignored during parsing, regenerated on write)
//! - Timing line: `HH:MM:SS,mmm --> HH:MM:SS,mmm`
//! - One or more lines of text
//! - Blank line separator
//!
//! Parsing never fails as a whole. Blocks without a usable timing line, and
//! cues that end before they start, are dropped and reported in
//! [`SrtParse::skipped`].

use crate::subtitles::clock::parse_fraction_ms;
use crate::subtitles::error::ParseError;
use crate::subtitles::types::{Cue, SubtitleTrack};

/// Result of parsing SRT content.
#[derive(Debug, Clone, Default)]
pub struct SrtParse {
    /// Cues that were read successfully, in file order.
    pub track: SubtitleTrack,
    /// Non-fatal problems with dropped blocks.
    pub skipped: Vec<ParseError>,
}

/// Parse SRT content into a track, discarding diagnostics.
pub fn parse_srt(content: &str) -> SubtitleTrack {
    parse_srt_report(content).track
}

/// Parse SRT content into a track plus a list of skipped blocks.
pub fn parse_srt_report(content: &str) -> SrtParse {
    let mut result = SrtParse::default();

    // Normalize line endings
    let content = content.replace("\r\n", "\n").replace('\r', "\n");

    for (first_line, lines) in blocks(&content) {
        let Some(timing_idx) = lines.iter().position(|l| l.contains("-->")) else {
            result.skipped.push(ParseError::MissingTiming { line: first_line });
            continue;
        };
        let timing_line_num = first_line + timing_idx;

        let Some((start_ms, end_ms)) = parse_srt_timing(lines[timing_idx]) else {
            result
                .skipped
                .push(ParseError::invalid_time(timing_line_num, lines[timing_idx].trim()));
            continue;
        };

        if start_ms > end_ms {
            result
                .skipped
                .push(ParseError::InvertedTiming { line: timing_line_num });
            continue;
        }

        let text = lines[timing_idx + 1..].join("\n");
        if text.trim().is_empty() {
            result.skipped.push(ParseError::at_line(timing_line_num, "cue has no text"));
            continue;
        }

        result.track.push(Cue::new(start_ms, end_ms, text));
    }

    if !result.skipped.is_empty() {
        tracing::debug!(
            "SRT parse: {} cues read, {} blocks skipped",
            result.track.len(),
            result.skipped.len()
        );
    }

    result
}

/// Split content into blank-line separated blocks.
///
/// Yields the 1-based line number of each block's first line with its lines.
fn blocks(content: &str) -> Vec<(usize, Vec<&str>)> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut start = 0;

    for (i, line) in content.split('\n').enumerate() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                out.push((start, std::mem::take(&mut current)));
            }
            continue;
        }
        if current.is_empty() {
            start = i + 1;
        }
        current.push(line.strip_prefix('\u{FEFF}').unwrap_or(line));
    }
    if !current.is_empty() {
        out.push((start, current));
    }

    out
}

/// Parse SRT timing line: `HH:MM:SS,mmm --> HH:MM:SS,mmm`
///
/// Trailing position hints after the end time (`X1:… Y1:…`) are ignored.
fn parse_srt_timing(line: &str) -> Option<(u64, u64)> {
    let (start, end) = line.split_once("-->")?;
    let end = end.split_whitespace().next()?;

    Some((parse_srt_time(start)?, parse_srt_time(end)?))
}

/// Parse SRT timestamp: `HH:MM:SS,mmm` or `HH:MM:SS.mmm`
///
/// Returns time in milliseconds.
pub fn parse_srt_time(s: &str) -> Option<u64> {
    let s = s.trim();

    let mut parts = s.split(':');
    let hours: u64 = parts.next()?.trim().parse().ok()?;
    let minutes: u64 = parts.next()?.parse().ok()?;
    let seconds_part = parts.next()?;
    if parts.next().is_some() || minutes >= 60 {
        return None;
    }

    // Handle both comma and period as decimal separator
    let (seconds, millis) = match seconds_part.split_once([',', '.']) {
        Some((secs, frac)) => (secs.parse::<u64>().ok()?, parse_fraction_ms(frac)?),
        None => (seconds_part.parse::<u64>().ok()?, 0),
    };
    if seconds >= 60 {
        return None;
    }

    hours
        .checked_mul(3_600_000)?
        .checked_add(minutes * 60_000 + seconds * 1000 + millis)
}
