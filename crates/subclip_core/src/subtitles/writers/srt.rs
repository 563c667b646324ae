//! SRT subtitle writer.
//!
//! Writes a [`SubtitleTrack`] to SRT format. Indices are regenerated
//! sequentially from 1; the millisecond separator is a comma.

use crate::subtitles::types::SubtitleTrack;

/// Write a track to an SRT string.
///
/// Blank lines inside cue text are dropped, since a blank line ends a block.
pub fn write_srt(track: &SubtitleTrack) -> String {
    let mut output = String::new();

    for (i, cue) in track.iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }

        // Index (1-based)
        output.push_str(&format!("{}\n", i + 1));

        // Timing line
        output.push_str(&format!(
            "{} --> {}\n",
            format_srt_time(cue.start_ms),
            format_srt_time(cue.end_ms)
        ));

        for line in cue.text.lines().filter(|l| !l.trim().is_empty()) {
            output.push_str(line);
            output.push('\n');
        }
    }

    output
}

/// Format milliseconds as SRT timestamp (HH:MM:SS,mmm).
pub fn format_srt_time(ms: u64) -> String {
    let millis = ms % 1000;
    let total_secs = ms / 1000;
    let secs = total_secs % 60;
    let total_mins = total_secs / 60;
    let mins = total_mins % 60;
    let hours = total_mins / 60;

    format!("{:02}:{:02}:{:02},{:03}", hours, mins, secs, millis)
}
