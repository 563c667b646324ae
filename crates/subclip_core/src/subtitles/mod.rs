//! Subtitle processing module.
//!
//! Provides the cue/track model, the SRT interchange codec and the active
//! cue lookup used during playback.
//!
//! # Components
//!
//! - **types**: Core data structures (Cue, SubtitleTrack)
//! - **clock**: In-app `MM:SS.mmm` time form
//! - **encoding**: Byte decoding for imported files
//! - **parsers** / **writers**: SRT codec
//! - **sync**: Active cue resolution with offset
//! - **editor**: Line editor used by the admin console
//!
//! # Usage
//!
//! ```ignore
//! use subclip_core::subtitles::{import_file, CueResolver};
//!
//! let parsed = import_file("clip.srt", 1024 * 1024)?;
//! let mut resolver = CueResolver::with_track(parsed.track);
//! resolver.set_offset(-0.5);
//! if let Some(cue) = resolver.evaluate(12.0) {
//!     println!("{}", cue.text);
//! }
//! ```

pub mod clock;
pub mod editor;
pub mod encoding;
mod error;
pub mod parsers;
pub mod sync;
mod types;
pub mod writers;

use std::fs;
use std::path::Path;

// Re-export core types
pub use types::{Cue, SubtitleTrack};

// Re-export errors
pub use error::{DecodeError, ParseError, SubtitleError};

pub use clock::{format_clock, parse_clock};
pub use encoding::{decode, TextEncoding};
pub use parsers::{parse_srt, parse_srt_report, parse_srt_time, SrtParse};
pub use sync::CueResolver;
pub use writers::{format_srt_time, write_srt};

/// Decode and parse raw SRT bytes.
///
/// # Returns
/// * `Ok(SrtParse)` - Parsed track plus skipped-block diagnostics.
/// * `Err(SubtitleError::Decode)` - If no supported encoding fits.
pub fn import_bytes(bytes: &[u8]) -> Result<SrtParse, SubtitleError> {
    let (text, encoding) = decode(bytes)?;
    let parsed = parse_srt_report(&text);

    tracing::debug!(
        "Imported {} cues ({} encoding, {} blocks skipped)",
        parsed.track.len(),
        encoding,
        parsed.skipped.len()
    );

    Ok(parsed)
}

/// Read and parse an SRT file from disk.
///
/// # Arguments
/// * `path` - Path to the subtitle file.
/// * `max_bytes` - Files larger than this are rejected before reading.
///
/// # Returns
/// * `Ok(SrtParse)` - Parsed track plus diagnostics.
/// * `Err(SubtitleError)` - If reading, size check or decoding fails.
pub fn import_file(path: impl AsRef<Path>, max_bytes: u64) -> Result<SrtParse, SubtitleError> {
    let path = path.as_ref();

    let size = fs::metadata(path)
        .map_err(|e| SubtitleError::read(path, e))?
        .len();
    if size > max_bytes {
        return Err(SubtitleError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let bytes = fs::read(path).map_err(|e| SubtitleError::read(path, e))?;
    import_bytes(&bytes)
}

/// Write a track to disk as UTF-8 SRT.
///
/// The file is written to a temporary sibling first and renamed into place.
pub fn export_file(track: &SubtitleTrack, path: impl AsRef<Path>) -> Result<(), SubtitleError> {
    let path = path.as_ref();
    let content = write_srt(track);

    let temp_path = path.with_extension("srt.tmp");
    fs::write(&temp_path, content).map_err(|e| SubtitleError::write(&temp_path, e))?;
    fs::rename(&temp_path, path).map_err(|e| SubtitleError::write(path, e))?;

    Ok(())
}
