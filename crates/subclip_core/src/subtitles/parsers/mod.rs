//! Subtitle parsers.
//!
//! Each parser is a pure function that takes decoded content and returns a track.

mod srt;

pub use srt::{parse_srt, parse_srt_report, parse_srt_time, SrtParse};
