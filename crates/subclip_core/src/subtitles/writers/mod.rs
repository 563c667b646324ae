//! Subtitle writers.
//!
//! Each writer is a pure function that takes a track and returns a formatted string.

mod srt;

pub use srt::{format_srt_time, write_srt};
