//! subclip core - backend logic for the subtitled clip catalog
//!
//! This crate contains all business logic with zero UI dependencies.
//! It can be used by a GUI front end or by the `subclip` CLI tool.
//!
//! - **subtitles**: cue/track model, SRT codec, playback synchronizer
//! - **player**: controller trait, preferences, polling session
//! - **catalog**: clips, comments, community intake, moderation
//! - **config** / **logging**: ambient infrastructure

pub mod catalog;
pub mod config;
pub mod logging;
pub mod player;
pub mod subtitles;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}
