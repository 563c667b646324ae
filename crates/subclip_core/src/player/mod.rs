//! Video player integration.
//!
//! # Architecture
//!
//! - **controller**: [`PlaybackController`] trait over the external widget
//! - **simulated**: clock-driven controller for the CLI and tests
//! - **preferences**: per-mode display preferences and their stores
//! - **synchronizer**: active cue lookup plus preference ownership
//! - **session**: one tick = one [`OverlayFrame`]; commands from the UI
//! - **shortcuts**: keyboard bindings
//! - **poller**: tokio task that ticks a session on a fixed interval
//!
//! # Usage
//!
//! ```ignore
//! use std::time::Duration;
//! use subclip_core::player::*;
//!
//! let store = JsonPreferenceStore::open("preferences.json");
//! let mut sync = SubtitleSynchronizer::new(Box::new(store));
//! sync.set_track(track);
//!
//! let session = PlaybackSession::new(SimulatedPlayer::new(180.0), sync, SessionOptions::default());
//! let handle = spawn_poller(session, Duration::from_millis(100));
//! handle.send(PlayerCommand::Play).await?;
//! ```

mod controller;
pub mod poller;
pub mod preferences;
mod session;
pub mod shortcuts;
mod simulated;
mod synchronizer;

pub use controller::{PlaybackClock, PlaybackController, PlayerError};
pub use poller::{spawn_poller, PollerHandle};
pub use preferences::{
    DisplayMode, DisplayPreferences, JsonPreferenceStore, MemoryPreferenceStore,
    PreferenceError, PreferencePatch, PreferenceStore,
};
pub use session::{format_offset, OverlayFrame, PlaybackSession, PlayerCommand, SessionOptions};
pub use shortcuts::{command_for, Key};
pub use simulated::SimulatedPlayer;
pub use synchronizer::SubtitleSynchronizer;
