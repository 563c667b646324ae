//! Clip catalog: browsing, community intake and moderation.
//!
//! # Architecture
//!
//! - **types**: clip, comment, submission, request and profile records
//! - **backend**: [`CatalogBackend`] data access and the in-memory backend
//! - **library**: published-clip queries, artist index, home feed
//! - **comments**: reply threads and ratings
//! - **intake**: validation of public forms
//! - **moderation**: admin commands with optimistic rollback
//! - **dashboard**: admin summary figures
//! - **context**: signed-in user, permission checks and toasts

pub mod backend;
pub mod comments;
pub mod context;
pub mod dashboard;
mod error;
pub mod intake;
pub mod library;
pub mod moderation;
mod types;
pub mod youtube;

pub use backend::{CatalogBackend, MemoryBackend};
pub use comments::{average_rating, build_threads, time_ago, visible_threads, CommentThread};
pub use context::{AppContext, Toast, ToastKind, ToastQueue};
pub use dashboard::{format_views, DashboardMetrics};
pub use error::{CatalogError, CatalogResult};
pub use intake::{CommentForm, RequestForm, SubmissionForm};
pub use library::{artist_index, home_feed, ArtistEntry, HomeFeed, LibraryQuery, SortOrder};
pub use moderation::{CommandOutcome, ModerationCommand, Moderated, OptimisticList};
pub use types::{
    Clip, ClipStatus, Comment, CommentStatus, RequestStatus, Role, SubmissionStatus,
    SubtitleSubmission, TranslationRequest, UserProfile, DEFAULT_LANGUAGE, RATING_RANGE,
};
