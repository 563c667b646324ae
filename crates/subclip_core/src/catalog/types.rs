//! Catalog records.
//!
//! Field names serialize in snake_case, the same shape the hosted
//! database uses, so rows can round-trip through `serde_json` unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::subtitles::SubtitleTrack;

use super::youtube;

/// Publication state of a clip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClipStatus {
    #[default]
    Draft,
    Published,
}

/// A subtitled video clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub id: String,
    pub title: String,
    pub artist: String,
    /// Explicit thumbnail; see [`Clip::display_thumbnail`].
    #[serde(default, rename = "thumbnail_url")]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub status: ClipStatus,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub release_year: Option<i32>,
    #[serde(default)]
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub subtitles: SubtitleTrack,
}

impl Clip {
    /// Create a draft clip with a fresh id.
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            artist: artist.into(),
            thumbnail: None,
            video_url: None,
            views: 0,
            status: ClipStatus::Draft,
            description: String::new(),
            tags: Vec::new(),
            release_year: None,
            is_featured: false,
            created_at: Utc::now(),
            subtitles: SubtitleTrack::new(),
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == ClipStatus::Published
    }

    pub fn video_id(&self) -> Option<&str> {
        self.video_url.as_deref().and_then(youtube::extract_video_id)
    }

    pub fn display_thumbnail(&self) -> String {
        youtube::resolve_thumbnail(self.thumbnail.as_deref(), self.video_url.as_deref())
    }
}

/// Moderation state of a comment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// A visitor comment on a clip. `parent_id` links replies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub clip_id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub author: String,
    #[serde(default)]
    pub email: Option<String>,
    /// 1..=5 stars.
    pub rating: u8,
    pub content: String,
    #[serde(default)]
    pub status: CommentStatus,
    pub created_at: DateTime<Utc>,
}

pub const RATING_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// Subtitles sent in by a visitor for review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleSubmission {
    pub id: String,
    pub youtube_url: String,
    pub srt_content: String,
    #[serde(default)]
    pub submitter_name: Option<String>,
    #[serde(default)]
    pub submitter_email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Rejected,
}

/// Default target language for translation requests.
pub const DEFAULT_LANGUAGE: &str = "pt-BR";

/// A visitor asking for a video to be translated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub id: String,
    pub youtube_url: String,
    #[serde(default)]
    pub requester_name: Option<String>,
    #[serde(default)]
    pub requester_email: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: RequestStatus,
    /// Higher is more urgent.
    #[serde(default)]
    pub priority: i32,
    pub created_at: DateTime<Utc>,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

/// Profile of a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl UserProfile {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Full name when set, otherwise the email.
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_row_deserializes_with_defaults() {
        let json = r#"{
            "id": "c1",
            "title": "Yesterday",
            "artist": "The Beatles",
            "thumbnail_url": null,
            "video_url": "https://youtu.be/dQw4w9WgXcQ",
            "status": "Published",
            "created_at": "2024-03-01T12:00:00Z"
        }"#;
        let clip: Clip = serde_json::from_str(json).unwrap();
        assert!(clip.is_published());
        assert_eq!(clip.views, 0);
        assert!(clip.subtitles.is_empty());
        assert_eq!(clip.video_id(), Some("dQw4w9WgXcQ"));
        assert_eq!(
            clip.display_thumbnail(),
            "https://img.youtube.com/vi/dQw4w9WgXcQ/maxresdefault.jpg"
        );
    }

    #[test]
    fn new_clip_is_draft_with_unique_id() {
        let a = Clip::new("A", "X");
        let b = Clip::new("B", "Y");
        assert_eq!(a.status, ClipStatus::Draft);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn request_wire_names() {
        let json = r#"{
            "id": "r1",
            "youtube_url": "https://youtu.be/dQw4w9WgXcQ",
            "status": "in_progress",
            "created_at": "2024-03-01T12:00:00Z"
        }"#;
        let request: TranslationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.status, RequestStatus::InProgress);
        assert_eq!(request.language, "pt-BR");
        assert_eq!(request.priority, 0);
    }

    #[test]
    fn admin_role() {
        let mut profile = UserProfile {
            id: "u1".into(),
            email: "ana@example.com".into(),
            full_name: None,
            avatar_url: None,
            role: Role::User,
        };
        assert!(!profile.is_admin());
        assert_eq!(profile.display_name(), "ana@example.com");

        profile.role = Role::Admin;
        profile.full_name = Some("Ana".into());
        assert!(profile.is_admin());
        assert_eq!(profile.display_name(), "Ana");
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    }
}
