//! Validation of forms submitted by visitors.

use chrono::Utc;
use serde::Deserialize;

use crate::subtitles::parse_srt_report;

use super::error::{CatalogError, CatalogResult};
use super::types::{
    Comment, CommentStatus, RequestStatus, SubmissionStatus, SubtitleSubmission,
    TranslationRequest, DEFAULT_LANGUAGE, RATING_RANGE,
};
use super::youtube::extract_video_id;

/// Fields of the "request a translation" form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestForm {
    pub youtube_url: String,
    pub requester_name: Option<String>,
    pub requester_email: Option<String>,
    pub language: Option<String>,
    pub message: Option<String>,
}

/// Fields of the "send subtitles" form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionForm {
    pub youtube_url: String,
    pub srt_content: String,
    pub submitter_name: Option<String>,
    pub submitter_email: Option<String>,
    pub message: Option<String>,
}

/// Fields of the comment box under a clip.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentForm {
    pub clip_id: String,
    /// Set when replying to another comment.
    pub parent_id: Option<String>,
    pub author: String,
    pub email: Option<String>,
    pub rating: u8,
    pub content: String,
}

fn video_url(raw: &str) -> CatalogResult<String> {
    let url = raw.trim();
    if url.is_empty() {
        return Err(CatalogError::validation("youtube_url", "a YouTube link is required"));
    }
    if extract_video_id(url).is_none() {
        return Err(CatalogError::validation(
            "youtube_url",
            format!("'{url}' is not a YouTube video link"),
        ));
    }
    Ok(url.to_string())
}

/// Trim, dropping blank values.
fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn email(value: Option<String>) -> CatalogResult<Option<String>> {
    match optional(value) {
        Some(addr) => {
            let valid = addr
                .split_once('@')
                .is_some_and(|(user, domain)| !user.is_empty() && domain.contains('.'));
            if valid {
                Ok(Some(addr))
            } else {
                Err(CatalogError::validation("email", format!("'{addr}' is not an email address")))
            }
        }
        None => Ok(None),
    }
}

impl TranslationRequest {
    /// Validate a form into a new pending request with priority 0.
    pub fn new(form: RequestForm) -> CatalogResult<Self> {
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            youtube_url: video_url(&form.youtube_url)?,
            requester_name: optional(form.requester_name),
            requester_email: email(form.requester_email)?,
            language: optional(form.language).unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            message: optional(form.message),
            status: RequestStatus::Pending,
            priority: 0,
            created_at: Utc::now(),
        })
    }
}

impl SubtitleSubmission {
    /// Validate a form into a new pending submission.
    ///
    /// The SRT text must contain at least one readable cue.
    pub fn new(form: SubmissionForm) -> CatalogResult<Self> {
        let youtube_url = video_url(&form.youtube_url)?;

        let parsed = parse_srt_report(&form.srt_content);
        if parsed.track.is_empty() {
            return Err(CatalogError::validation(
                "srt_content",
                "no subtitle lines could be read",
            ));
        }
        if !parsed.skipped.is_empty() {
            tracing::debug!(
                "[Intake] Submission accepted with {} unreadable block(s)",
                parsed.skipped.len()
            );
        }

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            youtube_url,
            srt_content: form.srt_content,
            submitter_name: optional(form.submitter_name),
            submitter_email: email(form.submitter_email)?,
            message: optional(form.message),
            status: SubmissionStatus::Pending,
            created_at: Utc::now(),
        })
    }
}

impl Comment {
    /// Validate a form into a comment awaiting moderation.
    pub fn new(form: CommentForm) -> CatalogResult<Self> {
        let author = form.author.trim();
        if author.is_empty() {
            return Err(CatalogError::validation("author", "a name is required"));
        }
        let content = form.content.trim();
        if content.is_empty() {
            return Err(CatalogError::validation("content", "the comment is empty"));
        }
        if !RATING_RANGE.contains(&form.rating) {
            return Err(CatalogError::validation(
                "rating",
                format!("must be between 1 and 5, got {}", form.rating),
            ));
        }

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            clip_id: form.clip_id,
            parent_id: optional(form.parent_id),
            author: author.to_string(),
            email: email(form.email)?,
            rating: form.rating,
            content: content.to_string(),
            status: CommentStatus::Pending,
            created_at: Utc::now(),
        })
    }
}
