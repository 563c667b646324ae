//! YouTube URL helpers.

use once_cell::sync::Lazy;
use regex::Regex;

/// Shown when a clip has neither a thumbnail nor a recognizable video URL.
pub const PLACEHOLDER_THUMBNAIL: &str = "https://via.placeholder.com/640x360?text=Sem+Thumbnail";

static VIDEO_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:youtube\.com/(?:[^/]+/.+/|(?:v|e(?:mbed)?)/|.*[?&]v=)|youtu\.be/)([^"&?/\s]{11})"#)
        .expect("video id pattern is valid")
});

/// Extract the 11-character video id from a watch, short, or embed URL.
///
/// ```
/// use subclip_core::catalog::youtube::extract_video_id;
///
/// assert_eq!(extract_video_id("https://youtu.be/dQw4w9WgXcQ"), Some("dQw4w9WgXcQ"));
/// assert_eq!(extract_video_id("https://example.com/watch"), None);
/// ```
pub fn extract_video_id(url: &str) -> Option<&str> {
    VIDEO_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// High resolution thumbnail URL for a video id.
pub fn thumbnail_url(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{video_id}/maxresdefault.jpg")
}

/// Player embed URL for a video id.
pub fn embed_url(video_id: &str) -> String {
    format!("https://www.youtube.com/embed/{video_id}")
}

/// Thumbnail to display: an explicit image, then the video's own
/// thumbnail, then the placeholder.
pub fn resolve_thumbnail(explicit: Option<&str>, video_url: Option<&str>) -> String {
    if let Some(url) = explicit.map(str::trim).filter(|u| !u.is_empty()) {
        return url.to_string();
    }
    video_url
        .and_then(extract_video_id)
        .map(thumbnail_url)
        .unwrap_or_else(|| PLACEHOLDER_THUMBNAIL.to_string())
}
