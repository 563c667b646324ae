//! Admin dashboard figures.

use std::cmp::Reverse;

use serde::Serialize;

use super::comments::average_rating;
use super::types::{
    Clip, Comment, CommentStatus, RequestStatus, SubmissionStatus, SubtitleSubmission,
    TranslationRequest,
};

/// How many clips the "most viewed" panel lists.
pub const TOP_CLIPS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopularClip {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub views: u64,
}

/// Summary shown on the admin landing page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardMetrics {
    pub total_clips: usize,
    pub published_clips: usize,
    pub draft_clips: usize,
    pub total_views: u64,
    pub total_comments: usize,
    pub pending_comments: usize,
    pub average_rating: Option<f64>,
    pub pending_submissions: usize,
    pub open_requests: usize,
    pub top_clips: Vec<PopularClip>,
}

impl DashboardMetrics {
    pub fn compute(
        clips: &[Clip],
        comments: &[Comment],
        submissions: &[SubtitleSubmission],
        requests: &[TranslationRequest],
    ) -> Self {
        let published_clips = clips.iter().filter(|c| c.is_published()).count();

        let mut by_views: Vec<&Clip> = clips.iter().collect();
        by_views.sort_by_key(|c| Reverse(c.views));
        let top_clips = by_views
            .into_iter()
            .take(TOP_CLIPS)
            .map(|c| PopularClip {
                id: c.id.clone(),
                title: c.title.clone(),
                artist: c.artist.clone(),
                views: c.views,
            })
            .collect();

        Self {
            total_clips: clips.len(),
            published_clips,
            draft_clips: clips.len() - published_clips,
            total_views: clips.iter().map(|c| c.views).sum(),
            total_comments: comments.len(),
            pending_comments: comments
                .iter()
                .filter(|c| c.status == CommentStatus::Pending)
                .count(),
            average_rating: average_rating(comments),
            pending_submissions: submissions
                .iter()
                .filter(|s| s.status == SubmissionStatus::Pending)
                .count(),
            open_requests: requests
                .iter()
                .filter(|r| matches!(r.status, RequestStatus::Pending | RequestStatus::InProgress))
                .count(),
            top_clips,
        }
    }
}

/// Compact view count: `950`, `215.6k`, `1.2M`.
pub fn format_views(views: u64) -> String {
    match views {
        0..=999 => views.to_string(),
        1_000..=999_999 => compact(views as f64 / 1_000.0, "k"),
        _ => compact(views as f64 / 1_000_000.0, "M"),
    }
}

fn compact(value: f64, suffix: &str) -> String {
    let text = format!("{value:.1}");
    let text = text.strip_suffix(".0").unwrap_or(&text);
    format!("{text}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::backend::{CatalogBackend, MemoryBackend};

    #[test]
    fn view_formatting() {
        assert_eq!(format_views(0), "0");
        assert_eq!(format_views(950), "950");
        assert_eq!(format_views(1_000), "1k");
        assert_eq!(format_views(215_600), "215.6k");
        assert_eq!(format_views(1_260_000), "1.3M");
        assert_eq!(format_views(3_000_000), "3M");
    }

    #[test]
    fn metrics_from_demo_catalog() {
        let backend = MemoryBackend::demo();
        let mut clips = backend.list_clips().unwrap();
        clips[0].status = crate::catalog::types::ClipStatus::Draft;
        let comments = backend.list_comments(None).unwrap();

        let metrics = DashboardMetrics::compute(&clips, &comments, &[], &[]);
        assert_eq!(metrics.total_clips, 5);
        assert_eq!(metrics.published_clips, 4);
        assert_eq!(metrics.draft_clips, 1);
        assert_eq!(metrics.total_views, 215_600 + 158_300 + 142_900 + 98_700 + 87_400);
        assert_eq!(metrics.total_comments, 2);
        assert_eq!(metrics.average_rating, Some(4.5));
        assert_eq!(metrics.top_clips.len(), TOP_CLIPS);
        assert_eq!(metrics.top_clips[0].title, "Bohemian Rhapsody");
    }

    #[test]
    fn empty_catalog() {
        let metrics = DashboardMetrics::compute(&[], &[], &[], &[]);
        assert_eq!(metrics, DashboardMetrics::default());
    }
}
