//! Data access for the catalog.
//!
//! [`CatalogBackend`] is the seam between catalog logic and the hosted
//! database. [`MemoryBackend`] keeps everything in process and is used in
//! demo mode (no backend URL configured) and by tests.

use std::cmp::Reverse;

use chrono::{Duration, Utc};
use parking_lot::RwLock;

use crate::subtitles::{Cue, SubtitleTrack};

use super::error::{CatalogError, CatalogResult};
use super::types::{
    Clip, ClipStatus, Comment, CommentStatus, RequestStatus, SubmissionStatus,
    SubtitleSubmission, TranslationRequest, UserProfile,
};

/// Storage operations used by the catalog.
///
/// List methods return owned snapshots in display order.
pub trait CatalogBackend: Send + Sync {
    /// All clips, newest first.
    fn list_clips(&self) -> CatalogResult<Vec<Clip>>;

    fn get_clip(&self, id: &str) -> CatalogResult<Clip>;

    /// Insert a clip or replace the one with the same id.
    fn save_clip(&self, clip: Clip) -> CatalogResult<Clip>;

    fn set_clip_status(&self, id: &str, status: ClipStatus) -> CatalogResult<()>;

    fn delete_clip(&self, id: &str) -> CatalogResult<()>;

    /// Count one view of a clip.
    fn record_view(&self, id: &str) -> CatalogResult<u64>;

    /// Comments for one clip, or for every clip when `clip_id` is `None`.
    /// Oldest first.
    fn list_comments(&self, clip_id: Option<&str>) -> CatalogResult<Vec<Comment>>;

    fn add_comment(&self, comment: Comment) -> CatalogResult<Comment>;

    fn set_comment_status(&self, id: &str, status: CommentStatus) -> CatalogResult<()>;

    fn delete_comment(&self, id: &str) -> CatalogResult<()>;

    /// Newest first.
    fn list_submissions(&self) -> CatalogResult<Vec<SubtitleSubmission>>;

    fn add_submission(&self, submission: SubtitleSubmission) -> CatalogResult<SubtitleSubmission>;

    fn set_submission_status(&self, id: &str, status: SubmissionStatus) -> CatalogResult<()>;

    fn delete_submission(&self, id: &str) -> CatalogResult<()>;

    /// Highest priority first, then newest first.
    fn list_requests(&self) -> CatalogResult<Vec<TranslationRequest>>;

    fn add_request(&self, request: TranslationRequest) -> CatalogResult<TranslationRequest>;

    fn set_request_status(&self, id: &str, status: RequestStatus) -> CatalogResult<()>;

    fn set_request_priority(&self, id: &str, priority: i32) -> CatalogResult<()>;

    fn delete_request(&self, id: &str) -> CatalogResult<()>;

    fn get_profile(&self, user_id: &str) -> CatalogResult<Option<UserProfile>>;
}

/// Sort requests the way the moderation queue shows them.
pub fn sort_requests(requests: &mut [TranslationRequest]) {
    requests.sort_by_key(|r| (Reverse(r.priority), Reverse(r.created_at)));
}

pub fn sort_submissions(submissions: &mut [SubtitleSubmission]) {
    submissions.sort_by_key(|s| Reverse(s.created_at));
}

#[derive(Debug, Default)]
struct State {
    clips: Vec<Clip>,
    comments: Vec<Comment>,
    submissions: Vec<SubtitleSubmission>,
    requests: Vec<TranslationRequest>,
    profiles: Vec<UserProfile>,
    offline: bool,
}

impl State {
    fn writable(&self) -> CatalogResult<()> {
        if self.offline {
            Err(CatalogError::Backend("backend is offline".to_string()))
        } else {
            Ok(())
        }
    }
}

/// In-process backend.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: RwLock<State>,
}

fn find_mut<'a, T>(
    items: &'a mut [T],
    id: &str,
    kind: &'static str,
    key: impl Fn(&T) -> &str,
) -> CatalogResult<&'a mut T> {
    items
        .iter_mut()
        .find(|item| key(item) == id)
        .ok_or_else(|| CatalogError::not_found(kind, id))
}

fn remove<T>(
    items: &mut Vec<T>,
    id: &str,
    kind: &'static str,
    key: impl Fn(&T) -> &str,
) -> CatalogResult<()> {
    let before = items.len();
    items.retain(|item| key(item) != id);
    if items.len() == before {
        Err(CatalogError::not_found(kind, id))
    } else {
        Ok(())
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-filled with sample clips and comments.
    pub fn demo() -> Self {
        let backend = Self::new();
        {
            let clips = demo_clips();
            let mut state = backend.state.write();
            if let Some(first) = clips.first() {
                state.comments = demo_comments(&first.id);
            }
            state.clips = clips;
        }
        backend
    }

    /// Simulate losing the connection. Writes fail while offline; reads
    /// keep working.
    pub fn set_offline(&self, offline: bool) {
        self.state.write().offline = offline;
    }

    pub fn add_profile(&self, profile: UserProfile) {
        let mut state = self.state.write();
        state.profiles.retain(|p| p.id != profile.id);
        state.profiles.push(profile);
    }
}

impl CatalogBackend for MemoryBackend {
    fn list_clips(&self) -> CatalogResult<Vec<Clip>> {
        let mut clips = self.state.read().clips.clone();
        clips.sort_by_key(|c| Reverse(c.created_at));
        Ok(clips)
    }

    fn get_clip(&self, id: &str) -> CatalogResult<Clip> {
        self.state
            .read()
            .clips
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::not_found("Clip", id))
    }

    fn save_clip(&self, clip: Clip) -> CatalogResult<Clip> {
        let mut state = self.state.write();
        state.writable()?;
        match state.clips.iter().position(|c| c.id == clip.id) {
            Some(i) => state.clips[i] = clip.clone(),
            None => state.clips.push(clip.clone()),
        }
        Ok(clip)
    }

    fn set_clip_status(&self, id: &str, status: ClipStatus) -> CatalogResult<()> {
        let mut state = self.state.write();
        state.writable()?;
        find_mut(&mut state.clips, id, "Clip", |c| c.id.as_str())?.status = status;
        Ok(())
    }

    fn delete_clip(&self, id: &str) -> CatalogResult<()> {
        let mut state = self.state.write();
        state.writable()?;
        remove(&mut state.clips, id, "Clip", |c| c.id.as_str())?;
        state.comments.retain(|c| c.clip_id != id);
        Ok(())
    }

    fn record_view(&self, id: &str) -> CatalogResult<u64> {
        let mut state = self.state.write();
        state.writable()?;
        let clip = find_mut(&mut state.clips, id, "Clip", |c| c.id.as_str())?;
        clip.views = clip.views.saturating_add(1);
        Ok(clip.views)
    }

    fn list_comments(&self, clip_id: Option<&str>) -> CatalogResult<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .state
            .read()
            .comments
            .iter()
            .filter(|c| clip_id.map_or(true, |id| c.clip_id == id))
            .cloned()
            .collect();
        comments.sort_by_key(|c| c.created_at);
        Ok(comments)
    }

    fn add_comment(&self, comment: Comment) -> CatalogResult<Comment> {
        let mut state = self.state.write();
        state.writable()?;
        if !state.clips.iter().any(|c| c.id == comment.clip_id) {
            return Err(CatalogError::not_found("Clip", comment.clip_id));
        }
        state.comments.push(comment.clone());
        Ok(comment)
    }

    fn set_comment_status(&self, id: &str, status: CommentStatus) -> CatalogResult<()> {
        let mut state = self.state.write();
        state.writable()?;
        find_mut(&mut state.comments, id, "Comment", |c| c.id.as_str())?.status = status;
        Ok(())
    }

    fn delete_comment(&self, id: &str) -> CatalogResult<()> {
        let mut state = self.state.write();
        state.writable()?;
        remove(&mut state.comments, id, "Comment", |c| c.id.as_str())
    }

    fn list_submissions(&self) -> CatalogResult<Vec<SubtitleSubmission>> {
        let mut submissions = self.state.read().submissions.clone();
        sort_submissions(&mut submissions);
        Ok(submissions)
    }

    fn add_submission(&self, submission: SubtitleSubmission) -> CatalogResult<SubtitleSubmission> {
        let mut state = self.state.write();
        state.writable()?;
        state.submissions.push(submission.clone());
        Ok(submission)
    }

    fn set_submission_status(&self, id: &str, status: SubmissionStatus) -> CatalogResult<()> {
        let mut state = self.state.write();
        state.writable()?;
        find_mut(&mut state.submissions, id, "Submission", |s| s.id.as_str())?.status = status;
        Ok(())
    }

    fn delete_submission(&self, id: &str) -> CatalogResult<()> {
        let mut state = self.state.write();
        state.writable()?;
        remove(&mut state.submissions, id, "Submission", |s| s.id.as_str())
    }

    fn list_requests(&self) -> CatalogResult<Vec<TranslationRequest>> {
        let mut requests = self.state.read().requests.clone();
        sort_requests(&mut requests);
        Ok(requests)
    }

    fn add_request(&self, request: TranslationRequest) -> CatalogResult<TranslationRequest> {
        let mut state = self.state.write();
        state.writable()?;
        state.requests.push(request.clone());
        Ok(request)
    }

    fn set_request_status(&self, id: &str, status: RequestStatus) -> CatalogResult<()> {
        let mut state = self.state.write();
        state.writable()?;
        find_mut(&mut state.requests, id, "Request", |r| r.id.as_str())?.status = status;
        Ok(())
    }

    fn set_request_priority(&self, id: &str, priority: i32) -> CatalogResult<()> {
        let mut state = self.state.write();
        state.writable()?;
        find_mut(&mut state.requests, id, "Request", |r| r.id.as_str())?.priority = priority;
        Ok(())
    }

    fn delete_request(&self, id: &str) -> CatalogResult<()> {
        let mut state = self.state.write();
        state.writable()?;
        remove(&mut state.requests, id, "Request", |r| r.id.as_str())
    }

    fn get_profile(&self, user_id: &str) -> CatalogResult<Option<UserProfile>> {
        Ok(self
            .state
            .read()
            .profiles
            .iter()
            .find(|p| p.id == user_id)
            .cloned())
    }
}

fn demo_clips() -> Vec<Clip> {
    let now = Utc::now();
    let samples = [
        ("Bohemian Rhapsody", "Queen", 1975, 215_600, true),
        ("Imagine", "John Lennon", 1971, 158_300, false),
        ("Hotel California", "Eagles", 1976, 142_900, false),
        ("Yesterday", "The Beatles", 1965, 98_700, false),
        ("Wonderwall", "Oasis", 1995, 87_400, false),
    ];

    samples
        .into_iter()
        .enumerate()
        .map(|(i, (title, artist, year, views, featured))| {
            let mut clip = Clip::new(title, artist);
            clip.id = format!("demo-{}", i + 1);
            clip.status = ClipStatus::Published;
            clip.views = views;
            clip.release_year = Some(year);
            clip.is_featured = featured;
            clip.created_at = now - Duration::days(i as i64);
            clip.description = format!("{title} by {artist}, with subtitles");
            clip.subtitles = SubtitleTrack::from_cues(vec![
                Cue::with_id("1", 1_000, 4_000, title),
                Cue::with_id("2", 4_000, 7_000, artist),
            ]);
            clip
        })
        .collect()
}

fn demo_comments(clip_id: &str) -> Vec<Comment> {
    let now = Utc::now();
    let comment = |id: &str, parent: Option<&str>, author: &str, rating, content: &str, hours| Comment {
        id: id.to_string(),
        clip_id: clip_id.to_string(),
        parent_id: parent.map(str::to_string),
        author: author.to_string(),
        email: None,
        rating,
        content: content.to_string(),
        status: CommentStatus::Approved,
        created_at: now - Duration::hours(hours),
    };
    vec![
        comment("demo-c1", None, "Ana", 5, "Tradução perfeita!", 5),
        comment("demo-c2", Some("demo-c1"), "Bruno", 4, "Concordo, muito boa.", 2),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request(id: &str, priority: i32, day: u32) -> TranslationRequest {
        TranslationRequest {
            id: id.to_string(),
            youtube_url: "https://youtu.be/dQw4w9WgXcQ".to_string(),
            requester_name: None,
            requester_email: None,
            language: "pt-BR".to_string(),
            message: None,
            status: RequestStatus::Pending,
            priority,
            created_at: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn requests_order_by_priority_then_recency() {
        let backend = MemoryBackend::new();
        backend.add_request(request("old-low", 0, 1)).unwrap();
        backend.add_request(request("new-low", 0, 5)).unwrap();
        backend.add_request(request("old-high", 2, 2)).unwrap();

        let ids: Vec<_> = backend
            .list_requests()
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, ["old-high", "new-low", "old-low"]);
    }

    #[test]
    fn offline_rejects_writes_but_serves_reads() {
        let backend = MemoryBackend::demo();
        backend.set_offline(true);

        assert!(matches!(
            backend.set_clip_status("demo-1", ClipStatus::Draft),
            Err(CatalogError::Backend(_))
        ));
        assert_eq!(backend.list_clips().unwrap().len(), 5);
        assert!(backend.get_clip("demo-1").unwrap().is_published());

        backend.set_offline(false);
        backend.set_clip_status("demo-1", ClipStatus::Draft).unwrap();
        assert!(!backend.get_clip("demo-1").unwrap().is_published());
    }

    #[test]
    fn missing_records_are_not_found() {
        let backend = MemoryBackend::new();
        assert_eq!(
            backend.delete_request("nope"),
            Err(CatalogError::not_found("Request", "nope"))
        );
        assert!(backend.get_clip("nope").is_err());
        assert_eq!(backend.get_profile("nope").unwrap(), None);
    }

    #[test]
    fn deleting_a_clip_drops_its_comments() {
        let backend = MemoryBackend::demo();
        assert_eq!(backend.list_comments(Some("demo-1")).unwrap().len(), 2);

        backend.delete_clip("demo-1").unwrap();
        assert!(backend.list_comments(None).unwrap().is_empty());
    }

    #[test]
    fn comments_require_an_existing_clip() {
        let backend = MemoryBackend::demo();
        let mut comment = backend.list_comments(None).unwrap().remove(0);
        comment.id = "new".into();
        comment.clip_id = "missing".into();
        assert!(matches!(
            backend.add_comment(comment),
            Err(CatalogError::NotFound { kind: "Clip", .. })
        ));
    }

    #[test]
    fn views_accumulate() {
        let backend = MemoryBackend::demo();
        let before = backend.get_clip("demo-2").unwrap().views;
        assert_eq!(backend.record_view("demo-2").unwrap(), before + 1);
    }
}
