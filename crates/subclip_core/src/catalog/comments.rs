//! Comment threads and rating summaries.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::types::{Comment, CommentStatus, RATING_RANGE};

/// A comment and its replies, oldest first at every level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentThread {
    pub comment: Comment,
    pub replies: Vec<CommentThread>,
}

impl CommentThread {
    /// Number of comments in this thread, including the root.
    pub fn comment_count(&self) -> usize {
        1 + self.replies.iter().map(CommentThread::comment_count).sum::<usize>()
    }
}

/// Build reply trees from a flat list.
///
/// Comments whose parent is missing from `comments` become roots. So do
/// comments caught in a parent cycle, so nothing is ever dropped.
pub fn build_threads(comments: &[Comment]) -> Vec<CommentThread> {
    let mut ordered: Vec<&Comment> = comments.iter().collect();
    ordered.sort_by_key(|c| c.created_at);

    let known: HashSet<&str> = ordered.iter().map(|c| c.id.as_str()).collect();
    let mut children: HashMap<&str, Vec<&Comment>> = HashMap::new();
    let mut roots = Vec::new();
    for comment in &ordered {
        match comment.parent_id.as_deref() {
            Some(parent) if parent != comment.id && known.contains(parent) => {
                children.entry(parent).or_default().push(*comment)
            }
            _ => roots.push(*comment),
        }
    }

    let mut placed = HashSet::new();
    let mut threads: Vec<CommentThread> = roots
        .into_iter()
        .filter_map(|root| attach(root, &children, &mut placed))
        .collect();

    // Whatever is left only reaches itself through its parents.
    for comment in &ordered {
        if !placed.contains(comment.id.as_str()) {
            if let Some(thread) = attach(*comment, &children, &mut placed) {
                threads.push(thread);
            }
        }
    }
    threads.sort_by_key(|t| t.comment.created_at);
    threads
}

/// Deepest reply level kept as its own nesting. Replies below it are
/// listed flat under the comment at this level.
pub const MAX_REPLY_DEPTH: usize = 32;

struct Frame<'a> {
    comment: &'a Comment,
    /// Replies still to visit, next one last.
    pending: Vec<&'a Comment>,
    replies: Vec<CommentThread>,
}

impl<'a> Frame<'a> {
    fn new(comment: &'a Comment, children: &HashMap<&str, Vec<&'a Comment>>) -> Self {
        Self {
            comment,
            pending: kids_of(comment, children),
            replies: Vec::new(),
        }
    }
}

fn kids_of<'a>(comment: &Comment, children: &HashMap<&str, Vec<&'a Comment>>) -> Vec<&'a Comment> {
    children
        .get(comment.id.as_str())
        .map(|kids| kids.iter().rev().copied().collect())
        .unwrap_or_default()
}

/// Build the thread under `root` with an explicit stack.
fn attach<'a>(
    root: &'a Comment,
    children: &HashMap<&str, Vec<&'a Comment>>,
    placed: &mut HashSet<&'a str>,
) -> Option<CommentThread> {
    if !placed.insert(root.id.as_str()) {
        return None;
    }
    let mut stack = vec![Frame::new(root, children)];

    loop {
        let depth = stack.len() - 1;
        let top = stack.last_mut()?;
        match top.pending.pop() {
            Some(kid) if !placed.insert(kid.id.as_str()) => {}
            Some(kid) if depth >= MAX_REPLY_DEPTH => {
                top.pending.extend(kids_of(kid, children));
                top.replies.push(CommentThread {
                    comment: kid.clone(),
                    replies: Vec::new(),
                });
            }
            Some(kid) => stack.push(Frame::new(kid, children)),
            None => {
                let mut done = stack.pop()?;
                done.replies.sort_by_key(|t| t.comment.created_at);
                let thread = CommentThread {
                    comment: done.comment.clone(),
                    replies: done.replies,
                };
                match stack.last_mut() {
                    Some(parent) => parent.replies.push(thread),
                    None => return Some(thread),
                }
            }
        }
    }
}

/// Approved comments only, as shown to visitors.
pub fn visible_threads(comments: &[Comment]) -> Vec<CommentThread> {
    let approved: Vec<Comment> = comments
        .iter()
        .filter(|c| c.status == CommentStatus::Approved)
        .cloned()
        .collect();
    build_threads(&approved)
}

/// Mean of valid ratings, `None` when there are none.
pub fn average_rating(comments: &[Comment]) -> Option<f64> {
    let ratings: Vec<u8> = comments
        .iter()
        .map(|c| c.rating)
        .filter(|r| RATING_RANGE.contains(r))
        .collect();
    if ratings.is_empty() {
        return None;
    }
    let total: u32 = ratings.iter().map(|&r| u32::from(r)).sum();
    Some(f64::from(total) / ratings.len() as f64)
}

/// Relative age label in Portuguese, such as "3 horas atrás".
pub fn time_ago(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    const UNITS: [(i64, &str, &str); 5] = [
        (365 * 24 * 3600, "ano", "anos"),
        (30 * 24 * 3600, "mês", "meses"),
        (24 * 3600, "dia", "dias"),
        (3600, "hora", "horas"),
        (60, "minuto", "minutos"),
    ];

    let secs = (now - created_at).num_seconds();
    for (size, one, many) in UNITS {
        let count = secs / size;
        if count >= 1 {
            let name = if count == 1 { one } else { many };
            return format!("{count} {name} atrás");
        }
    }
    "agora mesmo".to_string()
}
