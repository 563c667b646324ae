//! Public browsing: library filters, artist index, home feed.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::types::Clip;

/// Library sort order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Newest first.
    #[default]
    Recent,
    /// Most viewed first.
    Popular,
    /// Alphabetical by title.
    Title,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortOrder::Recent => "recent",
            SortOrder::Popular => "popular",
            SortOrder::Title => "title",
        };
        write!(f, "{name}")
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "recent" => Ok(SortOrder::Recent),
            "popular" => Ok(SortOrder::Popular),
            "title" => Ok(SortOrder::Title),
            other => Err(format!("unknown sort order '{other}'")),
        }
    }
}

/// Filters applied to the published library.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryQuery {
    /// Free text matched against title, artist and description. A
    /// four-digit query also matches the release year.
    pub search: Option<String>,
    /// Exact artist name.
    pub artist: Option<String>,
    pub sort: SortOrder,
}

impl LibraryQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// Whether a clip passes the filters. Drafts never match.
    pub fn matches(&self, clip: &Clip) -> bool {
        if !clip.is_published() {
            return false;
        }
        if let Some(artist) = self.artist.as_deref().filter(|a| !a.is_empty()) {
            if clip.artist != artist {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(text) => text_matches(clip, text),
            None => true,
        }
    }

    /// Filter and sort `clips`.
    pub fn apply(&self, clips: &[Clip]) -> Vec<Clip> {
        let mut result: Vec<Clip> = clips.iter().filter(|c| self.matches(c)).cloned().collect();
        sort_clips(&mut result, self.sort);
        result
    }
}

fn text_matches(clip: &Clip, text: &str) -> bool {
    let needle = text.to_lowercase();
    let found = [&clip.title, &clip.artist, &clip.description]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle));
    if found {
        return true;
    }
    year_query(text).is_some_and(|year| clip.release_year == Some(year))
}

fn year_query(text: &str) -> Option<i32> {
    if text.len() == 4 && text.bytes().all(|b| b.is_ascii_digit()) {
        text.parse().ok()
    } else {
        None
    }
}

pub fn sort_clips(clips: &mut [Clip], order: SortOrder) {
    match order {
        SortOrder::Recent => clips.sort_by_key(|c| Reverse(c.created_at)),
        SortOrder::Popular => clips.sort_by_key(|c| Reverse(c.views)),
        SortOrder::Title => clips.sort_by_cached_key(|c| c.title.to_lowercase()),
    }
}

/// One entry of the artist filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistEntry {
    pub name: String,
    pub clip_count: usize,
}

/// Artists with at least one published clip, alphabetically.
pub fn artist_index(clips: &[Clip]) -> Vec<ArtistEntry> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for clip in clips.iter().filter(|c| c.is_published()) {
        *counts.entry(clip.artist.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(name, clip_count)| ArtistEntry {
            name: name.to_string(),
            clip_count,
        })
        .collect()
}

/// Landing page content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeFeed {
    pub featured: Option<Clip>,
    pub recent: Vec<Clip>,
}

/// Build the home feed from published clips.
///
/// The featured slot takes the newest clip flagged as featured, falling
/// back to the most viewed one. `recent` excludes the featured clip.
pub fn home_feed(clips: &[Clip], limit: usize) -> HomeFeed {
    let mut published: Vec<&Clip> = clips.iter().filter(|c| c.is_published()).collect();
    published.sort_by_key(|c| Reverse(c.created_at));

    let featured = published
        .iter()
        .find(|c| c.is_featured)
        .or_else(|| published.iter().max_by_key(|c| c.views))
        .map(|c| (*c).clone());

    let recent = published
        .into_iter()
        .filter(|c| featured.as_ref().map_or(true, |f| f.id != c.id))
        .take(limit)
        .cloned()
        .collect();

    HomeFeed { featured, recent }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::types::ClipStatus;
    use chrono::{TimeZone, Utc};

    fn clip(id: &str, title: &str, artist: &str, views: u64, day: u32) -> Clip {
        let mut clip = Clip::new(title, artist);
        clip.id = id.to_string();
        clip.status = ClipStatus::Published;
        clip.views = views;
        clip.created_at = Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap();
        clip
    }

    fn library() -> Vec<Clip> {
        let mut draft = clip("d", "Unreleased", "Queen", 1_000_000, 9);
        draft.status = ClipStatus::Draft;
        let mut imagine = clip("b", "imagine", "John Lennon", 500, 2);
        imagine.release_year = Some(1971);
        imagine.description = "Piano ballad".into();
        vec![
            clip("a", "Bohemian Rhapsody", "Queen", 900, 1),
            imagine,
            clip("c", "Hotel California", "Eagles", 700, 3),
            draft,
        ]
    }

    fn ids(clips: &[Clip]) -> Vec<&str> {
        clips.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn sorts_published_clips() {
        let clips = library();
        assert_eq!(ids(&LibraryQuery::new().apply(&clips)), ["c", "b", "a"]);
        assert_eq!(
            ids(&LibraryQuery::new().sort(SortOrder::Popular).apply(&clips)),
            ["a", "c", "b"]
        );
        assert_eq!(
            ids(&LibraryQuery::new().sort(SortOrder::Title).apply(&clips)),
            ["a", "c", "b"]
        );
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let clips = library();
        assert_eq!(ids(&LibraryQuery::new().search("QUEEN").apply(&clips)), ["a"]);
        assert_eq!(ids(&LibraryQuery::new().search("piano").apply(&clips)), ["b"]);
        assert_eq!(ids(&LibraryQuery::new().search("1971").apply(&clips)), ["b"]);
        assert_eq!(LibraryQuery::new().search("   ").apply(&clips).len(), 3);
        assert!(LibraryQuery::new().search("unreleased").apply(&clips).is_empty());
    }

    #[test]
    fn artist_filter_combines_with_search() {
        let clips = library();
        let query = LibraryQuery::new().artist("Eagles").search("hotel");
        assert_eq!(ids(&query.apply(&clips)), ["c"]);
        assert!(LibraryQuery::new().artist("Eagles").search("queen").apply(&clips).is_empty());
    }

    #[test]
    fn artist_index_counts_published_only() {
        let mut clips = library();
        clips.push(clip("e", "We Will Rock You", "Queen", 10, 4));
        let index = artist_index(&clips);
        assert_eq!(
            index,
            vec![
                ArtistEntry { name: "Eagles".into(), clip_count: 1 },
                ArtistEntry { name: "John Lennon".into(), clip_count: 1 },
                ArtistEntry { name: "Queen".into(), clip_count: 2 },
            ]
        );
    }

    #[test]
    fn home_feed_prefers_featured_flag() {
        let mut clips = library();
        clips[1].is_featured = true;
        let feed = home_feed(&clips, 10);
        assert_eq!(feed.featured.as_ref().map(|c| c.id.as_str()), Some("b"));
        assert_eq!(ids(&feed.recent), ["c", "a"]);
    }

    #[test]
    fn home_feed_falls_back_to_most_viewed() {
        let feed = home_feed(&library(), 1);
        assert_eq!(feed.featured.as_ref().map(|c| c.id.as_str()), Some("a"));
        assert_eq!(ids(&feed.recent), ["c"]);
        assert_eq!(home_feed(&[], 5), HomeFeed { featured: None, recent: vec![] });
    }

    #[test]
    fn sort_order_parses() {
        assert_eq!("Popular".parse::<SortOrder>(), Ok(SortOrder::Popular));
        assert!("views".parse::<SortOrder>().is_err());
        assert_eq!(SortOrder::Title.to_string(), "title");
    }
}
