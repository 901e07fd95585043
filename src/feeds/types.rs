use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::queue::Track;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Http(#[from] ureq::Error),

    #[error("unreadable response: {0}")]
    Parse(String),
}

/// Per-feed watermark. A feed uses one kind for its whole life.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cursor {
    /// Last seen native numeric id.
    Id(u64),
    /// Last seen creation time, seconds since the epoch.
    Timestamp(f64),
}

impl Cursor {
    /// The larger of `current` and `seen`. A change of kind adopts `seen`.
    pub fn advance(current: Option<Cursor>, seen: Cursor) -> Cursor {
        match (current, seen) {
            (Some(Cursor::Id(a)), Cursor::Id(b)) => Cursor::Id(a.max(b)),
            (Some(Cursor::Timestamp(a)), Cursor::Timestamp(b)) => Cursor::Timestamp(a.max(b)),
            _ => seen,
        }
    }

    /// Whether `self` lies strictly past `watermark`.
    pub fn is_after(&self, watermark: &Cursor) -> bool {
        match (self, watermark) {
            (Cursor::Id(a), Cursor::Id(b)) => a > b,
            (Cursor::Timestamp(a), Cursor::Timestamp(b)) => a > b,
            _ => true,
        }
    }

    pub fn as_query(&self) -> String {
        match self {
            Cursor::Id(id) => id.to_string(),
            Cursor::Timestamp(ts) => format!("{ts:.3}"),
        }
    }
}

/// Persisted cursor document, one per feed.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorState {
    pub cursor: Option<Cursor>,
}

/// Store key holding `feed`'s cursor.
pub fn cursor_key(feed: &str) -> String {
    let safe: String = feed
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("cursor_{safe}")
}

/// One media request as reported by a feed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedItem {
    pub native_id: Option<String>,
    pub cursor: Cursor,
    pub created_at: f64,
    pub url: String,
    pub title: String,
}

impl FeedItem {
    /// Build the queue candidate. The id only depends on the feed and the
    /// item, so re-polling the same item yields the same id.
    pub fn into_track(self, feed: &str) -> Track {
        let native = self
            .native_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("{:.3}", self.created_at));
        Track::new(
            format!("{feed}:{native}"),
            feed,
            self.created_at,
            self.url,
            self.title,
        )
    }
}

/// A donation/notification feed.
///
/// Implementations hold no cursor state: the poller passes the watermark in
/// and advances it from the returned items.
pub trait FeedSource: Send + Sync {
    fn name(&self) -> &str;

    fn fetch_new(&self, token: &str, cursor: Option<Cursor>) -> Result<Vec<FeedItem>, FeedError>;
}

pub fn now_secs() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}
