//! Generic JSON-over-HTTP feed.
//!
//! The endpoint is asked for items newer than the cursor and answers with
//! `{"items": [{"id", "created_at", "url", "title"}, ...]}`. `created_at` is
//! either epoch seconds or a date string (RFC 3339, or `YYYY-MM-DD HH:MM:SS`
//! taken as UTC).
//!
//! Items without a title get one from YouTube's oEmbed endpoint when the
//! feed has a `TitleLookup`, else `Track`.

use std::time::Duration;

use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use ureq::Agent;

use crate::config::CursorKind;

use super::oembed::TitleLookup;
use super::types::{Cursor, FeedError, FeedItem, FeedSource, now_secs};

const DEFAULT_TITLE: &str = "Track";

pub struct HttpFeed {
    name: String,
    url: String,
    kind: CursorKind,
    agent: Agent,
    titles: Option<TitleLookup>,
}

impl HttpFeed {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        kind: CursorKind,
        timeout: Duration,
    ) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self {
            name: name.into(),
            url: url.into(),
            kind,
            agent,
            titles: None,
        }
    }

    pub fn with_title_lookup(mut self, lookup: TitleLookup) -> Self {
        self.titles = Some(lookup);
        self
    }
}

impl FeedSource for HttpFeed {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_new(&self, token: &str, cursor: Option<Cursor>) -> Result<Vec<FeedItem>, FeedError> {
        let mut request = self
            .agent
            .get(&self.url)
            .header("Accept", "application/json")
            .header("Authorization", format!("Bearer {token}"));
        if let Some(c) = cursor {
            request = request.query("since", c.as_query());
        }

        let mut response = request.call()?;
        let body = response.body_mut().read_to_string()?;
        let resolve = |url: &str| self.titles.as_ref().and_then(|t| t.title(url));
        parse_page(&body, self.kind, cursor, now_secs(), &resolve)
    }
}

#[derive(Deserialize)]
struct FeedPage {
    #[serde(default)]
    items: Vec<RawItem>,
}

#[derive(Deserialize)]
struct RawItem {
    #[serde(default)]
    id: Option<RawId>,
    #[serde(default)]
    created_at: Option<Stamp>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Num(u64),
    Text(String),
}

impl RawId {
    fn as_text(&self) -> String {
        match self {
            RawId::Num(n) => n.to_string(),
            RawId::Text(s) => s.trim().to_string(),
        }
    }

    fn as_number(&self) -> Option<u64> {
        match self {
            RawId::Num(n) => Some(*n),
            RawId::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Stamp {
    Secs(f64),
    Text(String),
}

fn parse_stamp(stamp: &Stamp) -> Option<f64> {
    match stamp {
        Stamp::Secs(s) => Some(*s),
        Stamp::Text(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.timestamp_millis() as f64 / 1000.0);
            }
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.and_utc().timestamp_millis() as f64 / 1000.0)
        }
    }
}

/// Turn a response body into items strictly past `cursor`, oldest first.
///
/// Items without a URL are dropped. Id-cursored feeds drop items without a
/// numeric id; timestamp-cursored feeds drop items without a timestamp.
/// `resolve_title` is only asked about items that carry no title.
pub(crate) fn parse_page(
    body: &str,
    kind: CursorKind,
    cursor: Option<Cursor>,
    now: f64,
    resolve_title: &dyn Fn(&str) -> Option<String>,
) -> Result<Vec<FeedItem>, FeedError> {
    let page: FeedPage =
        serde_json::from_str(body).map_err(|e| FeedError::Parse(e.to_string()))?;

    let mut out = Vec::new();
    for raw in page.items {
        let Some(url) = raw.url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) else {
            continue;
        };
        let stamp = raw.created_at.as_ref().and_then(parse_stamp);

        let item_cursor = match kind {
            CursorKind::Id => match raw.id.as_ref().and_then(RawId::as_number) {
                Some(id) => Cursor::Id(id),
                None => continue,
            },
            CursorKind::Timestamp => match stamp {
                Some(ts) => Cursor::Timestamp(ts),
                None => continue,
            },
        };
        if cursor.is_some_and(|c| !item_cursor.is_after(&c)) {
            continue;
        }

        let title = raw
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .or_else(|| resolve_title(&url))
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        out.push(FeedItem {
            native_id: raw.id.as_ref().map(RawId::as_text),
            cursor: item_cursor,
            created_at: stamp.unwrap_or(now),
            url,
            title,
        });
    }

    out.sort_by(|a, b| a.created_at.total_cmp(&b.created_at));
    Ok(out)
}
