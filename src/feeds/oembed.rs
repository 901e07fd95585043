//! Title lookup for YouTube links through the public oEmbed endpoint.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;
use ureq::Agent;

const OEMBED_URL: &str = "https://www.youtube.com/oembed";

pub fn is_youtube_url(url: &str) -> bool {
    let url = url.to_lowercase();
    url.contains("youtube.com") || url.contains("youtu.be")
}

#[derive(Deserialize)]
struct OembedReply {
    #[serde(default)]
    title: Option<String>,
}

pub(crate) fn parse_oembed_title(body: &str) -> Option<String> {
    let reply: OembedReply = serde_json::from_str(body).ok()?;
    reply
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Resolves titles for items that arrive without one. Answers, misses
/// included, are cached per URL for the life of the feed.
pub struct TitleLookup {
    agent: Agent,
    cache: Mutex<HashMap<String, Option<String>>>,
}

impl TitleLookup {
    pub fn new(timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self {
            agent,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// `None` for non-YouTube links and for any failed lookup.
    pub fn title(&self, url: &str) -> Option<String> {
        if !is_youtube_url(url) {
            return None;
        }
        if let Some(hit) = self.cache.lock().ok().and_then(|c| c.get(url).cloned()) {
            return hit;
        }

        let title = self.fetch(url);
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(url.to_string(), title.clone());
        }
        title
    }

    fn fetch(&self, url: &str) -> Option<String> {
        let reply = self
            .agent
            .get(OEMBED_URL)
            .query("url", url)
            .query("format", "json")
            .call();
        let mut response = match reply {
            Ok(r) => r,
            Err(e) => {
                debug!("oembed lookup failed for {url}: {e}");
                return None;
            }
        };
        let body = response.body_mut().read_to_string().ok()?;
        parse_oembed_title(&body)
    }
}
