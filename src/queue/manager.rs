//! Ordered track queue with duplicate suppression and soft capacity.

use std::fs;
use std::io;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::store::{PersistenceError, Store};

use super::model::Track;

/// Store key of the persisted queue document.
pub const QUEUE_KEY: &str = "queue";

pub const DEFAULT_QUEUE_LIMIT: usize = 50;
pub const DEFAULT_DEDUP_WINDOW_SECS: f64 = 2.0;

// Entries are kept as raw values so one bad entry does not reject the rest.
#[derive(Default, Deserialize)]
struct StoredQueue {
    #[serde(default)]
    tracks: Vec<serde_json::Value>,
    #[serde(default)]
    current_track_id: Option<String>,
}

#[derive(Serialize)]
struct StoredQueueRef<'a> {
    tracks: &'a [Track],
    current_track_id: Option<&'a str>,
}

/// Tracks sorted ascending by `created_at`, plus the current pointer.
///
/// `current_id` is `None` only while the queue is empty. Capacity is soft:
/// trimming never evicts the current track or one that is playing/paused,
/// so the queue may stay above `limit` when only protected tracks remain.
#[derive(Debug)]
pub struct TrackQueue {
    tracks: Vec<Track>,
    current_id: Option<String>,
    limit: usize,
    dedup_window: f64,
}

impl Default for TrackQueue {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_LIMIT, DEFAULT_DEDUP_WINDOW_SECS)
    }
}

impl TrackQueue {
    pub fn new(limit: usize, dedup_window_secs: f64) -> Self {
        Self {
            tracks: Vec::new(),
            current_id: None,
            limit,
            dedup_window: dedup_window_secs,
        }
    }

    /// Restore the queue from `store`. A missing or unreadable document gives
    /// an empty queue; malformed or repeated entries are dropped one by one.
    pub fn load(store: &Store, limit: usize, dedup_window_secs: f64) -> Self {
        let stored: StoredQueue = store.load_or_default(QUEUE_KEY);
        let mut queue = Self::new(limit, dedup_window_secs);

        for raw in stored.tracks {
            match serde_json::from_value::<Track>(raw) {
                Ok(track) if queue.get(&track.id).is_none() => queue.tracks.push(track),
                Ok(track) => debug!("dropping repeated queue entry {}", track.id),
                Err(e) => debug!("dropping malformed queue entry: {e}"),
            }
        }

        queue.current_id = stored.current_track_id;
        queue.sort();
        queue.ensure_current();
        queue
    }

    pub fn save(&self, store: &Store) -> Result<(), PersistenceError> {
        store.save(
            QUEUE_KEY,
            &StoredQueueRef {
                tracks: &self.tracks,
                current_track_id: self.current_id.as_deref(),
            },
        )
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn tracks_mut(&mut self) -> impl Iterator<Item = &mut Track> {
        self.tracks.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current_id.as_deref()
    }

    pub fn current(&self) -> Option<&Track> {
        self.current_id.as_deref().and_then(|id| self.get(id))
    }

    pub fn current_mut(&mut self) -> Option<&mut Track> {
        let id = self.current_id.clone()?;
        self.get_mut(&id)
    }

    pub fn get(&self, id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.id == id)
    }

    /// Point at `id`; unknown ids fall back to the oldest track.
    pub fn set_current(&mut self, id: Option<&str>) {
        self.current_id = id.map(str::to_string);
        self.ensure_current();
    }

    /// Insert `track` unless it repeats an existing id, or repeats an existing
    /// URL within the dedup window (two feeds reporting the same link).
    pub fn append_if_new(&mut self, track: Track) -> bool {
        if self.get(&track.id).is_some() {
            return false;
        }
        let near_duplicate = self.tracks.iter().any(|t| {
            t.url == track.url && (t.created_at - track.created_at).abs() <= self.dedup_window
        });
        if near_duplicate {
            return false;
        }

        self.tracks.push(track);
        self.sort();
        self.trim();
        self.ensure_current();
        true
    }

    /// Repair a dangling or missing current pointer.
    pub fn ensure_current(&mut self) {
        if let Some(id) = self.current_id.as_deref() {
            if self.get(id).is_some() {
                return;
            }
        }
        self.current_id = self.tracks.first().map(|t| t.id.clone());
    }

    /// Evict oldest unprotected tracks until within `limit`, deleting their
    /// artifacts. Stops early when every remaining track is protected.
    pub fn trim(&mut self) {
        while self.tracks.len() > self.limit {
            let current = self.current_id.as_deref();
            let Some(idx) = self
                .tracks
                .iter()
                .position(|t| Some(t.id.as_str()) != current && !t.status.is_active())
            else {
                break;
            };
            let victim = self.tracks.remove(idx);
            debug!("evicting {} to stay within {} tracks", victim.id, self.limit);
            remove_artifact(&victim);
        }
    }

    pub fn index_of_current(&self) -> Option<usize> {
        let id = self.current_id.as_deref()?;
        self.tracks.iter().position(|t| t.id == id)
    }

    pub fn next_id(&self) -> Option<&str> {
        let i = self.index_of_current()?;
        self.tracks.get(i + 1).map(|t| t.id.as_str())
    }

    pub fn prev_id(&self) -> Option<&str> {
        let i = self.index_of_current()?;
        let prev = i.checked_sub(1)?;
        self.tracks.get(prev).map(|t| t.id.as_str())
    }

    pub fn first_id(&self) -> Option<&str> {
        self.tracks.first().map(|t| t.id.as_str())
    }

    /// Tracks from `before` positions ahead of the current one up to `after`
    /// positions past it, clamped to the queue bounds.
    pub fn around_current(&self, before: usize, after: usize) -> &[Track] {
        match self.index_of_current() {
            Some(i) => {
                let start = i.saturating_sub(before);
                let end = (i + after + 1).min(self.tracks.len());
                &self.tracks[start..end]
            }
            None => &[],
        }
    }

    /// Drop every track and its artifact.
    pub fn clear(&mut self) {
        for track in &self.tracks {
            remove_artifact(track);
        }
        self.tracks.clear();
        self.current_id = None;
    }

    fn sort(&mut self) {
        self.tracks
            .sort_by(|a, b| a.created_at.total_cmp(&b.created_at));
    }
}

fn remove_artifact(track: &Track) {
    let Some(path) = track.local_path.as_deref() else {
        return;
    };
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != io::ErrorKind::NotFound {
            debug!("could not delete {}: {e}", path.display());
        }
    }
}
