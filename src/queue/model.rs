//! Track entity and its lifecycle status.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Lifecycle status of a queued track.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Waiting for acquisition or playback. `ready` is an old spelling.
    #[default]
    #[serde(alias = "ready")]
    Queued,
    Downloading,
    Playing,
    Paused,
    Played,
    Skipped,
    Failed,
}

impl Status {
    /// Position in the forward-only status order. Updates never move a track
    /// to a lower rank.
    pub fn rank(self) -> u8 {
        match self {
            Status::Queued => 0,
            Status::Downloading => 1,
            Status::Playing | Status::Paused => 2,
            Status::Played | Status::Skipped | Status::Failed => 3,
        }
    }

    /// Playback currently holds this track.
    pub fn is_active(self) -> bool {
        matches!(self, Status::Playing | Status::Paused)
    }

    pub fn is_terminal(self) -> bool {
        self.rank() == 3
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Queued => "queued",
            Status::Downloading => "downloading",
            Status::Playing => "playing",
            Status::Paused => "paused",
            Status::Played => "played",
            Status::Skipped => "skipped",
            Status::Failed => "failed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A queued unit of media reported by a feed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// `<feed>:<native id>`; stable across re-polls of the same feed item.
    pub id: String,
    /// Name of the feed that reported the track.
    pub source: String,
    /// Seconds since the epoch; the queue's only ordering key.
    pub created_at: f64,
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub local_path: Option<PathBuf>,
    #[serde(default)]
    pub error: Option<String>,
}

impl Track {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        created_at: f64,
        url: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            created_at,
            url: url.into(),
            title: title.into(),
            status: Status::Queued,
            local_path: None,
            error: None,
        }
    }

    /// The local artifact, if one is recorded and still on disk.
    pub fn artifact(&self) -> Option<&Path> {
        self.local_path.as_deref().filter(|p| p.exists())
    }

    pub fn has_artifact(&self) -> bool {
        self.artifact().is_some()
    }
}
