use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/feedplay/config.toml` or `~/.config/feedplay/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `FEEDPLAY__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub queue: QueueSettings,
    pub playback: PlaybackSettings,
    pub polling: PollingSettings,
    pub acquisition: AcquisitionSettings,
    pub storage: StorageSettings,
    pub runtime: RuntimeSettings,
    pub log: LogSettings,
    pub feeds: Vec<FeedSettings>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QueueSettings {
    /// Soft cap on queued tracks.
    pub limit: usize,
    /// Same-URL reports closer than this many seconds collapse into one track.
    pub dedup_window_secs: f64,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            limit: 50,
            dedup_window_secs: 2.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Download tracks and play them locally. When false, links are handed
    /// to the system opener instead.
    pub acquire: bool,
    /// Output volume in `0.0..=1.0`.
    pub volume: f32,
    /// Grace period after a play start before the watchdog may declare the
    /// track finished (milliseconds).
    pub debounce_ms: u64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            acquire: true,
            volume: 0.7,
            debounce_ms: 1200,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollingSettings {
    pub interval_secs: u64,
    /// Per-request timeout for feed calls.
    pub timeout_secs: u64,
    /// Start polling as soon as the app is up.
    pub autostart: bool,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            interval_secs: 3,
            timeout_secs: 15,
            autostart: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AcquisitionSettings {
    pub interval_ms: u64,
    pub timeout_secs: u64,
    /// Optional conversion service. When set, the track URL is passed to it
    /// as `?url=`; otherwise the track URL is fetched as-is.
    pub endpoint: Option<String>,
    /// Where artifacts are written. Defaults to `<tmp>/feedplay_tracks`.
    pub temp_dir: Option<PathBuf>,
    /// Artifact file extension, without the dot.
    pub extension: String,
    /// Longest file stem derived from a title, in characters.
    pub max_title_len: usize,
}

impl Default for AcquisitionSettings {
    fn default() -> Self {
        Self {
            interval_ms: 250,
            timeout_secs: 40,
            endpoint: None,
            temp_dir: None,
            extension: "mp3".to_string(),
            max_title_len: 120,
        }
    }
}

impl AcquisitionSettings {
    pub fn resolved_temp_dir(&self) -> PathBuf {
        self.temp_dir
            .clone()
            .unwrap_or_else(|| env::temp_dir().join("feedplay_tracks"))
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory for the queue and cursor documents.
    pub state_dir: Option<PathBuf>,
}

impl StorageSettings {
    /// `state_dir`, else `$XDG_DATA_HOME/feedplay`, else
    /// `~/.local/share/feedplay`, else `./feedplay-state`.
    pub fn resolved_state_dir(&self) -> PathBuf {
        if let Some(dir) = &self.state_dir {
            return dir.clone();
        }
        let data_home = if let Some(xdg) = env::var_os("XDG_DATA_HOME") {
            Some(PathBuf::from(xdg))
        } else {
            env::var_os("HOME").map(|home| PathBuf::from(home).join(".local").join("share"))
        };
        data_home
            .map(|d| d.join("feedplay"))
            .unwrap_or_else(|| PathBuf::from("feedplay-state"))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeSettings {
    /// Controller tick: event drain and watchdog period (milliseconds).
    pub tick_ms: u64,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self { tick_ms: 250 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogSettings {
    /// `tracing` filter directive; `RUST_LOG` wins when set.
    pub filter: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FeedSettings {
    /// Short tag shown next to tracks, e.g. `DA`. Must be unique.
    pub name: String,
    pub url: String,
    pub token: String,
    pub cursor: CursorKind,
    /// Ask YouTube's oEmbed endpoint for titles the feed leaves out.
    pub lookup_titles: bool,
}

/// Which item field a feed's watermark follows.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CursorKind {
    #[default]
    #[serde(alias = "media-id", alias = "media_id")]
    Id,
    #[serde(alias = "time", alias = "created-at", alias = "created_at")]
    Timestamp,
}
