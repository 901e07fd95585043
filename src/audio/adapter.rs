use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("no audio output device")]
    NotReady,

    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
}

/// What the controller needs from an audio output.
///
/// One track at a time: `play` replaces whatever was loaded before.
pub trait PlaybackAdapter {
    fn play(&mut self, path: &Path, volume: f32) -> Result<(), PlaybackError>;
    fn pause(&mut self);
    fn resume(&mut self);
    fn stop(&mut self);
    fn set_volume(&mut self, volume: f32);
    /// Loaded, not paused, and not yet drained.
    fn is_playing(&self) -> bool;
    fn is_paused(&self) -> bool;
    /// An output device was opened.
    fn is_ready(&self) -> bool;
}
