//! rodio-backed playback.
//!
//! The output stream is opened once; each `play` decodes the file into a
//! fresh `Sink` connected to the stream's mixer.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
use tracing::warn;

use super::adapter::{PlaybackAdapter, PlaybackError};

pub(super) fn open_source(path: &Path) -> Result<Decoder<BufReader<File>>, PlaybackError> {
    let file = File::open(path).map_err(|source| PlaybackError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Decoder::new(BufReader::new(file)).map_err(|e| PlaybackError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

pub struct RodioPlayback {
    stream: Option<OutputStream>,
    sink: Option<Sink>,
}

impl RodioPlayback {
    /// Open the default output. Without a device the adapter still exists
    /// but reports not ready and refuses to play.
    pub fn open_default() -> Self {
        let stream = match OutputStreamBuilder::open_default_stream() {
            Ok(mut stream) => {
                // rodio prints to stderr when the stream drops.
                stream.log_on_drop(false);
                Some(stream)
            }
            Err(e) => {
                warn!("audio output unavailable: {e}");
                None
            }
        };
        Self { stream, sink: None }
    }
}

impl PlaybackAdapter for RodioPlayback {
    fn play(&mut self, path: &Path, volume: f32) -> Result<(), PlaybackError> {
        let Some(stream) = self.stream.as_ref() else {
            return Err(PlaybackError::NotReady);
        };
        let source = open_source(path)?;

        if let Some(old) = self.sink.take() {
            old.stop();
        }
        let sink = Sink::connect_new(stream.mixer());
        sink.set_volume(volume.clamp(0.0, 1.0));
        sink.append(source);
        sink.play();
        self.sink = Some(sink);
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn resume(&mut self) {
        if let Some(sink) = &self.sink {
            sink.play();
        }
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    fn set_volume(&mut self, volume: f32) {
        if let Some(sink) = &self.sink {
            sink.set_volume(volume.clamp(0.0, 1.0));
        }
    }

    fn is_playing(&self) -> bool {
        self.sink
            .as_ref()
            .is_some_and(|s| !s.is_paused() && !s.empty())
    }

    fn is_paused(&self) -> bool {
        self.sink.as_ref().is_some_and(|s| s.is_paused() && !s.empty())
    }

    fn is_ready(&self) -> bool {
        self.stream.is_some()
    }
}
