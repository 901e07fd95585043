//! Artifact fetchers.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use ureq::Agent;

use crate::config::AcquisitionSettings;
use crate::queue::Track;

use super::naming::{part_path, unique_artifact_path};

const USER_AGENT: &str = concat!("feedplay/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] ureq::Error),

    #[error("file error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("empty response for {0}")]
    Empty(String),
}

/// Materializes a local artifact for a track.
pub trait ArtifactFetcher: Send {
    fn fetch(&self, track: &Track) -> Result<PathBuf, FetchError>;
}

/// Downloads over HTTP into the artifact directory.
///
/// The body is streamed into `<name>.part` and renamed on completion, so a
/// half-written file never carries the artifact extension.
pub struct HttpFetcher {
    agent: Agent,
    endpoint: Option<String>,
    dir: PathBuf,
    extension: String,
    max_title_len: usize,
}

impl HttpFetcher {
    pub fn new(settings: &AcquisitionSettings) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(settings.timeout_secs.max(1))))
            .build()
            .into();
        Self {
            agent,
            endpoint: settings
                .endpoint
                .clone()
                .filter(|e| !e.trim().is_empty()),
            dir: settings.resolved_temp_dir(),
            extension: settings.extension.clone(),
            max_title_len: settings.max_title_len,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ArtifactFetcher for HttpFetcher {
    fn fetch(&self, track: &Track) -> Result<PathBuf, FetchError> {
        fs::create_dir_all(&self.dir).map_err(|source| FetchError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let request = match &self.endpoint {
            Some(endpoint) => self.agent.get(endpoint).query("url", &track.url),
            None => self.agent.get(&track.url),
        };
        let response = request.header("User-Agent", USER_AGENT).call()?;

        let out = unique_artifact_path(
            &self.dir,
            &track.title,
            track.created_at,
            &self.extension,
            self.max_title_len,
        );
        let part = part_path(&out);
        let io_err = |path: &Path, source: io::Error| FetchError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut file = File::create(&part).map_err(|e| io_err(&part, e))?;
        let mut reader = response.into_body().into_reader();
        let written = match io::copy(&mut reader, &mut file) {
            Ok(n) => n,
            Err(e) => {
                drop(file);
                let _ = fs::remove_file(&part);
                return Err(io_err(&part, e));
            }
        };
        drop(file);

        if written == 0 {
            let _ = fs::remove_file(&part);
            return Err(FetchError::Empty(track.url.clone()));
        }
        fs::rename(&part, &out).map_err(|e| io_err(&out, e))?;
        Ok(out)
    }
}
