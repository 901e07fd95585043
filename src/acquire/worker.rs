//! The acquisition loop.

use std::collections::HashSet;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::events::{Event, EventSender};
use crate::queue::{Status, Track};

use super::fetcher::ArtifactFetcher;

/// What the controller wants materialized right now.
#[derive(Debug, Clone, Default)]
pub struct AcquisitionWindow {
    /// Acquisition mode is on and polling is active.
    pub enabled: bool,
    /// Copies of the current track and the one after it.
    pub targets: Vec<Track>,
}

pub type WindowHandle = Arc<Mutex<AcquisitionWindow>>;

pub struct AcquisitionWorker<F> {
    fetcher: F,
    window: WindowHandle,
    events: EventSender,
    interval: Duration,
    shutdown: Arc<AtomicBool>,
    // Ids already fetched (or failed) whose outcome the published window
    // does not show yet. Dropped as soon as the window records a path, even
    // one whose file has since been deleted.
    pending: HashSet<String>,
}

impl<F: ArtifactFetcher> AcquisitionWorker<F> {
    pub fn new(
        fetcher: F,
        window: WindowHandle,
        events: EventSender,
        interval: Duration,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Self {
            fetcher,
            window,
            events,
            interval,
            shutdown,
            pending: HashSet::new(),
        }
    }

    pub fn run(mut self) {
        while !self.shutdown.load(Ordering::Relaxed) {
            thread::sleep(self.interval);
            self.cycle();
        }
        debug!("acquisition worker stopped");
    }

    /// One pass over the window. Returns the number of fetches attempted.
    ///
    /// Only `queued` targets without an artifact are fetched; failed and
    /// finished tracks wait for the user to re-queue them.
    pub fn cycle(&mut self) -> usize {
        let snapshot = match self.window.lock() {
            Ok(w) => w.clone(),
            Err(_) => return 0,
        };

        self.pending.retain(|id| {
            snapshot
                .targets
                .iter()
                .any(|t| &t.id == id && t.status == Status::Queued && t.local_path.is_none())
        });
        if !snapshot.enabled {
            return 0;
        }

        let mut attempts = 0;
        for target in snapshot.targets.iter().take(2) {
            if target.status != Status::Queued
                || target.has_artifact()
                || self.pending.contains(&target.id)
            {
                continue;
            }
            if self.shutdown.load(Ordering::Relaxed) {
                break;
            }

            self.pending.insert(target.id.clone());
            attempts += 1;
            let _ = self.events.send(Event::StatusUpdate {
                id: target.id.clone(),
                status: Status::Downloading,
                error: None,
            });

            match self.fetcher.fetch(target) {
                Ok(path) => {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    let _ = self.events.send(Event::DownloadDone {
                        id: target.id.clone(),
                        path,
                    });
                    let _ = self.events.send(Event::Log(format!("downloaded: {name}")));
                }
                Err(e) => {
                    warn!(track = %target.id, "download failed: {e}");
                    let _ = self.events.send(Event::StatusUpdate {
                        id: target.id.clone(),
                        status: Status::Failed,
                        error: Some(e.to_string()),
                    });
                }
            }
        }
        attempts
    }
}

pub fn spawn_worker<F>(worker: AcquisitionWorker<F>) -> io::Result<JoinHandle<()>>
where
    F: ArtifactFetcher + 'static,
{
    thread::Builder::new()
        .name("acquisition".into())
        .spawn(move || worker.run())
}
