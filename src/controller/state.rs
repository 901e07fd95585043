use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::acquire::{AcquisitionWindow, WindowHandle};
use crate::audio::{PlaybackAdapter, format_duration, probe_duration};
use crate::config::Settings;
use crate::events::{self, Event, EventReceiver};
use crate::feeds::Pollers;
use crate::opener::LinkOpener;
use crate::queue::{Status, TrackQueue};
use crate::store::Store;

use super::notify::Notifier;

/// Runtime-adjustable behaviour of the controller.
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Download and play locally; otherwise hand links to the opener.
    pub acquire: bool,
    pub volume: f32,
    /// Quiet period after a play start before the watchdog may advance.
    pub debounce: Duration,
    /// Directory the acquisition worker writes artifacts to.
    pub temp_dir: PathBuf,
    /// Artifact extension without the dot.
    pub artifact_ext: String,
}

impl ControllerOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            acquire: settings.playback.acquire,
            volume: settings.playback.volume.clamp(0.0, 1.0),
            debounce: Duration::from_millis(settings.playback.debounce_ms),
            temp_dir: settings.acquisition.resolved_temp_dir(),
            artifact_ext: settings.acquisition.extension.clone(),
        }
    }
}

pub struct Controller {
    pub(super) queue: TrackQueue,
    pub(super) store: Store,
    pub(super) events: EventReceiver,
    pub(super) playback: Box<dyn PlaybackAdapter>,
    pub(super) opener: Box<dyn LinkOpener>,
    pub(super) notifier: Box<dyn Notifier>,
    pub(super) pollers: Pollers,
    pub(super) window: WindowHandle,
    pub(super) options: ControllerOptions,
    pub(super) last_play_start: Option<Instant>,
    pub(super) closing: bool,
}

impl Controller {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        queue: TrackQueue,
        store: Store,
        events: EventReceiver,
        playback: Box<dyn PlaybackAdapter>,
        opener: Box<dyn LinkOpener>,
        notifier: Box<dyn Notifier>,
        pollers: Pollers,
        options: ControllerOptions,
    ) -> Self {
        let controller = Self {
            queue,
            store,
            events,
            playback,
            opener,
            notifier,
            pollers,
            window: Arc::new(Mutex::new(AcquisitionWindow::default())),
            options,
            last_play_start: None,
            closing: false,
        };
        controller.update_now_playing();
        controller
    }

    pub fn queue(&self) -> &TrackQueue {
        &self.queue
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    pub fn pollers(&self) -> &Pollers {
        &self.pollers
    }

    pub fn is_closing(&self) -> bool {
        self.closing
    }

    /// Shared snapshot the acquisition worker reads.
    pub fn window_handle(&self) -> WindowHandle {
        self.window.clone()
    }

    /// One controller cycle: apply pending events, run the watchdog and
    /// republish the acquisition window.
    pub fn tick(&mut self) {
        if self.closing {
            return;
        }
        self.drain_events();
        self.watchdog();
        self.publish_window();
    }

    /// Apply every queued event in arrival order. Returns how many were taken.
    pub fn drain_events(&mut self) -> usize {
        if self.closing {
            return 0;
        }
        let pending = events::drain(&self.events);
        let count = pending.len();

        let mut dirty = false;
        for event in pending {
            dirty |= self.apply(event);
        }

        if dirty {
            self.persist();
            self.update_now_playing();
            self.notifier.on_queue_changed(self.queue.tracks());
        }
        count
    }

    fn apply(&mut self, event: Event) -> bool {
        match event {
            Event::Log(line) => {
                self.notifier.on_log(&line);
                false
            }
            Event::NewTrack(track) => {
                let had_current = self.queue.current_id().is_some();
                let line = format!("NEW [{}] {}", track.source, track.title);
                if !self.queue.append_if_new(track) {
                    return false;
                }
                self.notifier.on_log(&line);
                if !had_current {
                    self.notifier.on_selection_changed(self.queue.current_id());
                }
                true
            }
            Event::StatusUpdate { id, status, error } => {
                let Some(track) = self.queue.get_mut(&id) else {
                    return false;
                };
                if status.rank() < track.status.rank() {
                    debug!(track = %id, "ignoring stale status {status} (is {})", track.status);
                    return false;
                }
                track.status = status;
                if error.is_some() {
                    track.error = error;
                }
                true
            }
            Event::DownloadDone { id, path } => {
                let Some(track) = self.queue.get_mut(&id) else {
                    return false;
                };
                track.local_path = Some(path);
                if !track.status.is_active() {
                    track.status = Status::Queued;
                }
                let is_current = self.queue.current_id() == Some(id.as_str());
                if is_current && self.options.acquire && !self.playback.is_playing() {
                    self.play_current(true);
                }
                true
            }
        }
    }

    /// Start the current track if nothing is loaded.
    ///
    /// In external mode the link goes to the opener, the track is marked
    /// played and the selection moves on; nothing else is opened.
    pub fn play_current(&mut self, force: bool) {
        if self.closing {
            return;
        }
        if self.playback.is_playing() || self.playback.is_paused() {
            return;
        }
        let Some(track) = self.queue.current() else {
            return;
        };

        if !self.options.acquire {
            let url = track.url.clone();
            self.opener.open(&url);
            if let Some(track) = self.queue.current_mut() {
                track.status = Status::Played;
            }
            self.persist();
            self.advance_selection();
            return;
        }

        if !self.playback.is_ready() {
            self.notifier.on_log("audio output not ready");
            self.notifier.on_status_text("Audio error");
            return;
        }

        let Some(path) = track.artifact().map(|p| p.to_path_buf()) else {
            if force {
                self.notifier.on_status_text("Waiting for download…");
            }
            if let Some(track) = self.queue.current_mut() {
                if track.status != Status::Downloading {
                    track.status = Status::Queued;
                }
            }
            self.persist();
            self.update_now_playing();
            return;
        };

        match self.playback.play(&path, self.options.volume) {
            Ok(()) => {
                self.last_play_start = Some(Instant::now());
                if let Some(track) = self.queue.current_mut() {
                    info!(track = %track.id, "playing {}", track.title);
                    track.status = Status::Playing;
                }
                self.notifier.on_status_text("Playing");
                self.cleanup_window();
                self.update_now_playing();
                self.notifier.on_queue_changed(self.queue.tracks());
            }
            Err(e) => {
                warn!("playback failed: {e}");
                if let Some(track) = self.queue.current_mut() {
                    track.status = Status::Failed;
                    track.error = Some(e.to_string());
                }
                self.persist();
                self.notifier.on_log(&format!("play error: {e}"));
                self.update_now_playing();
            }
        }
    }

    /// Detect a finished track: the adapter went quiet while the current
    /// track still says `playing`.
    pub fn watchdog(&mut self) {
        if self.closing || !self.pollers.is_running() || !self.options.acquire {
            return;
        }
        if self.playback.is_paused() {
            return;
        }
        let Some(started) = self.last_play_start else {
            return;
        };
        if started.elapsed() < self.options.debounce || self.playback.is_playing() {
            return;
        }

        let Some(track) = self.queue.current_mut() else {
            return;
        };
        if track.status != Status::Playing {
            return;
        }
        track.status = Status::Played;
        self.persist();
        self.cleanup_window();
        self.next(true);
    }

    /// Copy the current and next track into the worker's window.
    pub fn publish_window(&self) {
        let enabled = !self.closing && self.options.acquire && self.pollers.is_running();
        let targets = if enabled {
            self.queue.around_current(0, 1).to_vec()
        } else {
            Vec::new()
        };
        if let Ok(mut window) = self.window.lock() {
            window.enabled = enabled;
            window.targets = targets;
        }
    }

    pub(super) fn persist(&self) {
        if let Err(e) = self.queue.save(&self.store) {
            debug!("queue not saved: {e}");
        }
    }

    /// Move the pointer forward without playing; reports the end of the queue.
    pub(super) fn advance_selection(&mut self) -> bool {
        let Some(next) = self.queue.next_id().map(str::to_string) else {
            self.notifier.on_status_text("End of queue");
            self.update_now_playing();
            return false;
        };
        self.set_current(&next);
        true
    }

    pub(super) fn set_current(&mut self, id: &str) {
        self.queue.set_current(Some(id));
        self.persist();
        self.notifier.on_selection_changed(self.queue.current_id());
        self.update_now_playing();
    }

    /// Headline `[SRC] title` plus a status line with the artifact name and
    /// duration when known.
    pub fn now_playing(&self) -> (String, String) {
        let Some(track) = self.queue.current() else {
            return ("—".to_string(), "Queue empty".to_string());
        };
        let mut detail = format!("Status: {}", track.status);
        if let Some(path) = track.artifact() {
            if let Some(name) = path.file_name() {
                detail.push_str(&format!(" · {}", name.to_string_lossy()));
            }
            if let Some(duration) = probe_duration(path) {
                detail.push_str(&format!(" · {}", format_duration(duration)));
            }
        }
        (format!("[{}] {}", track.source, track.title), detail)
    }

    pub(super) fn update_now_playing(&self) {
        let (title, detail) = self.now_playing();
        self.notifier.on_now_playing(&title, &detail);
    }
}
