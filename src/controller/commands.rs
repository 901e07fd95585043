//! User-intent commands. Each runs to completion on the controller thread.

use std::time::Instant;

use tracing::info;

use crate::queue::Status;

use super::state::Controller;

impl Controller {
    /// Pause, resume, or start the current track.
    pub fn play_pause(&mut self) {
        if self.closing || self.queue.current().is_none() {
            return;
        }
        if !self.options.acquire {
            self.play_current(true);
            return;
        }

        let status = if self.playback.is_playing() && !self.playback.is_paused() {
            self.playback.pause();
            Status::Paused
        } else if self.playback.is_paused() {
            self.playback.resume();
            self.last_play_start = Some(Instant::now());
            Status::Playing
        } else {
            self.play_current(true);
            return;
        };

        if let Some(track) = self.queue.current_mut() {
            track.status = status;
        }
        self.persist();
        self.update_now_playing();
        self.notifier.on_queue_changed(self.queue.tracks());
    }

    /// Finish the current track (`played` when `auto`, else `skipped`) and
    /// start the next one. At the end of the queue the pointer stays put.
    pub fn next(&mut self, auto: bool) {
        if self.closing {
            return;
        }
        if let Some(track) = self.queue.current_mut() {
            if !track.status.is_terminal() {
                track.status = if auto { Status::Played } else { Status::Skipped };
            }
        }
        self.playback.stop();

        if !self.advance_selection() {
            self.persist();
            self.notifier.on_queue_changed(self.queue.tracks());
            return;
        }
        self.play_current(true);
        self.notifier.on_queue_changed(self.queue.tracks());
    }

    pub fn prev(&mut self) {
        if self.closing {
            return;
        }
        let Some(prev) = self.queue.prev_id().map(str::to_string) else {
            return;
        };
        self.jump_to(&prev);
    }

    pub fn skip(&mut self) {
        self.next(false);
    }

    /// Jump to the oldest track.
    pub fn go_start(&mut self) {
        if self.closing {
            return;
        }
        let Some(first) = self.queue.first_id().map(str::to_string) else {
            return;
        };
        self.jump_to(&first);
    }

    /// Make `id` current without starting it. Unknown ids are ignored.
    pub fn select(&mut self, id: &str) -> bool {
        if self.closing || self.queue.get(id).is_none() {
            return false;
        }
        self.set_current(id);
        true
    }

    pub fn clear_queue(&mut self) {
        self.playback.stop();
        self.queue.clear();
        self.persist();
        self.notifier.on_log("queue cleared");
        self.notifier.on_status_text("Queue cleared");
        self.notifier.on_selection_changed(None);
        self.update_now_playing();
        self.notifier.on_queue_changed(self.queue.tracks());
    }

    /// Start every feed that has a token. Begins playback of the current
    /// track when nothing is playing.
    pub fn start_polling(&mut self) -> bool {
        if self.closing {
            return false;
        }
        if !self.pollers.has_tokens() {
            self.notifier.on_status_text("Error: no tokens");
            self.notifier.on_log("add a token for at least one feed");
            return false;
        }
        let started = self.pollers.start();
        info!(feeds = started, "polling started");
        self.notifier.on_status_text("Polling: ON");
        self.notifier.on_log("polling started");
        self.publish_window();

        if self.options.acquire && self.queue.current().is_some() && !self.playback.is_playing() {
            self.play_current(true);
        }
        true
    }

    pub fn stop_polling(&mut self) {
        self.pollers.stop();
        self.pollers.save_cursors();
        self.persist();
        self.publish_window();
        self.notifier.on_status_text("Polling: OFF");
        self.notifier.on_log("polling stopped");
    }

    pub fn set_volume(&mut self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        self.options.volume = volume;
        self.playback.set_volume(volume);
    }

    /// Switch between local playback and handing links to the opener.
    /// Leaving local playback stops the current track and re-queues it.
    pub fn set_acquire(&mut self, acquire: bool) {
        if self.options.acquire == acquire {
            return;
        }
        self.options.acquire = acquire;
        if !acquire {
            self.playback.stop();
            if let Some(track) = self.queue.current_mut() {
                if track.status.is_active() {
                    track.status = Status::Queued;
                }
            }
            self.persist();
        }
        self.publish_window();
        self.notifier.on_log(if acquire {
            "mode: download"
        } else {
            "mode: external"
        });
        self.update_now_playing();
    }

    /// Replace a feed's token; running pollers pick it up next cycle.
    pub fn set_token(&mut self, feed: &str, token: &str) -> bool {
        let known = self.pollers.set_token(feed, token);
        if known {
            self.notifier.on_log(&format!("{feed} token updated"));
        } else {
            self.notifier.on_log(&format!("unknown feed {feed}"));
        }
        known
    }

    pub fn open_current_link(&self) {
        if let Some(track) = self.queue.current() {
            self.opener.open(&track.url);
        }
    }

    /// Stop pollers, persist, and release the output. Safe to call twice.
    pub fn close(&mut self) {
        if self.closing {
            return;
        }
        self.closing = true;
        self.pollers.stop();
        self.pollers.save_cursors();
        self.persist();
        self.playback.stop();
        self.publish_window();
        info!("controller closed");
    }

    fn jump_to(&mut self, id: &str) {
        self.playback.stop();
        if let Some(track) = self.queue.current_mut() {
            if track.status.is_active() {
                track.status = Status::Queued;
            }
        }
        self.set_current(id);
        self.play_current(true);
        self.notifier.on_queue_changed(self.queue.tracks());
    }
}
