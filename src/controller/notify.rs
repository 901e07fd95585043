//! Outward notifications for a presentation layer.

use tracing::{debug, info};

use crate::queue::Track;

/// Callbacks the controller fires after it changes something visible.
/// Every method defaults to doing nothing.
pub trait Notifier {
    fn on_log(&self, _line: &str) {}
    fn on_status_text(&self, _text: &str) {}
    /// Headline and detail line for the current track.
    fn on_now_playing(&self, _title: &str, _detail: &str) {}
    fn on_selection_changed(&self, _id: Option<&str>) {}
    fn on_queue_changed(&self, _tracks: &[Track]) {}
}

/// Sends everything to `tracing`; used by the headless binary.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn on_log(&self, line: &str) {
        info!("{line}");
    }

    fn on_status_text(&self, text: &str) {
        info!(status = text);
    }

    fn on_now_playing(&self, title: &str, detail: &str) {
        info!("now playing: {title} ({detail})");
    }

    fn on_selection_changed(&self, id: Option<&str>) {
        debug!(current = id.unwrap_or("-"), "selection changed");
    }

    fn on_queue_changed(&self, tracks: &[Track]) {
        debug!(tracks = tracks.len(), "queue changed");
    }
}
