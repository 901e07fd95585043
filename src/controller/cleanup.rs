//! The temp-artifact window: only the previous, current and next tracks keep
//! their files.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::queue::Status;

use super::state::Controller;

impl Controller {
    /// Delete artifacts outside {prev, current, next} and forget paths whose
    /// files are gone.
    pub fn cleanup_window(&mut self) {
        if self.queue.index_of_current().is_none() {
            return;
        }
        let keep: HashSet<PathBuf> = self
            .queue
            .around_current(1, 1)
            .iter()
            .filter_map(|t| t.artifact())
            .filter_map(|p| fs::canonicalize(p).ok())
            .collect();

        for path in self.artifacts_on_disk(false) {
            let resolved = fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
            if keep.contains(&resolved) {
                continue;
            }
            if let Err(e) = fs::remove_file(&path) {
                debug!("could not delete {}: {e}", path.display());
            }
        }

        self.forget_missing_artifacts();
        self.persist();
    }

    /// Stop playback and delete every artifact. Tracks caught mid-download or
    /// mid-play go back to `queued`.
    pub fn clear_temp(&mut self) {
        self.playback.stop();
        for path in self.artifacts_on_disk(true) {
            if let Err(e) = fs::remove_file(&path) {
                debug!("could not delete {}: {e}", path.display());
            }
        }
        for track in self.queue.tracks_mut() {
            track.local_path = None;
            if matches!(
                track.status,
                Status::Downloading | Status::Playing | Status::Paused
            ) {
                track.status = Status::Queued;
            }
        }
        self.persist();
        self.notifier.on_log("temp cleared");
        self.update_now_playing();
        self.notifier.on_queue_changed(self.queue.tracks());
    }

    fn forget_missing_artifacts(&mut self) {
        for track in self.queue.tracks_mut() {
            if track.local_path.as_deref().is_some_and(|p| !p.exists()) {
                track.local_path = None;
            }
        }
    }

    // Files directly in the temp dir with the artifact extension, plus
    // in-progress `.part` files when `partial` is set.
    fn artifacts_on_disk(&self, partial: bool) -> Vec<PathBuf> {
        let ext = self.options.artifact_ext.as_str();
        WalkDir::new(&self.options.temp_dir)
            .max_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| has_extension(p, ext) || (partial && has_extension(p, "part")))
            .collect()
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}
