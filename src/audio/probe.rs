use std::path::Path;
use std::time::Duration;

use lofty::file::AudioFile;

/// Duration read from the file's headers, if lofty understands it.
pub fn probe_duration(path: &Path) -> Option<Duration> {
    let tagged = lofty::read_from_path(path).ok()?;
    let duration = tagged.properties().duration();
    (!duration.is_zero()).then_some(duration)
}

/// `m:ss`, hours folded into minutes.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}
