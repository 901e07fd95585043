//! Handing links to the system's default handler.

use std::io;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

pub trait LinkOpener {
    fn open(&self, url: &str);
}

/// `xdg-open` on Unix, `open` on macOS, `cmd /C start` on Windows.
#[derive(Debug, Default)]
pub struct SystemOpener;

impl SystemOpener {
    fn command(url: &str) -> Command {
        if cfg!(target_os = "macos") {
            let mut cmd = Command::new("open");
            cmd.arg(url);
            cmd
        } else if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", "", url]);
            cmd
        } else {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(url);
            cmd
        }
    }
}

impl LinkOpener for SystemOpener {
    fn open(&self, url: &str) {
        if url.trim().is_empty() {
            return;
        }
        let spawned = Self::command(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(child) => {
                debug!("opened {url}");
                if let Err(e) = reap(child) {
                    warn!("opener not reaped: {e}");
                }
            }
            Err(e) => warn!("could not open {url}: {e}"),
        }
    }
}

// Waits on the handler from a background thread; the status is the join value.
fn reap(mut child: Child) -> io::Result<JoinHandle<Option<ExitStatus>>> {
    thread::Builder::new()
        .name("opener".into())
        .spawn(move || child.wait().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn finished_handler_is_waited_on() {
        let child = Command::new("true").spawn().unwrap();
        let status = reap(child).unwrap().join().unwrap();
        assert!(status.is_some_and(|s| s.success()));
    }

    #[test]
    fn blank_url_is_ignored() {
        SystemOpener.open("   ");
    }
}
