use super::*;
use crate::events::{self, Event};
use crate::queue::{Status, Track};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::{TempDir, tempdir};

struct FakeFetcher {
    dir: PathBuf,
    fail: bool,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ArtifactFetcher for FakeFetcher {
    fn fetch(&self, track: &Track) -> Result<PathBuf, FetchError> {
        self.calls.lock().unwrap().push(track.id.clone());
        if self.fail {
            return Err(FetchError::Empty(track.url.clone()));
        }
        let out = unique_artifact_path(&self.dir, &track.title, track.created_at, "mp3", 120);
        fs::write(&out, b"audio").unwrap();
        Ok(out)
    }
}

fn t(id: &str) -> Track {
    Track::new(id, "DA", 1.0, format!("https://youtu.be/{id}"), format!("Song {id}"))
}

fn worker(
    fail: bool,
    window: AcquisitionWindow,
) -> (
    AcquisitionWorker<FakeFetcher>,
    WindowHandle,
    events::EventReceiver,
    Arc<Mutex<Vec<String>>>,
    TempDir,
) {
    let dir = tempdir().unwrap();
    let calls = Arc::new(Mutex::new(Vec::new()));
    let fetcher = FakeFetcher {
        dir: dir.path().to_path_buf(),
        fail,
        calls: calls.clone(),
    };
    let handle: WindowHandle = Arc::new(Mutex::new(window));
    let (tx, rx) = events::channel();
    let w = AcquisitionWorker::new(
        fetcher,
        handle.clone(),
        tx,
        Duration::from_millis(1),
        Arc::new(AtomicBool::new(false)),
    );
    (w, handle, rx, calls, dir)
}

#[test]
fn sanitize_title_strips_unsafe_and_collapses_whitespace() {
    assert_eq!(sanitize_title("  AC/DC: Back\tin   Black?? ", 120), "AC_DC_ Back_in Black_");
    assert_eq!(sanitize_title("a<>|b", 120), "a_b");
    assert_eq!(sanitize_title("   ", 120), "track");
    assert_eq!(sanitize_title("abcdef  ghij", 7), "abcdef");
    assert_eq!(sanitize_title("ёжик в тумане", 4), "ёжик");
}

#[test]
fn unique_artifact_path_appends_timestamp_then_counter() {
    let dir = tempdir().unwrap();
    let first = unique_artifact_path(dir.path(), "Song", 1700.9, "mp3", 120);
    assert_eq!(first, dir.path().join("Song.mp3"));
    fs::write(&first, b"x").unwrap();

    let second = unique_artifact_path(dir.path(), "Song", 1700.9, "mp3", 120);
    assert_eq!(second, dir.path().join("Song__1700.mp3"));
    fs::write(&second, b"x").unwrap();

    let third = unique_artifact_path(dir.path(), "Song", 1700.9, "mp3", 120);
    assert_eq!(third, dir.path().join("Song__1700_2.mp3"));

    assert_eq!(part_path(&first), dir.path().join("Song.mp3.part"));
}

#[test]
fn cycle_fetches_current_and_next_and_reports() {
    let window = AcquisitionWindow {
        enabled: true,
        targets: vec![t("A"), t("B")],
    };
    let (mut w, _handle, rx, calls, dir) = worker(false, window);

    assert_eq!(w.cycle(), 2);
    assert_eq!(*calls.lock().unwrap(), vec!["A".to_string(), "B".to_string()]);

    let got = events::drain(&rx);
    assert_eq!(got.len(), 6);
    assert_eq!(
        got[0],
        Event::StatusUpdate {
            id: "A".into(),
            status: Status::Downloading,
            error: None
        }
    );
    assert_eq!(
        got[1],
        Event::DownloadDone {
            id: "A".into(),
            path: dir.path().join("Song A.mp3"),
        }
    );
    assert_eq!(got[2], Event::Log("downloaded: Song A.mp3".into()));
}

#[test]
fn stale_window_does_not_refetch() {
    let window = AcquisitionWindow {
        enabled: true,
        targets: vec![t("A")],
    };
    let (mut w, handle, rx, calls, dir) = worker(false, window);

    assert_eq!(w.cycle(), 1);
    // Controller has not caught up yet: the window still shows A queued.
    assert_eq!(w.cycle(), 0);
    assert_eq!(calls.lock().unwrap().len(), 1);

    // Controller applied the result.
    {
        let mut win = handle.lock().unwrap();
        win.targets[0].local_path = Some(dir.path().join("Song A.mp3"));
    }
    assert_eq!(w.cycle(), 0);

    // Artifact removed by cleanup and the path cleared: fetch again.
    fs::remove_file(dir.path().join("Song A.mp3")).unwrap();
    {
        let mut win = handle.lock().unwrap();
        win.targets[0].local_path = None;
    }
    assert_eq!(w.cycle(), 1);
    assert_eq!(calls.lock().unwrap().len(), 2);
    drop(rx);
}

#[test]
fn cycle_skips_busy_finished_and_present_targets() {
    let dir = tempdir().unwrap();
    let present = dir.path().join("have.mp3");
    fs::write(&present, b"x").unwrap();

    let mut downloading = t("D");
    downloading.status = Status::Downloading;
    let mut playing = t("P");
    playing.status = Status::Playing;
    let mut failed = t("F");
    failed.status = Status::Failed;
    let mut have = t("H");
    have.local_path = Some(present);

    for target in [downloading, playing, failed, have] {
        let window = AcquisitionWindow {
            enabled: true,
            targets: vec![target],
        };
        let (mut w, _handle, rx, calls, _dir) = worker(false, window);
        assert_eq!(w.cycle(), 0);
        assert!(calls.lock().unwrap().is_empty());
        assert!(events::drain(&rx).is_empty());
    }
}

#[test]
fn disabled_window_does_nothing() {
    let window = AcquisitionWindow {
        enabled: false,
        targets: vec![t("A")],
    };
    let (mut w, _handle, rx, calls, _dir) = worker(false, window);
    assert_eq!(w.cycle(), 0);
    assert!(calls.lock().unwrap().is_empty());
    assert!(events::drain(&rx).is_empty());
}

#[test]
fn failed_fetch_reports_failed_with_error() {
    let window = AcquisitionWindow {
        enabled: true,
        targets: vec![t("A")],
    };
    let (mut w, _handle, rx, _calls, _dir) = worker(true, window);
    assert_eq!(w.cycle(), 1);

    let got = events::drain(&rx);
    assert_eq!(got.len(), 2);
    match &got[1] {
        Event::StatusUpdate {
            id,
            status: Status::Failed,
            error: Some(err),
        } => {
            assert_eq!(id, "A");
            assert!(err.contains("empty response"));
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn recorded_but_deleted_artifact_is_fetched_again() {
    let window = AcquisitionWindow {
        enabled: true,
        targets: vec![t("A")],
    };
    let (mut w, handle, _rx, calls, dir) = worker(false, window);

    assert_eq!(w.cycle(), 1);
    let path = dir.path().join("Song A.mp3");
    assert!(path.exists());

    // The file is removed before the controller records it, so the window
    // shows a queued track pointing at nothing.
    fs::remove_file(&path).unwrap();
    handle.lock().unwrap().targets[0].local_path = Some(path.clone());

    assert_eq!(w.cycle(), 1);
    assert_eq!(calls.lock().unwrap().len(), 2);
    assert!(path.exists());
}
