use std::fs;
use std::time::Duration;

use tempfile::tempdir;

use super::sink::open_source;
use super::*;

#[test]
fn format_duration_is_minutes_and_padded_seconds() {
    assert_eq!(format_duration(Duration::from_secs(0)), "0:00");
    assert_eq!(format_duration(Duration::from_secs(65)), "1:05");
    assert_eq!(format_duration(Duration::from_secs(3725)), "62:05");
}

#[test]
fn probe_duration_gives_none_for_non_audio() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("noise.mp3");
    fs::write(&path, b"definitely not an mp3").unwrap();
    assert_eq!(probe_duration(&path), None);
    assert_eq!(probe_duration(&dir.path().join("missing.mp3")), None);
}

#[test]
fn open_source_distinguishes_missing_and_undecodable() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.mp3");
    assert!(matches!(
        open_source(&missing),
        Err(PlaybackError::Open { .. })
    ));

    let junk = dir.path().join("junk.mp3");
    fs::write(&junk, [0u8; 16]).unwrap();
    assert!(matches!(
        open_source(&junk),
        Err(PlaybackError::Decode { .. })
    ));
}
