//! Artifact file naming.

use std::path::{Path, PathBuf};

const UNSAFE: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|', '\n', '\r', '\t'];

/// Turn a track title into a file stem: runs of path-unsafe characters become
/// one `_`, whitespace collapses to single spaces, and the result is capped
/// at `max_len` characters. Never empty.
pub fn sanitize_title(title: &str, max_len: usize) -> String {
    let mut replaced = String::with_capacity(title.len());
    let mut in_run = false;
    for c in title.trim().chars() {
        if UNSAFE.contains(&c) {
            if !in_run {
                replaced.push('_');
            }
            in_run = true;
        } else {
            replaced.push(c);
            in_run = false;
        }
    }

    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");
    let capped: String = collapsed.chars().take(max_len).collect();
    let capped = capped.trim_end();
    if capped.is_empty() {
        "track".to_string()
    } else {
        capped.to_string()
    }
}

/// A free path in `dir` for a track. On collision the creation time is
/// appended, then a counter.
pub fn unique_artifact_path(
    dir: &Path,
    title: &str,
    created_at: f64,
    extension: &str,
    max_len: usize,
) -> PathBuf {
    let stem = sanitize_title(title, max_len);
    let candidate = dir.join(format!("{stem}.{extension}"));
    if !candidate.exists() {
        return candidate;
    }

    let stamp = created_at as i64;
    let mut candidate = dir.join(format!("{stem}__{stamp}.{extension}"));
    let mut n = 2;
    while candidate.exists() {
        candidate = dir.join(format!("{stem}__{stamp}_{n}.{extension}"));
        n += 1;
    }
    candidate
}

/// In-progress download location for `out`.
pub fn part_path(out: &Path) -> PathBuf {
    let mut name = out.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}
