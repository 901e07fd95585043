//! Durable key/value documents.
//!
//! Each key maps to `<dir>/<key>.json`. Writes go to a sibling temporary file
//! first and are renamed into place, so a crash mid-write leaves the previous
//! document intact.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("no document stored under '{0}'")]
    Missing(String),

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed document {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Debug)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<T, PersistenceError> {
        let path = self.path_for(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(PersistenceError::Missing(key.to_string()));
            }
            Err(source) => return Err(PersistenceError::Io { path, source }),
        };
        serde_json::from_slice(&bytes).map_err(|source| PersistenceError::Json { path, source })
    }

    /// Load `key`, falling back to `T::default()` when the document is absent
    /// or unreadable.
    pub fn load_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.load(key) {
            Ok(value) => value,
            Err(PersistenceError::Missing(_)) => T::default(),
            Err(e) => {
                debug!("using default for '{key}': {e}");
                T::default()
            }
        }
    }

    pub fn save<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.dir).map_err(|source| PersistenceError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.path_for(key);
        let bytes = serde_json::to_vec_pretty(value).map_err(|source| PersistenceError::Json {
            path: path.clone(),
            source,
        })?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, bytes).map_err(|source| PersistenceError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| PersistenceError::Io { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Doc {
        last: Option<u64>,
        name: String,
    }

    #[test]
    fn save_then_load_returns_same_document() {
        let dir = tempdir().unwrap();
        let store = Store::new(dir.path().join("state"));
        let doc = Doc {
            last: Some(42),
            name: "feed".into(),
        };

        store.save("doc", &doc).unwrap();
        let back: Doc = store.load("doc").unwrap();
        assert_eq!(back, doc);
        assert!(!store.path_for("doc").with_extension("json.tmp").exists());
    }

    #[test]
    fn load_distinguishes_missing_from_malformed() {
        let dir = tempdir().unwrap();
        let store = Store::new(dir.path());

        assert!(matches!(
            store.load::<Doc>("absent"),
            Err(PersistenceError::Missing(_))
        ));

        fs::write(store.path_for("broken"), b"{ not json").unwrap();
        assert!(matches!(
            store.load::<Doc>("broken"),
            Err(PersistenceError::Json { .. })
        ));
    }

    #[test]
    fn load_or_default_swallows_errors() {
        let dir = tempdir().unwrap();
        let store = Store::new(dir.path());
        fs::write(store.path_for("broken"), b"[]").unwrap();

        assert_eq!(store.load_or_default::<Doc>("broken"), Doc::default());
        assert_eq!(store.load_or_default::<Doc>("absent"), Doc::default());
    }
}
