//! Key-value persistence for the gallery lists.
//!
//! The app's lists are stored under fixed string keys as serialized JSON.
//! [`KeyValueStore`] abstracts the medium so the library and its tests can
//! substitute implementations; [`FileStore`] is the production one, keeping
//! one file per key under a data directory.
//!
//! There are no transactions and no versioning: each `set` fully replaces
//! the prior value for that key. An absent key is a valid "no value yet"
//! result, not an error.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Result, StorageError};

/// Durable, process-wide string-keyed storage of serialized values.
///
/// Implementations must be safe to share across threads; the library
/// assumes a single logical writer per process.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` when nothing has ever been stored under the key.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ReadFailed`] when the medium is unavailable
    /// or the stored bytes cannot be read back.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Durably write `value` under `key`, replacing any prior value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::WriteFailed`] on medium failure (disk full,
    /// permissions, ...). The prior value must survive a failed write.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// File-backed store: one `<key>.json` file per key under a data directory.
///
/// Writes go to a temporary file in the same directory which is then
/// renamed over the target, so a failed write never clobbers the previous
/// value.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::WriteFailed`] if the directory cannot be
    /// created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StorageError::WriteFailed {
            key: dir.display().to_string(),
            reason: format!("Failed to create store directory: {e}"),
        })?;
        debug!("Opened file store at {}", dir.display());
        Ok(Self { dir })
    }

    /// Directory this store keeps its files in.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => {
                warn!("Read failed for key '{}': {}", key, e);
                Err(StorageError::ReadFailed {
                    key: key.to_string(),
                    reason: e.to_string(),
                }
                .into())
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));

        let write_err = |e: io::Error| StorageError::WriteFailed {
            key: key.to_string(),
            reason: e.to_string(),
        };

        fs::write(&tmp, value).map_err(write_err)?;
        fs::rename(&tmp, &path).map_err(|e| {
            // The rename failed; the half-written temp file is garbage.
            let _ = fs::remove_file(&tmp);
            write_err(e)
        })?;

        debug!("Wrote {} bytes under key '{}'", value.len(), key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, FileStore) {
        let dir = TempDir::new().expect("temp dir");
        let store = FileStore::new(dir.path()).expect("store");
        (dir, store)
    }

    #[test]
    fn test_absent_key_is_none_not_error() {
        let (_dir, store) = store();
        assert!(store.get("missing").expect("get").is_none());
    }

    #[test]
    fn test_set_then_get_round_trips() {
        let (_dir, store) = store();
        store.set("list", "[1,2,3]").expect("set");
        assert_eq!(store.get("list").expect("get").as_deref(), Some("[1,2,3]"));
    }

    #[test]
    fn test_set_replaces_prior_value() {
        let (_dir, store) = store();
        store.set("list", "[1]").expect("set");
        store.set("list", "[2]").expect("set");
        assert_eq!(store.get("list").expect("get").as_deref(), Some("[2]"));
    }

    #[test]
    fn test_values_survive_reopening_the_store() {
        let (dir, store) = store();
        store.set("list", "[\"persisted\"]").expect("set");
        drop(store);

        let reopened = FileStore::new(dir.path()).expect("reopen");
        assert_eq!(
            reopened.get("list").expect("get").as_deref(),
            Some("[\"persisted\"]")
        );
    }

    #[test]
    fn test_keys_are_independent() {
        let (_dir, store) = store();
        store.set("a", "1").expect("set");
        store.set("b", "2").expect("set");
        assert_eq!(store.get("a").expect("get").as_deref(), Some("1"));
        assert_eq!(store.get("b").expect("get").as_deref(), Some("2"));
    }

    #[test]
    fn test_write_failure_reports_storage_error() {
        let store = FileStore {
            dir: PathBuf::from("/nonexistent/vidvault-store"),
        };
        let err = store.set("list", "[]").expect_err("set should fail");
        assert!(matches!(
            err,
            crate::Error::Storage(StorageError::WriteFailed { .. })
        ));
    }
}
