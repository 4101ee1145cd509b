//! In-memory snapshots over persisted lists.
//!
//! [`CachedList`] presents one stored list (a JSON array under a fixed
//! store key) as an in-memory value with explicit, observable staleness:
//! the first [`read`](CachedList::read) lazily loads from the store, and
//! [`save`](CachedList::save) writes through to the store before the new
//! snapshot becomes visible to readers. A failed save leaves the previous
//! snapshot intact, so readers never observe a partial mutation.
//!
//! # Concurrency
//!
//! This type assumes a single active writer (the running app instance).
//! Two overlapping saves race on a last-write-wins basis with no merge;
//! that is an accepted limitation of the design, not something this type
//! attempts to fix. Porting to a multi-process or multi-device context
//! would require a versioned-write or optimistic-concurrency scheme.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{Result, StorageError};
use crate::store::KeyValueStore;

/// Load state of a cached list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListState {
    /// Never read from the store; readers see the default.
    Uninitialized,
    /// Snapshot reflects the last successful load or save.
    Ready,
    /// The last load or save failed; readers see the last-known-good
    /// snapshot (or the default if nothing was ever loaded).
    Failed,
}

/// A named persisted list with an in-memory snapshot.
pub struct CachedList<T> {
    store: Arc<dyn KeyValueStore>,
    key: String,
    default: Vec<T>,
    snapshot: Option<Vec<T>>,
    state: ListState,
    last_error: Option<String>,
}

impl<T> CachedList<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    /// Create a cached list over `key` with `default` as the fallback value.
    ///
    /// Nothing is read from the store until the first [`read`](Self::read)
    /// or [`refresh`](Self::refresh).
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>, default: Vec<T>) -> Self {
        Self {
            store,
            key: key.into(),
            default,
            snapshot: None,
            state: ListState::Uninitialized,
            last_error: None,
        }
    }

    /// The store key this list is persisted under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current load state.
    #[must_use]
    pub const fn state(&self) -> ListState {
        self.state
    }

    /// The failure message from the last load or save, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Current snapshot, loading from the store on first use.
    ///
    /// Never fails from the caller's perspective: a load failure is
    /// recorded (see [`state`](Self::state) / [`last_error`](Self::last_error))
    /// and the default value is returned until a later load succeeds.
    pub fn read(&mut self) -> &[T] {
        if self.state == ListState::Uninitialized
            && let Err(e) = self.reload()
        {
            warn!("Initial load of '{}' failed: {}", self.key, e);
        }
        self.snapshot.as_deref().unwrap_or(&self.default)
    }

    /// Re-read the list from the store, replacing the snapshot on success.
    ///
    /// An absent key is not an error: the snapshot becomes the default.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ReadFailed`] when the medium fails or the
    /// stored bytes cannot be deserialized. The previous snapshot is kept.
    pub fn refresh(&mut self) -> Result<&[T]> {
        self.reload()?;
        Ok(self.snapshot.as_deref().unwrap_or(&self.default))
    }

    fn reload(&mut self) -> Result<()> {
        let loaded = self.store.get(&self.key).and_then(|raw| match raw {
            None => Ok(None),
            Some(raw) => serde_json::from_str::<Vec<T>>(&raw).map(Some).map_err(|e| {
                StorageError::ReadFailed {
                    key: self.key.clone(),
                    reason: format!("Stored value is not a valid list: {e}"),
                }
                .into()
            }),
        });

        match loaded {
            Ok(value) => {
                debug!(
                    "Loaded '{}' ({} entries)",
                    self.key,
                    value.as_ref().map_or(0, Vec::len)
                );
                self.snapshot = value;
                self.state = ListState::Ready;
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                self.state = ListState::Failed;
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Write `value` through to the store, then make it the snapshot.
    ///
    /// The underlying write completes before the new value becomes visible
    /// to subsequent reads, so a caller awaiting this save observes its own
    /// write. On failure the previous snapshot is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::WriteFailed`] when the medium rejects the
    /// write, or a serialization error if the value cannot be encoded.
    pub fn save(&mut self, value: Vec<T>) -> Result<&[T]> {
        let raw = serde_json::to_string(&value)?;
        match self.store.set(&self.key, &raw) {
            Ok(()) => {
                debug!("Saved '{}' ({} entries)", self.key, value.len());
                self.snapshot = Some(value);
                self.state = ListState::Ready;
                self.last_error = None;
                Ok(self.snapshot.as_deref().unwrap_or(&self.default))
            }
            Err(e) => {
                warn!("Save of '{}' failed: {}", self.key, e);
                self.state = ListState::Failed;
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}
