//! The persisted video library.
//!
//! [`VideoLibrary`] owns the three cached lists (owned videos, recently
//! played, download jobs) over one shared [`KeyValueStore`], applies the
//! pure operations from [`crate::ops`], and persists the results. All
//! reads hand out value copies; the two video lists are independent
//! aggregates whose cross-consistency is maintained only by the explicit
//! cross-updates here.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::CachedList;
use crate::error::Result;
use crate::model::{DownloadItem, VideoItem};
use crate::ops;
use crate::store::KeyValueStore;

/// Storage key for the owned-video list.
pub const OWNED_VIDEOS_KEY: &str = "VideoItemList";
/// Storage key for the recently-played list.
pub const RECENTLY_PLAYED_KEY: &str = "RecentlyPlayedList";
/// Storage key for the download-job list.
pub const DOWNLOADS_KEY: &str = "DownloadList";

/// Data-access service over the persisted gallery lists.
///
/// Screens depend on this service through injection rather than ambient
/// globals; it assumes a single logical writer (see [`CachedList`] for the
/// overlapping-save semantics).
pub struct VideoLibrary {
    owned: CachedList<VideoItem>,
    recent: CachedList<VideoItem>,
    downloads: CachedList<DownloadItem>,
}

impl VideoLibrary {
    /// Create a library over `store`. Lists load lazily on first read.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            owned: CachedList::new(Arc::clone(&store), OWNED_VIDEOS_KEY, Vec::new()),
            recent: CachedList::new(Arc::clone(&store), RECENTLY_PLAYED_KEY, Vec::new()),
            downloads: CachedList::new(store, DOWNLOADS_KEY, Vec::new()),
        }
    }

    /// Current owned-video list.
    pub fn videos(&mut self) -> Vec<VideoItem> {
        self.owned.read().to_vec()
    }

    /// Current recently-played list, most recent first.
    pub fn recently_played(&mut self) -> Vec<VideoItem> {
        self.recent.read().to_vec()
    }

    /// Current download-job list.
    pub fn downloads(&mut self) -> Vec<DownloadItem> {
        self.downloads.read().to_vec()
    }

    /// Append a newly imported video to the owned list.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the save fails; the previous list stays
    /// visible to readers.
    pub fn add_video(&mut self, video: VideoItem) -> Result<Vec<VideoItem>> {
        let mut updated = self.owned.read().to_vec();
        info!("Adding video '{}' ({})", video.title, video.id);
        updated.push(video);
        Ok(self.owned.save(updated)?.to_vec())
    }

    /// Flip the favorite flag on the video with `id`.
    ///
    /// A missing id is a no-op that still returns the (unchanged) list.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the save fails.
    pub fn toggle_favorite(&mut self, id: &str) -> Result<Vec<VideoItem>> {
        let updated = ops::toggle_favorite(id, self.owned.read());
        debug!("Toggling favorite for {}", id);
        Ok(self.owned.save(updated)?.to_vec())
    }

    /// Rename the video with `id` to `new_title`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidTitle`] for empty or whitespace-only
    /// titles (checked before the list is touched), or a storage error if
    /// the save fails. A missing id is a no-op.
    pub fn rename_video(&mut self, id: &str, new_title: &str) -> Result<Vec<VideoItem>> {
        ops::validate_title(new_title)?;
        let updated = ops::rename(id, new_title, self.owned.read());
        debug!("Renaming {} to '{}'", id, new_title);
        Ok(self.owned.save(updated)?.to_vec())
    }

    /// Remove the video with `id` from the owned list and the
    /// recently-played list.
    ///
    /// The two saves are issued in order with no rollback: if the second
    /// fails after the first succeeded, the video is gone from the owned
    /// list but still referenced by the play history - an inconsistent but
    /// recoverable state that is reported to the caller, not hidden.
    ///
    /// # Errors
    ///
    /// Returns the storage error of whichever save failed.
    pub fn delete_video(&mut self, id: &str) -> Result<()> {
        let (owned, recent) = ops::delete_video(id, self.owned.read(), self.recent.read());
        info!("Deleting video {}", id);
        self.owned.save(owned)?;
        if let Err(e) = self.recent.save(recent) {
            warn!(
                "Video {} removed from owned list but its recently-played entry could not be \
                 updated: {}",
                id, e
            );
            return Err(e);
        }
        Ok(())
    }

    /// Record a play of the video with `id`: promote it to the front of
    /// the recently-played list and return a copy for playback.
    ///
    /// The promoted entry is a fresh snapshot of the owned item, so it
    /// carries current metadata (title, favorite flag). A missing id is a
    /// no-op returning `None`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the recently-played save fails.
    pub fn mark_played(&mut self, id: &str) -> Result<Option<VideoItem>> {
        let Some(video) = self.owned.read().iter().find(|v| v.id == id).cloned() else {
            debug!("mark_played: {} not in owned list, ignoring", id);
            return Ok(None);
        };
        let updated = ops::add_or_promote_recent(video.clone(), self.recent.read());
        self.recent.save(updated)?;
        Ok(Some(video))
    }

    /// Record a new transcode job.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the save fails.
    pub fn record_download(&mut self, job: DownloadItem) -> Result<Vec<DownloadItem>> {
        let mut updated = self.downloads.read().to_vec();
        debug!("Recording download job {} ({})", job.id, job.status);
        updated.push(job);
        Ok(self.downloads.save(updated)?.to_vec())
    }

    /// Update the transcode job with `id` in place.
    ///
    /// A missing id is a no-op.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the save fails.
    pub fn update_download(
        &mut self,
        id: &str,
        update: impl FnOnce(&mut DownloadItem),
    ) -> Result<Vec<DownloadItem>> {
        let mut updated = self.downloads.read().to_vec();
        if let Some(job) = updated.iter_mut().find(|j| j.id == id) {
            update(job);
        }
        Ok(self.downloads.save(updated)?.to_vec())
    }
}
