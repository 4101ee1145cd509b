//! Async command facade over the video library.
//!
//! The UI shell drives the gallery through explicit commands that return a
//! `Result`, and observes list changes through `tokio::sync::watch`
//! subscriptions instead of embedding persistence calls in event handlers.
//! All mutations funnel through one shared [`VideoLibrary`], preserving the
//! single-logical-writer model; while a save is in flight, subscribers
//! continue to observe the previous snapshot. In-flight saves are never
//! cancelled.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{RwLock, watch};
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::encoder::{FfmpegEncoder, Resolution, VideoEncoder};
use crate::error::{Error, Result};
use crate::import::import_video;
use crate::library::VideoLibrary;
use crate::model::{DownloadItem, PickedMedia, VideoItem};
use crate::store::FileStore;

/// Command layer the UI talks to.
///
/// Screens share one instance (typically behind an `Arc`), so every screen
/// observes the same underlying library.
pub struct GalleryService {
    library: Arc<RwLock<VideoLibrary>>,
    encoder: Arc<dyn VideoEncoder>,
    media_dir: PathBuf,
    owned_tx: watch::Sender<Vec<VideoItem>>,
    recent_tx: watch::Sender<Vec<VideoItem>>,
}

impl GalleryService {
    /// Create a service over an existing library and encoder.
    #[must_use]
    pub fn new(
        mut library: VideoLibrary,
        encoder: Arc<dyn VideoEncoder>,
        media_dir: PathBuf,
    ) -> Self {
        let (owned_tx, _) = watch::channel(library.videos());
        let (recent_tx, _) = watch::channel(library.recently_played());
        Self {
            library: Arc::new(RwLock::new(library)),
            encoder,
            media_dir,
            owned_tx,
            recent_tx,
        }
    }

    /// Wire up the production service from configuration: a file-backed
    /// store in the data directory and an ffmpeg encoder.
    ///
    /// # Errors
    ///
    /// Returns an error if the store directory cannot be created.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let store = FileStore::new(&config.data_directory)?;
        let library = VideoLibrary::new(Arc::new(store));
        let encoder = Arc::new(FfmpegEncoder::new(config.encoder.clone()));
        info!(
            "Gallery service ready (data: {}, media: {})",
            config.data_directory.display(),
            config.media_directory.display()
        );
        Ok(Self::new(library, encoder, config.media_directory.clone()))
    }

    /// Current owned-video list.
    pub async fn videos(&self) -> Vec<VideoItem> {
        self.library.write().await.videos()
    }

    /// Current recently-played list, most recent first.
    pub async fn recently_played(&self) -> Vec<VideoItem> {
        self.library.write().await.recently_played()
    }

    /// Current download-job list.
    pub async fn downloads(&self) -> Vec<DownloadItem> {
        self.library.write().await.downloads()
    }

    /// Observe the owned-video list. The receiver holds the snapshot as of
    /// subscription and is notified on every successful mutation.
    #[must_use]
    pub fn subscribe_videos(&self) -> watch::Receiver<Vec<VideoItem>> {
        self.owned_tx.subscribe()
    }

    /// Observe the recently-played list.
    #[must_use]
    pub fn subscribe_recent(&self) -> watch::Receiver<Vec<VideoItem>> {
        self.recent_tx.subscribe()
    }

    /// Flip the favorite flag on a video.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the save fails (subscribers keep the
    /// previous snapshot).
    pub async fn toggle_favorite(&self, id: &str) -> Result<Vec<VideoItem>> {
        let mut library = self.library.write().await;
        let updated = library.toggle_favorite(id)?;
        self.owned_tx.send_replace(updated.clone());
        Ok(updated)
    }

    /// Rename a video. The new title is validated before anything is
    /// touched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTitle`] for blank titles, or a storage
    /// error if the save fails.
    pub async fn rename(&self, id: &str, new_title: &str) -> Result<Vec<VideoItem>> {
        let mut library = self.library.write().await;
        let updated = library.rename_video(id, new_title)?;
        self.owned_tx.send_replace(updated.clone());
        Ok(updated)
    }

    /// Delete a video from the gallery and the play history.
    ///
    /// Both subscriptions are refreshed with whatever state the two-phase
    /// delete left behind, including the documented
    /// partial-failure case where the owned-list write landed but the
    /// recently-played write did not.
    ///
    /// # Errors
    ///
    /// Returns the storage error of whichever save failed.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let mut library = self.library.write().await;
        let result = library.delete_video(id);
        self.owned_tx.send_replace(library.videos());
        self.recent_tx.send_replace(library.recently_played());
        result
    }

    /// Record a play: promote the video in the recently-played list and
    /// return a copy for the player. Unknown ids return `None`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the history save fails.
    pub async fn play(&self, id: &str) -> Result<Option<VideoItem>> {
        let mut library = self.library.write().await;
        let video = library.mark_played(id)?;
        if video.is_some() {
            debug!("Playing {}", id);
            self.recent_tx.send_replace(library.recently_played());
        }
        Ok(video)
    }

    /// Import a picked video, transcoding it to `resolution`.
    ///
    /// The encode runs on the blocking pool; the snapshot subscribers are
    /// notified once the import lands.
    ///
    /// # Errors
    ///
    /// Returns an encoder error if the transcode fails, or a storage error
    /// if persisting the result fails.
    pub async fn import(&self, picked: PickedMedia, resolution: Resolution) -> Result<VideoItem> {
        let library = Arc::clone(&self.library);
        let encoder = Arc::clone(&self.encoder);
        let media_dir = self.media_dir.clone();

        let result = tokio::task::spawn_blocking(move || {
            let mut library = library.blocking_write();
            import_video(&mut library, encoder.as_ref(), &media_dir, &picked, resolution)
        })
        .await
        .map_err(|e| Error::Task(format!("import task join error: {e}")))?;

        let item = result?;
        self.owned_tx
            .send_replace(self.library.write().await.videos());
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{EncodeOutcome, MockVideoEncoder};
    use crate::error::EncoderError;
    use tempfile::TempDir;

    struct Fixture {
        _data_dir: TempDir,
        media_dir: TempDir,
        service: GalleryService,
    }

    fn fixture_with_encoder(encoder: MockVideoEncoder) -> Fixture {
        let data_dir = TempDir::new().expect("data dir");
        let media_dir = TempDir::new().expect("media dir");
        let store = FileStore::new(data_dir.path()).expect("store");
        let library = VideoLibrary::new(Arc::new(store));
        let service = GalleryService::new(
            library,
            Arc::new(encoder),
            media_dir.path().to_path_buf(),
        );
        Fixture {
            _data_dir: data_dir,
            media_dir,
            service,
        }
    }

    fn fixture() -> Fixture {
        fixture_with_encoder(MockVideoEncoder::new())
    }

    fn picked() -> PickedMedia {
        PickedMedia {
            path: PathBuf::from("/picker/holiday.mov"),
            file_name: "holiday.mov".to_string(),
            size: 10_000,
            duration: 42.5,
        }
    }

    async fn seed_video(service: &GalleryService, id: &str, title: &str) {
        let video = VideoItem {
            id: id.to_string(),
            title: title.to_string(),
            uri: format!("/videos/{id}.mp4"),
            duration: 30.0,
            date: "2024-05-01T10:00:00Z".to_string(),
            size: 2048,
            is_favorite: false,
        };
        service
            .library
            .write()
            .await
            .add_video(video)
            .expect("seed");
    }

    #[tokio::test]
    async fn test_toggle_favorite_notifies_subscribers() {
        let fixture = fixture();
        seed_video(&fixture.service, "1", "A").await;

        let mut rx = fixture.service.subscribe_videos();
        fixture.service.toggle_favorite("1").await.expect("toggle");

        assert!(rx.has_changed().expect("channel open"));
        assert!(rx.borrow_and_update()[0].is_favorite);
    }

    #[tokio::test]
    async fn test_rename_rejects_blank_titles() {
        let fixture = fixture();
        seed_video(&fixture.service, "1", "A").await;

        let err = fixture
            .service
            .rename("1", "   ")
            .await
            .expect_err("rename should fail");
        assert!(matches!(err, Error::InvalidTitle(_)));
        assert_eq!(fixture.service.videos().await[0].title, "A");
    }

    #[tokio::test]
    async fn test_play_promotes_and_notifies_recent_subscribers() {
        let fixture = fixture();
        seed_video(&fixture.service, "1", "A").await;
        seed_video(&fixture.service, "2", "B").await;

        let mut rx = fixture.service.subscribe_recent();
        fixture.service.play("2").await.expect("play");
        let played = fixture
            .service
            .play("1")
            .await
            .expect("play")
            .expect("known id");
        assert_eq!(played.id, "1");

        let recent = rx.borrow_and_update().clone();
        assert_eq!(recent[0].id, "1");
        assert_eq!(recent[1].id, "2");
    }

    #[tokio::test]
    async fn test_play_unknown_id_is_noop() {
        let fixture = fixture();
        assert!(fixture.service.play("99").await.expect("play").is_none());
        assert!(fixture.service.recently_played().await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_updates_both_subscriptions() {
        let fixture = fixture();
        seed_video(&fixture.service, "1", "A").await;
        seed_video(&fixture.service, "2", "B").await;
        fixture.service.play("1").await.expect("play");

        let mut owned_rx = fixture.service.subscribe_videos();
        let mut recent_rx = fixture.service.subscribe_recent();
        fixture.service.delete("1").await.expect("delete");

        assert!(owned_rx.borrow_and_update().iter().all(|v| v.id != "1"));
        assert!(recent_rx.borrow_and_update().iter().all(|v| v.id != "1"));
    }

    #[tokio::test]
    async fn test_import_runs_encoder_and_publishes_result() {
        let mut encoder = MockVideoEncoder::new();
        encoder.expect_encode().times(1).returning(|req| {
            Ok(EncodeOutcome {
                output: req.output.clone(),
                size_bytes: 512,
            })
        });
        let fixture = fixture_with_encoder(encoder);

        let mut rx = fixture.service.subscribe_videos();
        let item = fixture
            .service
            .import(picked(), Resolution::P360)
            .await
            .expect("import");

        assert_eq!(item.size, 512);
        assert!(
            item.uri
                .starts_with(&fixture.media_dir.path().display().to_string())
        );
        assert_eq!(rx.borrow_and_update().len(), 1);

        let jobs = fixture.service.downloads().await;
        assert_eq!(jobs.len(), 1);
    }

    #[tokio::test]
    async fn test_import_failure_surfaces_encoder_error() {
        let mut encoder = MockVideoEncoder::new();
        encoder.expect_encode().returning(|_| {
            Err(EncoderError::EmptyOutput {
                path: PathBuf::from("/out/never.mp4"),
            }
            .into())
        });
        let fixture = fixture_with_encoder(encoder);

        let err = fixture
            .service
            .import(picked(), Resolution::P720)
            .await
            .expect_err("import should fail");
        assert!(matches!(err, Error::Encoder(_)));
        assert!(fixture.service.videos().await.is_empty());
    }
}
