//! VidVault Core Library
//!
//! This crate provides the core functionality for the VidVault application:
//! - Key-value persistence for the gallery lists
//! - Cached list snapshots with explicit save-through semantics
//! - The gallery mutation operations (favorite, rename, delete, play history)
//! - Transcode-on-import via an external encoder process
//! - Application configuration and logging setup
//!
//! The UI shell drives everything through [`GalleryService`]; the lower
//! layers are public so tests and embedders can compose them directly.

pub mod cache;
pub mod config;
pub mod encoder;
pub mod error;
pub mod format;
pub mod import;
pub mod library;
pub mod logging;
pub mod model;
pub mod ops;
pub mod service;
pub mod store;

pub use cache::{CachedList, ListState};
pub use config::{AppConfig, ConfigManager, default_data_directory, default_media_directory};
pub use encoder::{
    EncodeOutcome, EncodeRequest, EncoderConfig, FfmpegEncoder, Resolution, VideoEncoder,
};
pub use error::{EncoderError, Error, Result, StorageError};
pub use format::{format_date, format_duration};
pub use import::import_video;
pub use library::{
    DOWNLOADS_KEY, OWNED_VIDEOS_KEY, RECENTLY_PLAYED_KEY, VideoLibrary,
};
pub use logging::{LoggingConfig, LoggingGuard, init_auto};
pub use model::{DownloadItem, DownloadStatus, PickedMedia, VideoItem};
pub use ops::{add_or_promote_recent, delete_video, rename, toggle_favorite, validate_title};
pub use service::GalleryService;
pub use store::{FileStore, KeyValueStore};
