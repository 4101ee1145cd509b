//! Data model for the persisted gallery.
//!
//! All persisted records serialize as camelCase JSON, matching the arrays
//! the mobile app stores under its fixed storage keys. There is no schema
//! version field: a field absent on read means the record predates that
//! field, and its serde default applies.

use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::encoder::Resolution;

/// One owned video in the gallery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    /// Unique, stable id assigned at creation (UUID v4).
    pub id: String,
    /// Display name. Mutable via rename.
    pub title: String,
    /// Path to the media file. Immutable after creation.
    pub uri: String,
    /// Duration in seconds.
    pub duration: f64,
    /// Creation timestamp, RFC 3339.
    pub date: String,
    /// File size in bytes.
    pub size: u64,
    /// Favorite flag. Records written before this field existed read as false.
    #[serde(default)]
    pub is_favorite: bool,
}

impl VideoItem {
    /// Create a new item with a fresh id and the current time as its date.
    #[must_use]
    pub fn new(title: impl Into<String>, uri: impl Into<String>, duration: f64, size: u64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            uri: uri.into(),
            duration,
            date: Utc::now().to_rfc3339(),
            size,
            is_favorite: false,
        }
    }
}

/// Status of a tracked transcode job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DownloadStatus {
    /// Created but not yet started.
    #[default]
    Idle,
    /// Transcode in progress.
    Downloading,
    /// Output produced successfully.
    Done,
    /// Transcode failed.
    Error,
}

impl std::fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Downloading => write!(f, "downloading"),
            Self::Done => write!(f, "done"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One tracked transcode job, persisted alongside the video lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DownloadItem {
    /// Unique job id (UUID v4).
    pub id: String,
    /// Display name, taken from the picked file name.
    pub title: String,
    /// Target resolution of the transcode.
    pub resolution: Resolution,
    /// Progress in the range 0.0 - 1.0.
    pub progress: f32,
    /// Current job status.
    #[serde(default)]
    pub status: DownloadStatus,
    /// Path the encoder writes to.
    pub output_path: String,
    /// Output size in bytes. Zero until the job completes.
    pub size: u64,
    /// Creation timestamp, RFC 3339.
    pub created_at: String,
}

impl DownloadItem {
    /// Create a new idle job with a fresh id.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        resolution: Resolution,
        output_path: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            resolution,
            progress: 0.0,
            status: DownloadStatus::Idle,
            output_path: output_path.into(),
            size: 0,
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

/// A video selected through the platform media picker.
///
/// The picker itself is outside this crate; this is the value it hands over.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PickedMedia {
    /// Path to the selected asset.
    pub path: PathBuf,
    /// Original file name of the asset.
    pub file_name: String,
    /// Size in bytes as reported by the picker.
    pub size: u64,
    /// Duration in seconds as reported by the picker.
    pub duration: f64,
}
