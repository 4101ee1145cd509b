//! Import flow: transcode a picked video and add it to the gallery.
//!
//! One import is one external encoder invocation. The flow records a
//! download job before the transcode starts and transitions it to done or
//! error afterwards, so the jobs list reflects every attempt. An encoder
//! failure aborts that single import; nothing is retried.

use std::fs;
use std::path::Path;

use chrono::Utc;
use tracing::{info, warn};

use crate::encoder::{EncodeRequest, Resolution, VideoEncoder};
use crate::error::Result;
use crate::library::VideoLibrary;
use crate::model::{DownloadItem, DownloadStatus, PickedMedia, VideoItem};

/// Transcode `picked` to `resolution` and append the result to the owned
/// list.
///
/// The encoded file is written into `media_dir` under a timestamped name.
/// Returns the newly created [`VideoItem`] on success.
///
/// # Errors
///
/// Returns an encoder error when the transcode fails (the owned list is
/// left untouched and the download job is marked errored), or a storage
/// error when persisting the new video fails.
pub fn import_video(
    library: &mut VideoLibrary,
    encoder: &dyn VideoEncoder,
    media_dir: &Path,
    picked: &PickedMedia,
    resolution: Resolution,
) -> Result<VideoItem> {
    fs::create_dir_all(media_dir)?;
    let output = media_dir.join(format!(
        "output_{resolution}_{}.mp4",
        Utc::now().timestamp_millis()
    ));

    let mut job = DownloadItem::new(
        picked.file_name.as_str(),
        resolution,
        output.display().to_string(),
    );
    job.status = DownloadStatus::Downloading;
    let job_id = job.id.clone();
    library.record_download(job)?;

    info!(
        "Importing '{}' at {} -> {}",
        picked.file_name,
        resolution,
        output.display()
    );

    let request = EncodeRequest {
        input: picked.path.clone(),
        output,
        resolution,
    };
    let outcome = match encoder.encode(&request) {
        Ok(outcome) => outcome,
        Err(e) => {
            if let Err(update_err) = library.update_download(&job_id, |j| {
                j.status = DownloadStatus::Error;
            }) {
                warn!("Could not mark job {} as errored: {}", job_id, update_err);
            }
            return Err(e);
        }
    };

    let item = VideoItem::new(
        picked.file_name.as_str(),
        outcome.output.display().to_string(),
        picked.duration,
        outcome.size_bytes,
    );
    library.add_video(item.clone())?;

    // Job bookkeeping only; the import itself already succeeded.
    if let Err(e) = library.update_download(&job_id, |j| {
        j.status = DownloadStatus::Done;
        j.progress = 1.0;
        j.size = outcome.size_bytes;
    }) {
        warn!("Could not mark job {} as done: {}", job_id, e);
    }

    Ok(item)
}
