//! Pure list-mutation operations.
//!
//! Each operation takes the current snapshot(s) plus an intent and computes
//! a new list value with no other side effects; persisting the result is
//! the caller's job (see [`crate::library::VideoLibrary`]). An id that is
//! not present in the target list is a silent no-op, never an error.

use crate::error::{Error, Result};
use crate::model::VideoItem;

/// Flip the favorite flag on the entry whose id matches.
///
/// All other entries are returned unchanged; a missing id yields the input
/// list as-is.
#[must_use]
pub fn toggle_favorite(id: &str, list: &[VideoItem]) -> Vec<VideoItem> {
    list.iter()
        .map(|item| {
            if item.id == id {
                VideoItem {
                    is_favorite: !item.is_favorite,
                    ..item.clone()
                }
            } else {
                item.clone()
            }
        })
        .collect()
}

/// Set the title on the entry whose id matches.
///
/// Title validation happens before this operation is invoked (see
/// [`validate_title`]); a missing id yields the input list as-is.
#[must_use]
pub fn rename(id: &str, new_title: &str, list: &[VideoItem]) -> Vec<VideoItem> {
    list.iter()
        .map(|item| {
            if item.id == id {
                VideoItem {
                    title: new_title.to_string(),
                    ..item.clone()
                }
            } else {
                item.clone()
            }
        })
        .collect()
}

/// Remove the entry with `id` from both the owned list and the
/// recently-played list.
///
/// The two result lists keep the two aggregates referentially consistent:
/// a deleted video must not linger in the play history.
#[must_use]
pub fn delete_video(
    id: &str,
    owned: &[VideoItem],
    recent: &[VideoItem],
) -> (Vec<VideoItem>, Vec<VideoItem>) {
    (remove_by_id(id, owned), remove_by_id(id, recent))
}

/// Remove the entry with `id` from a single list.
#[must_use]
pub fn remove_by_id(id: &str, list: &[VideoItem]) -> Vec<VideoItem> {
    list.iter().filter(|item| item.id != id).cloned().collect()
}

/// Prepend `video` to the recently-played list, removing any prior
/// occurrence of the same id first.
///
/// The result is ordered most-recent-first and contains at most one entry
/// per id. The prepended copy may carry refreshed metadata (e.g. an
/// updated favorite flag), which is why the old occurrence is dropped
/// rather than moved.
#[must_use]
pub fn add_or_promote_recent(video: VideoItem, recent: &[VideoItem]) -> Vec<VideoItem> {
    let id = video.id.clone();
    let mut updated = Vec::with_capacity(recent.len() + 1);
    updated.push(video);
    updated.extend(recent.iter().filter(|item| item.id != id).cloned());
    updated
}

/// Reject empty or whitespace-only titles.
///
/// # Errors
///
/// Returns [`Error::InvalidTitle`] when the title contains no visible
/// characters.
pub fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::InvalidTitle(
            "title must not be empty or whitespace-only".to_string(),
        ));
    }
    Ok(())
}
