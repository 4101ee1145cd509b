//! Error types for VidVault core operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the persistence medium.
///
/// An absent key is never an error; these cover the cases where the medium
/// itself fails or the stored bytes cannot be turned back into a value.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading the value stored under a key failed.
    #[error("Failed to read stored value for '{key}': {reason}")]
    ReadFailed {
        /// Storage key being read.
        key: String,
        /// Underlying failure.
        reason: String,
    },

    /// Writing a value under a key failed. The previous value is untouched.
    #[error("Failed to write value for '{key}': {reason}")]
    WriteFailed {
        /// Storage key being written.
        key: String,
        /// Underlying failure.
        reason: String,
    },
}

/// Errors raised by the external transcode process.
#[derive(Debug, Error)]
pub enum EncoderError {
    /// The encoder binary could not be launched.
    #[error("Encoder binary not found: {binary}")]
    BinaryNotFound {
        /// Configured binary path.
        binary: PathBuf,
    },

    /// The input file does not exist.
    #[error("Encoder input not found: {path}")]
    InputMissing {
        /// Missing input path.
        path: PathBuf,
    },

    /// The encoder process exited with a non-zero status.
    #[error("Encoder exited with status {code:?}: {stderr}")]
    ExitFailure {
        /// Process exit code, if any.
        code: Option<i32>,
        /// Captured stderr, trimmed.
        stderr: String,
    },

    /// The encoder exited successfully but produced no usable output.
    #[error("Encoder produced no output at {path}")]
    EmptyOutput {
        /// Expected output path.
        path: PathBuf,
    },
}

/// Errors that can occur in VidVault core operations.
///
/// A mutation targeting an id that is not present in a list is deliberately
/// *not* represented here: missing ids resolve as silent no-ops.
#[derive(Debug, Error)]
pub enum Error {
    /// Persistence medium failure.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// External transcode failure.
    #[error(transparent)]
    Encoder(#[from] EncoderError),

    /// A rename target that is empty or whitespace-only.
    #[error("Invalid title: {0}")]
    InvalidTitle(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A background task failed to run to completion.
    #[error("Task failed: {0}")]
    Task(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
