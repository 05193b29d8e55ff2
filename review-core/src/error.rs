//! Error types for review operations.

use std::path::PathBuf;
use thiserror::Error;

/// Review result type alias
pub type Result<T> = std::result::Result<T, ReviewError>;

/// Failures surfaced by the taxonomy, store, sample list and session.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// Trigger key is neither bound in the taxonomy nor a custom slot.
    #[error("Trigger {0:?} is not bound in the taxonomy and is not a custom slot")]
    UnknownTrigger(String),

    #[error("Sample index {index} is out of range (sample list has {size} entries)")]
    IndexOutOfRange { index: usize, size: usize },

    #[error("No .{extension} files found in {folder}")]
    EmptySampleList { folder: PathBuf, extension: String },

    /// Backing store exists but cannot be parsed. Never auto-repaired.
    #[error("Correction store corrupted at {path}: {reason}")]
    CorruptStore { path: PathBuf, reason: String },

    #[error("Invalid layout {path}: {reason}")]
    InvalidLayout { path: PathBuf, reason: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize correction record: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("No sample is being reviewed")]
    NotReviewing,
}

impl ReviewError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReviewError::Io {
            path: path.into(),
            source,
        }
    }
}
