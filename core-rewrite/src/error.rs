use std::path::PathBuf;

use core_scan::{Fingerprint, ScanError};
use core_tags::TagError;
use thiserror::Error;

/// Errors from temp sibling path generation and reservation.
#[derive(Error, Debug)]
pub enum TempPathError {
    /// The derived temp path would exceed the caller's length budget.
    #[error("Temp path would exceed length budget: {len} > {max}")]
    PathTooLong { len: usize, max: usize },

    /// The path is empty or ends in a separator, so it cannot name a file.
    #[error("Path does not name a file: {0}")]
    NotAFile(String),

    /// Every candidate name in the attempt budget already existed.
    #[error("Could not reserve a unique temp path after {0} attempts")]
    Exhausted(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors terminating a verified rewrite run.
///
/// Every failure is terminal for the run; no retries are attempted. Variants
/// that leave a temp file on disk say so — those files are kept on purpose
/// as a debugging aid, never silently deleted.
#[derive(Error, Debug)]
pub enum RewriteError {
    /// The original's decoded audio was below the plausibility threshold;
    /// aborted before any file was created.
    #[error("Decoded audio implausibly short: {actual} bytes (minimum {min})")]
    ImplausiblyShort { actual: u64, min: u64 },

    /// A decode session failed (either scan pass).
    #[error("Audio scan failed: {0}")]
    Scan(#[from] ScanError),

    /// The edited copy could not be persisted; the original is untouched.
    #[error("Failed to save edited copy: {0}")]
    SaveFailed(#[source] TagError),

    /// Post-edit audio differs from pre-edit audio. The temp file is kept
    /// for inspection.
    #[error(
        "Decoded audio changed: before {before}, after {after} (temp file kept at {})",
        temp.display()
    )]
    ChecksumMismatch {
        before: Fingerprint,
        after: Fingerprint,
        temp: PathBuf,
    },

    /// The atomic rename failed; both the untouched original and the
    /// verified temp file remain on disk.
    #[error("Failed to publish {}: {source}", temp.display())]
    PublishFailed {
        temp: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    TempPath(#[from] TempPathError),
}

pub type Result<T> = std::result::Result<T, RewriteError>;
