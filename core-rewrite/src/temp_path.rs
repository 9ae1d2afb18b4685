//! # Temp Sibling Paths
//!
//! Derives collision-resistant temporary paths next to a target file:
//! `a/b/c.mp3` becomes `a/b/.tmp12345-c.mp3`. Keeping the temp file in the
//! same directory keeps the final rename on one filesystem, which is what
//! makes the publish step atomic.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use rand::Rng;
use tracing::debug;

use crate::error::TempPathError;

/// Length of the inserted `.tmpNNNNN-` prefix.
const PREFIX_LEN: usize = 10;

/// Attempts before exclusive reservation gives up.
const RESERVE_ATTEMPTS: usize = 8;

/// Derive a temp sibling path for `path`.
///
/// Inserts `.tmp` + five random decimal digits + `-` in front of the file
/// name. Fails with [`TempPathError::PathTooLong`] when the result would
/// exceed `max_len` (a caller policy, not an OS limit) and with
/// [`TempPathError::NotAFile`] when `path` is empty or ends in a separator.
///
/// The five-digit space makes collisions rare, not impossible; callers that
/// need a guaranteed-fresh file should use [`reserve_temp_sibling`].
pub fn temp_sibling(path: &Path, max_len: usize) -> Result<PathBuf, TempPathError> {
    let n = rand::rng().random_range(0..100_000);
    temp_sibling_numbered(path, max_len, n)
}

fn temp_sibling_numbered(
    path: &Path,
    max_len: usize,
    n: u32,
) -> Result<PathBuf, TempPathError> {
    let raw = path.to_string_lossy();
    if raw.is_empty() || raw.ends_with(std::path::is_separator) {
        return Err(TempPathError::NotAFile(raw.into_owned()));
    }

    let len = raw.len() + PREFIX_LEN;
    if len > max_len {
        return Err(TempPathError::PathTooLong { len, max: max_len });
    }

    // The guard above ensures a final component exists.
    let file_name = path
        .file_name()
        .ok_or_else(|| TempPathError::NotAFile(raw.clone().into_owned()))?
        .to_string_lossy();

    Ok(path.with_file_name(format!(".tmp{:05}-{}", n, file_name)))
}

/// Derive and exclusively reserve a temp sibling path.
///
/// Creates the candidate with `create_new` so two concurrent runs on the
/// same original can never share a temp path; on a name collision the
/// candidate is rerolled, up to eight times. The reserved
/// placeholder file is left on disk for the caller to overwrite.
pub fn reserve_temp_sibling(path: &Path, max_len: usize) -> Result<PathBuf, TempPathError> {
    for _ in 0..RESERVE_ATTEMPTS {
        let candidate = temp_sibling(path, max_len)?;
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(_) => {
                debug!("Reserved temp path {}", candidate.display());
                return Ok(candidate);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                debug!("Temp path {} taken, rerolling", candidate.display());
                continue;
            }
            Err(e) => return Err(TempPathError::Io(e)),
        }
    }

    Err(TempPathError::Exhausted(RESERVE_ATTEMPTS))
}
