//! # Verified Rewrite Orchestrator
//!
//! The state machine bracketing a risky tag rewrite with two decode passes:
//!
//! ```text
//! Idle -> FingerprintingOriginal -> ApplyingEdits -> FingerprintingTemp
//!      -> Verifying -> Publishing -> Done
//! ```
//!
//! A terminal `Aborted` is reachable from every non-terminal phase; the
//! mapping from abort cause to [`RewriteError`] variant lives in
//! [`crate::error`]. The run is single-threaded, synchronous, and blocking,
//! and the final rename is the only externally visible change to the
//! original path.

use std::fs;
use std::path::{Path, PathBuf};

use core_scan::{AudioScanner, Fingerprint, ScanError};
use core_tags::{TagEdit, TagEditor, TagError};
use tracing::{debug, info};

use crate::error::{Result, RewriteError};
use crate::temp_path::reserve_temp_sibling;

/// Minimum plausible normalized byte count for a decode session. Anything
/// below this is treated as a degenerate decode rather than a valid
/// baseline.
pub const MIN_PLAUSIBLE_BYTES: u64 = 1024;

/// Length budget for derived temp paths.
const PATH_BUDGET: usize = 4096;

/// Phases of one rewrite run, in order. `Aborted` is reachable from every
/// non-terminal phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    FingerprintingOriginal,
    ApplyingEdits,
    FingerprintingTemp,
    Verifying,
    Publishing,
    Done,
    Aborted,
}

/// Produces a fingerprint of a file's decoded audio.
///
/// Both calls within one run must use identical extraction configuration,
/// or the comparison is meaningless.
pub trait Fingerprinter {
    fn fingerprint(&self, path: &Path) -> std::result::Result<Fingerprint, ScanError>;
}

impl Fingerprinter for AudioScanner {
    fn fingerprint(&self, path: &Path) -> std::result::Result<Fingerprint, ScanError> {
        self.scan(path)
    }
}

/// Applies an ordered edit list to `source` and persists the result at
/// `dest`, leaving `source` untouched.
pub trait TagRewriter {
    fn rewrite(
        &self,
        source: &Path,
        dest: &Path,
        edits: &[TagEdit],
    ) -> std::result::Result<(), TagError>;
}

/// Production [`TagRewriter`] backed by [`TagEditor`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyRewriter;

impl TagRewriter for LoftyRewriter {
    fn rewrite(
        &self,
        source: &Path,
        dest: &Path,
        edits: &[TagEdit],
    ) -> std::result::Result<(), TagError> {
        let mut editor = TagEditor::open(source)?;
        editor.apply(edits);
        editor.save_as(dest)
    }
}

/// Successful run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutcome {
    /// Fingerprint of the original before the edit.
    pub before: Fingerprint,
    /// Fingerprint of the rewritten copy; equal to `before` by construction.
    pub after: Fingerprint,
    /// The path the verified copy was renamed over.
    pub published: PathBuf,
}

/// The verified rewrite state machine.
pub struct Rewriter<F, R> {
    fingerprinter: F,
    rewriter: R,
    min_plausible_bytes: u64,
}

impl<F: Fingerprinter, R: TagRewriter> Rewriter<F, R> {
    pub fn new(fingerprinter: F, rewriter: R) -> Self {
        Self {
            fingerprinter,
            rewriter,
            min_plausible_bytes: MIN_PLAUSIBLE_BYTES,
        }
    }

    /// Override the plausibility threshold.
    pub fn with_min_plausible_bytes(mut self, min: u64) -> Self {
        self.min_plausible_bytes = min;
        self
    }

    /// Run the full protocol for `original` with the ordered `edits`.
    ///
    /// On success the verified copy has atomically replaced `original`. On
    /// failure the original is untouched, and any temp file that was
    /// created stays on disk for inspection (see [`RewriteError`] for the
    /// per-variant details).
    pub fn run(&self, original: &Path, edits: &[TagEdit]) -> Result<RewriteOutcome> {
        self.enter(Phase::FingerprintingOriginal);
        info!("Scanning {}", original.display());
        let before = match self.fingerprinter.fingerprint(original) {
            Ok(fingerprint) => fingerprint,
            Err(e) => return self.abort(e.into()),
        };
        info!("before checksum: {:08x}", before.digest);
        info!("before byte count: {}", before.byte_count);

        if before.byte_count < self.min_plausible_bytes {
            return self.abort(RewriteError::ImplausiblyShort {
                actual: before.byte_count,
                min: self.min_plausible_bytes,
            });
        }

        self.enter(Phase::ApplyingEdits);
        let temp = match reserve_temp_sibling(original, PATH_BUDGET) {
            Ok(temp) => temp,
            Err(e) => return self.abort(e.into()),
        };
        info!("Saving as {}", temp.display());
        if let Err(e) = self.rewriter.rewrite(original, &temp, edits) {
            return self.abort(RewriteError::SaveFailed(e));
        }

        self.enter(Phase::FingerprintingTemp);
        info!("Scanning newly generated file");
        let after = match self.fingerprinter.fingerprint(&temp) {
            Ok(fingerprint) => fingerprint,
            Err(e) => return self.abort(e.into()),
        };
        info!("after checksum: {:08x}", after.digest);
        info!("after byte count: {}", after.byte_count);

        self.enter(Phase::Verifying);
        if before != after {
            return self.abort(RewriteError::ChecksumMismatch {
                before,
                after,
                temp,
            });
        }

        self.enter(Phase::Publishing);
        if let Err(e) = fs::rename(&temp, original) {
            return self.abort(RewriteError::PublishFailed { temp, source: e });
        }

        self.enter(Phase::Done);
        info!("Published {}", original.display());
        Ok(RewriteOutcome {
            before,
            after,
            published: original.to_path_buf(),
        })
    }

    fn enter(&self, phase: Phase) {
        debug!(?phase, "entering phase");
    }

    fn abort(&self, error: RewriteError) -> Result<RewriteOutcome> {
        self.enter(Phase::Aborted);
        Err(error)
    }
}
