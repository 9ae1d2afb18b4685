//! # Verified Rewrite Module
//!
//! The verify-then-atomically-replace protocol: fingerprint the original
//! file's decoded audio, apply metadata edits to a temp sibling, fingerprint
//! the temp copy, compare, and only then rename the temp file over the
//! original.
//!
//! ## Overview
//!
//! This module handles:
//! - Collision-resistant temp sibling path generation and reservation
//! - The rewrite state machine with its abort policy
//! - Trait seams for the scan and tag-edit collaborators

pub mod error;
pub mod orchestrator;
pub mod temp_path;

pub use error::{Result, RewriteError, TempPathError};
pub use orchestrator::{
    Fingerprinter, LoftyRewriter, Phase, RewriteOutcome, Rewriter, TagRewriter,
    MIN_PLAUSIBLE_BYTES,
};
pub use temp_path::{reserve_temp_sibling, temp_sibling};
