//! # Tag Editing Module
//!
//! Applies ordered metadata edits to audio files using the `lofty` crate.
//!
//! ## Overview
//!
//! This module handles:
//! - The ordered set/delete edit model
//! - In-memory edit application, deferred until save
//! - Materializing pending edits into a new file, leaving the source
//!   untouched

pub mod editor;
pub mod error;
pub mod ops;

pub use editor::TagEditor;
pub use error::{Result, TagError};
pub use ops::TagEdit;
