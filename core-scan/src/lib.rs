//! # Audio Scan Module
//!
//! Produces deterministic fingerprints of decoded audio streams.
//!
//! ## Overview
//!
//! This module handles:
//! - Streaming CRC-32 accumulation over decoded PCM bytes
//! - Audio decoding using symphonia
//! - Normalization of decoded buffers to a canonical PCM format
//! - Reduction of a full decode session to a `(byte count, digest)` pair

pub mod checksum;
pub mod error;
pub mod fingerprint;
pub mod pcm;
pub mod scanner;

pub use checksum::Crc32;
pub use error::{Result, ScanError};
pub use fingerprint::Fingerprint;
pub use pcm::ScanSpec;
pub use scanner::AudioScanner;
