use serde::{Deserialize, Serialize};
use std::fmt;

/// Summary of one full decode session: total normalized PCM byte count plus
/// the CRC-32 digest of those bytes.
///
/// Two fingerprints compare equal only when both fields match exactly, and a
/// comparison is only meaningful when both sides were captured under the same
/// [`ScanSpec`](crate::pcm::ScanSpec).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    /// Total number of normalized PCM bytes produced by the decode session.
    pub byte_count: u64,
    /// CRC-32 digest of those bytes.
    pub digest: u32,
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}/{} bytes", self.digest, self.byte_count)
    }
}
