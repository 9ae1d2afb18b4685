//! # Audio Fingerprint Extraction
//!
//! Drives a full symphonia decode session and reduces it to a
//! [`Fingerprint`]. One session pulls the bounded packet sequence of the
//! selected track to exhaustion; each decoded buffer is normalized to the
//! canonical PCM format, folded into a fresh CRC-32 accumulator, and dropped
//! before the next one is decoded.

use std::fs::File;
use std::path::Path;

use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use crate::checksum::Crc32;
use crate::error::{Result, ScanError};
use crate::fingerprint::Fingerprint;
use crate::pcm::{PcmNormalizer, ScanSpec};

/// Consecutive unreadable/undecodable packets tolerated before the scan is
/// considered failed rather than merely noisy.
const MAX_CONSECUTIVE_ERRORS: usize = 10;

/// Scans media files into audio fingerprints.
///
/// Both scans of one verification run must use the same scanner (or at least
/// the same [`ScanSpec`]); fingerprints captured under different specs are
/// not comparable.
#[derive(Debug, Clone, Default)]
pub struct AudioScanner {
    spec: ScanSpec,
}

impl AudioScanner {
    pub fn new(spec: ScanSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> ScanSpec {
        self.spec
    }

    /// Decode the file at `path` to completion and fingerprint the
    /// normalized PCM stream.
    ///
    /// # Errors
    ///
    /// - [`ScanError::OpenFailed`] when the file cannot be opened
    /// - [`ScanError::PipelineSetup`] when the container cannot be probed or
    ///   the codec decoder cannot be created
    /// - [`ScanError::NoAudioTrack`] when no decodable track exists
    /// - [`ScanError::DecodeFailed`] on unrecoverable mid-stream errors
    ///
    /// Individual corrupt packets are skipped with a warning; the decoder's
    /// own recovery policy applies.
    pub fn scan(&self, path: &Path) -> Result<Fingerprint> {
        debug!("Scanning {}", path.display());

        let file = File::open(path)
            .map_err(|e| ScanError::OpenFailed(format!("{}: {}", path.display(), e)))?;
        let media_source = Box::new(file) as Box<dyn MediaSource>;
        let mss = MediaSourceStream::new(media_source, Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| ScanError::PipelineSetup(format!("format probe failed: {}", e)))?;

        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(ScanError::NoAudioTrack)?;
        let track_id = track.id;
        debug!("Selected track {}", track_id);

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| ScanError::PipelineSetup(format!("decoder init failed: {}", e)))?;

        let mut normalizer = PcmNormalizer::new(self.spec);
        let mut crc = Crc32::new();
        let mut byte_count = 0u64;
        let mut consecutive_errors = 0usize;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => {
                    consecutive_errors = 0;
                    packet
                }
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => {
                    // Track list changed (e.g. chained OGG); reset and keep
                    // folding the same stream.
                    decoder.reset();
                    continue;
                }
                Err(SymphoniaError::IoError(e)) => {
                    consecutive_errors += 1;
                    warn!(
                        "I/O error reading packet ({}/{}): {}",
                        consecutive_errors, MAX_CONSECUTIVE_ERRORS, e
                    );
                    if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                        return Err(ScanError::DecodeFailed(format!(
                            "stream I/O failure after {} attempts: {}",
                            MAX_CONSECUTIVE_ERRORS, e
                        )));
                    }
                    continue;
                }
                Err(e) => {
                    return Err(ScanError::DecodeFailed(format!(
                        "failed to read packet: {}",
                        e
                    )));
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let bytes = normalizer.push(&decoded);
                    byte_count += bytes.len() as u64;
                    crc.update(&bytes);
                }
                Err(SymphoniaError::DecodeError(e)) => {
                    // Corrupt packet; skip it, per the decoder's recovery
                    // policy.
                    consecutive_errors += 1;
                    warn!(
                        "Skipping undecodable packet ({}/{}): {}",
                        consecutive_errors, MAX_CONSECUTIVE_ERRORS, e
                    );
                    if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                        return Err(ScanError::DecodeFailed(format!(
                            "decoder failure after {} failed packets: {}",
                            MAX_CONSECUTIVE_ERRORS, e
                        )));
                    }
                    continue;
                }
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => {
                    decoder.reset();
                    continue;
                }
                Err(e) => {
                    return Err(ScanError::DecodeFailed(format!(
                        "failed to decode packet: {}",
                        e
                    )));
                }
            }
        }

        let fingerprint = Fingerprint {
            byte_count,
            digest: crc.finalize(),
        };
        debug!("Scan of {} complete: {}", path.display(), fingerprint);
        Ok(fingerprint)
    }
}
