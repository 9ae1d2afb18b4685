//! # PCM Normalization
//!
//! Converts decoded audio buffers into the canonical scan format.
//!
//! Fingerprints are only comparable when both decode sessions produce byte
//! streams under the same configuration, so every buffer is normalized to
//! mono, 16-bit signed little-endian PCM at a fixed sample rate before it is
//! folded into the checksum. Normalization is pure and deterministic:
//! identical decoded input always yields identical output bytes.

use serde::{Deserialize, Serialize};
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::conv::IntoSample;
use symphonia::core::sample::Sample;

/// Canonical output configuration for a scan session.
///
/// Channel layout (mono) and sample format (i16 little-endian) are fixed;
/// only the target sample rate is configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSpec {
    /// Target sample rate in Hz.
    pub sample_rate: u32,
}

impl Default for ScanSpec {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
        }
    }
}

/// Stateful normalizer for one decode session.
///
/// Holds the resampler state across buffers so the output stream is the same
/// no matter how the decoder chunks its packets. One normalizer must not be
/// reused across sessions.
pub struct PcmNormalizer {
    spec: ScanSpec,
    resampler: Option<LinearResampler>,
}

impl PcmNormalizer {
    pub fn new(spec: ScanSpec) -> Self {
        Self {
            spec,
            resampler: None,
        }
    }

    /// Normalize one decoded buffer to canonical PCM bytes.
    pub fn push(&mut self, decoded: &AudioBufferRef<'_>) -> Vec<u8> {
        let source_rate = decoded.spec().rate;
        let mono = downmix_to_mono(decoded);

        let samples = if source_rate == self.spec.sample_rate {
            mono
        } else {
            let target = self.spec.sample_rate;
            let resampler = self
                .resampler
                .get_or_insert_with(|| LinearResampler::new(source_rate, target));
            let mut out = Vec::with_capacity(mono.len());
            resampler.process(&mono, &mut out);
            out
        };

        let mut bytes = Vec::with_capacity(samples.len() * 2);
        quantize_i16_le(&samples, &mut bytes);
        bytes
    }
}

/// Downmix a decoded buffer of any sample format and layout to mono f32.
///
/// Channels are averaged per frame; samples are normalized to [-1.0, 1.0]
/// through symphonia's `IntoSample` conversions.
pub fn downmix_to_mono(buffer: &AudioBufferRef<'_>) -> Vec<f32> {
    match buffer {
        AudioBufferRef::U8(buf) => downmix(buf, |s: u8| s.into_sample()),
        AudioBufferRef::U16(buf) => downmix(buf, |s: u16| s.into_sample()),
        AudioBufferRef::U24(buf) => downmix(buf, |s| IntoSample::into_sample(s)),
        AudioBufferRef::U32(buf) => downmix(buf, |s: u32| s.into_sample()),
        AudioBufferRef::S8(buf) => downmix(buf, |s: i8| s.into_sample()),
        AudioBufferRef::S16(buf) => downmix(buf, |s: i16| s.into_sample()),
        AudioBufferRef::S24(buf) => downmix(buf, |s| IntoSample::into_sample(s)),
        AudioBufferRef::S32(buf) => downmix(buf, |s: i32| s.into_sample()),
        AudioBufferRef::F32(buf) => downmix(buf, |s: f32| s),
        AudioBufferRef::F64(buf) => downmix(buf, |s: f64| s.into_sample()),
    }
}

fn downmix<T>(buf: &AudioBuffer<T>, convert: fn(T) -> f32) -> Vec<f32>
where
    T: Sample + Copy,
{
    let channels = buf.spec().channels.count();
    let frames = buf.frames();
    let mut mono = Vec::with_capacity(frames);

    for frame_idx in 0..frames {
        let mut sum = 0.0f32;
        for chan_idx in 0..channels {
            sum += convert(buf.chan(chan_idx)[frame_idx]);
        }
        mono.push(sum / channels as f32);
    }

    mono
}

/// Quantize f32 samples in [-1.0, 1.0] to i16 and append as little-endian
/// bytes.
pub fn quantize_i16_le(samples: &[f32], out: &mut Vec<u8>) {
    for &sample in samples {
        let clamped = sample.clamp(-1.0, 1.0);
        let value = (clamped * 32767.0).round() as i16;
        out.extend_from_slice(&value.to_le_bytes());
    }
}

/// Streaming linear-interpolation resampler.
///
/// Chosen over a windowed-sinc resampler on purpose: the output feeds a
/// checksum, not a DAC, so bit-exact determinism and statelessness of
/// configuration matter more than stopband quality. State (interpolation
/// phase plus one sample of history) carries across `process` calls, so the
/// produced stream does not depend on how the input is chunked.
pub struct LinearResampler {
    source_rate: u64,
    target_rate: u64,
    /// Numerator of the next output position, in input-sample units scaled
    /// by `target_rate`, relative to the retained history sample. Kept as an
    /// exact integer so the phase never drifts with chunk boundaries.
    position: u64,
    prev: Option<f32>,
}

impl LinearResampler {
    pub fn new(source_rate: u32, target_rate: u32) -> Self {
        Self {
            source_rate: u64::from(source_rate),
            target_rate: u64::from(target_rate),
            position: 0,
            prev: None,
        }
    }

    /// Resample `input`, appending output samples to `out`.
    ///
    /// The final fractional interpolation point of the stream is dropped at
    /// end of input; both scan passes drop it identically.
    pub fn process(&mut self, input: &[f32], out: &mut Vec<f32>) {
        if input.is_empty() {
            return;
        }

        // Virtual timeline: the retained history sample (if any) at index 0,
        // followed by `input`.
        let prev = self.prev;
        let offset = usize::from(prev.is_some());
        let len = (input.len() + offset) as u64;
        let sample_at = |idx: usize| -> f32 {
            if idx < offset {
                prev.unwrap_or_default()
            } else {
                input[idx - offset]
            }
        };

        while self.position / self.target_rate + 1 < len {
            let idx = (self.position / self.target_rate) as usize;
            let frac = (self.position % self.target_rate) as f32 / self.target_rate as f32;
            let s0 = sample_at(idx);
            let s1 = sample_at(idx + 1);
            out.push(s0 + (s1 - s0) * frac);
            self.position += self.source_rate;
        }

        // Retire everything but the last sample into history.
        self.position -= (len - 1) * self.target_rate;
        self.prev = Some(input[input.len() - 1]);
    }
}
