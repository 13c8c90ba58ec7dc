//! # Audio Checksum
//!
//! Verifies decoded audio against the MD5 signature stored in STREAMINFO.
//!
//! The signature covers the interleaved samples, each written as a signed
//! little-endian integer of `ceil(bit_depth / 8)` bytes.

use crate::buffer::SampleBuffer;
use crate::format::StreamInfo;
use md5::{Digest, Md5};

/// Outcome of comparing decoded audio with the stored signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Md5Check {
    /// The encoder left the signature blank.
    Missing,
    Matched,
    Mismatched,
}

/// MD5 of decoded samples as the FLAC encoder computes it.
pub fn audio_md5(samples: &SampleBuffer, bit_depth: u8) -> [u8; 16] {
    let width = usize::from(bit_depth).div_ceil(8).clamp(1, 4);
    let mut hasher = Md5::new();
    let mut frame = Vec::with_capacity(width * samples.channel_count());

    for index in 0..samples.len() {
        frame.clear();
        for sample in samples.frame(index) {
            frame.extend_from_slice(&sample.to_le_bytes()[..width]);
        }
        hasher.update(&frame);
    }

    hasher.finalize().into()
}

/// Compare `samples` with the signature in `info`.
pub fn verify(info: &StreamInfo, samples: &SampleBuffer) -> Md5Check {
    if !info.has_md5() {
        return Md5Check::Missing;
    }

    if audio_md5(samples, info.sample_depth) == info.md5 {
        Md5Check::Matched
    } else {
        Md5Check::Mismatched
    }
}
