//! # Audio Decoder Module
//!
//! The decoder collaborator the PCM bridge consumes.
//!
//! ## Overview
//!
//! An [`AudioDecoder`] reports the stream's STREAMINFO and yields decoded
//! blocks of native-depth samples until the stream ends. [`decode_all`]
//! drains a decoder into one [`SampleBuffer`] and checks the result against
//! the declared sample count.
//!
//! With the `decoder-flac` feature, [`SymphoniaDecoder`] provides the
//! implementation on top of the Symphonia FLAC codec:
//!
//! ```text
//! bytes → MediaSourceStream → FlacReader → FlacDecoder → SampleConverter → SampleBuffer
//! ```

#[cfg(feature = "decoder-flac")]
mod sample_converter;

#[cfg(feature = "decoder-flac")]
mod symphonia;

#[cfg(feature = "decoder-flac")]
pub use self::symphonia::SymphoniaDecoder;

#[cfg(feature = "decoder-flac")]
pub use sample_converter::SampleConverter;

use crate::buffer::SampleBuffer;
use crate::error::{FlacError, Result};
use crate::format::StreamInfo;
use tracing::{debug, error, instrument};

/// Upper bound on frames preallocated from an untrusted STREAMINFO total.
const MAX_PREALLOCATED_FRAMES: u64 = 1 << 22;

/// Block-oriented FLAC decoder.
pub trait AudioDecoder {
    /// STREAMINFO of the stream being decoded.
    fn stream_info(&self) -> &StreamInfo;

    /// Decode the next block, or `Ok(None)` at end of stream.
    ///
    /// Each block holds one sample vector per channel, all of equal length,
    /// at the stream's native bit depth.
    fn next_block(&mut self) -> Result<Option<SampleBuffer>>;
}

/// Decode every remaining block into a single buffer.
///
/// When `verify_sample_count` is set and STREAMINFO declares a non-zero
/// total, a decoded frame count that differs from it is an error.
///
/// # Errors
///
/// - [`FlacError::SampleCountMismatch`] on a count disagreement
/// - [`FlacError::DecodingError`] if a block's channel count differs from
///   STREAMINFO
/// - any error from [`AudioDecoder::next_block`]
#[instrument(skip(decoder))]
pub fn decode_all<D: AudioDecoder + ?Sized>(
    decoder: &mut D,
    verify_sample_count: bool,
) -> Result<SampleBuffer> {
    let info = decoder.stream_info().clone();
    let capacity = info.num_samples.min(MAX_PREALLOCATED_FRAMES) as usize;
    let mut samples = SampleBuffer::with_capacity(usize::from(info.num_channels), capacity);

    let mut blocks = 0usize;
    while let Some(block) = decoder.next_block()? {
        samples.append(block)?;
        blocks += 1;
    }

    let decoded = samples.len() as u64;
    debug!(blocks, frames = decoded, "Decoded stream");

    if verify_sample_count && info.num_samples != 0 && decoded != info.num_samples {
        error!(
            expected = info.num_samples,
            actual = decoded,
            "Decoded sample count disagrees with STREAMINFO"
        );
        return Err(FlacError::SampleCountMismatch {
            expected: info.num_samples,
            actual: decoded,
        });
    }

    Ok(samples)
}
