//! # Sample Format Converter
//!
//! Converts Symphonia's decoded audio buffers back to native-depth integer
//! samples.

use crate::buffer::SampleBuffer;
use crate::error::{FlacError, Result};
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::sample::{i24, Sample};
use tracing::error;

/// Converter from Symphonia buffers to [`SampleBuffer`].
///
/// The FLAC codec left-justifies samples in its output container (a 16-bit
/// stream arrives as `S32` with the low 16 bits zero). Shifting right by
/// `container_bits - bit_depth` recovers the original values exactly.
pub struct SampleConverter;

impl SampleConverter {
    /// Convert a decoded buffer to channel-major samples at `bit_depth`.
    ///
    /// # Errors
    ///
    /// [`FlacError::DecoderError`] for floating point or unsigned output, or
    /// a container narrower than `bit_depth`.
    pub fn to_native_depth(buffer: &AudioBufferRef<'_>, bit_depth: u8) -> Result<SampleBuffer> {
        match buffer {
            AudioBufferRef::S32(buf) => Self::descale(&**buf, 32, bit_depth, |s: i32| s),
            AudioBufferRef::S24(buf) => Self::descale(&**buf, 24, bit_depth, |s: i24| s.inner()),
            AudioBufferRef::S16(buf) => Self::descale(&**buf, 16, bit_depth, i32::from),
            AudioBufferRef::S8(buf) => Self::descale(&**buf, 8, bit_depth, i32::from),
            _ => {
                error!("Decoder produced non-integer samples");
                Err(FlacError::DecoderError(
                    "decoder produced a non signed-integer sample format".to_string(),
                ))
            }
        }
    }

    fn descale<T>(
        buf: &AudioBuffer<T>,
        container_bits: u32,
        bit_depth: u8,
        widen: fn(T) -> i32,
    ) -> Result<SampleBuffer>
    where
        T: Sample + Copy,
    {
        let depth = u32::from(bit_depth);
        if depth == 0 || depth > container_bits {
            return Err(FlacError::DecoderError(format!(
                "{}-bit samples cannot hold a {}-bit stream",
                container_bits, bit_depth
            )));
        }
        let shift = container_bits - depth;

        let channels = (0..buf.spec().channels.count())
            .map(|c| buf.chan(c).iter().map(|&s| widen(s) >> shift).collect())
            .collect();

        SampleBuffer::from_channels(channels)
    }
}
