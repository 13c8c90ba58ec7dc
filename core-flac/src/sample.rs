//! # Sample Encoder
//!
//! Turns native-depth integer samples into little-endian PCM bytes.
//!
//! | Bytes | Layout |
//! |-------|--------|
//! | 1 | unsigned offset: `(sample + 128) as u8` |
//! | 2 | two's complement, low byte first |
//! | 3 | two's complement, low byte first |
//! | 4 | two's complement, low byte first |
//!
//! Samples are truncated to their low-order bytes without range checks; the
//! decoder guarantees they fit the declared depth.

use crate::error::{FlacError, Result};
use bytes::BufMut;

/// Widest supported sample, in bytes.
pub const MAX_BYTES_PER_SAMPLE: usize = 4;

/// Encoder for one fixed sample width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleEncoder {
    bytes_per_sample: usize,
}

impl SampleEncoder {
    /// Create an encoder writing `bytes_per_sample` bytes per sample.
    ///
    /// # Errors
    ///
    /// [`FlacError::UnsupportedSampleDepth`] unless `bytes_per_sample` is in
    /// `1..=4`.
    pub fn new(bytes_per_sample: usize) -> Result<Self> {
        if (1..=MAX_BYTES_PER_SAMPLE).contains(&bytes_per_sample) {
            Ok(Self { bytes_per_sample })
        } else {
            let bits = bytes_per_sample.saturating_mul(8);
            Err(FlacError::UnsupportedSampleDepth(
                u8::try_from(bits).unwrap_or(u8::MAX),
            ))
        }
    }

    /// Create an encoder for a bit depth that must be a multiple of 8.
    pub fn for_bit_depth(bit_depth: u8) -> Result<Self> {
        if bit_depth % 8 != 0 {
            return Err(FlacError::UnsupportedSampleDepth(bit_depth));
        }
        Self::new(usize::from(bit_depth / 8))
    }

    pub fn bytes_per_sample(&self) -> usize {
        self.bytes_per_sample
    }

    /// Encode one sample into a fixed array; only the first
    /// [`bytes_per_sample`](Self::bytes_per_sample) bytes are meaningful.
    #[inline]
    pub fn encode(&self, sample: i32) -> [u8; MAX_BYTES_PER_SAMPLE] {
        if self.bytes_per_sample == 1 {
            [sample.wrapping_add(128) as u8, 0, 0, 0]
        } else {
            sample.to_le_bytes()
        }
    }

    /// Append one encoded sample to `out`.
    #[inline]
    pub fn put<B: BufMut>(&self, sample: i32, out: &mut B) {
        let encoded = self.encode(sample);
        out.put_slice(&encoded[..self.bytes_per_sample]);
    }
}

/// Encode a single sample as `bytes_per_sample` little-endian bytes.
///
/// # Examples
///
/// ```
/// use core_flac::encode_sample;
///
/// assert_eq!(encode_sample(100, 2).unwrap(), vec![0x64, 0x00]);
/// assert_eq!(encode_sample(-1, 3).unwrap(), vec![0xFF, 0xFF, 0xFF]);
/// assert_eq!(encode_sample(0, 1).unwrap(), vec![0x80]);
/// ```
pub fn encode_sample(sample: i32, bytes_per_sample: usize) -> Result<Vec<u8>> {
    let encoder = SampleEncoder::new(bytes_per_sample)?;
    Ok(encoder.encode(sample)[..bytes_per_sample].to_vec())
}
