//! # Stream Format Types
//!
//! Descriptors that flow between the decoder, the sniffer and PCM consumers:
//!
//! - [`StreamInfo`]: the decoder's view of a FLAC stream (STREAMINFO block)
//! - [`StreamFormat`]: the immutable `{sample_rate, bit_depth, channels}`
//!   triple a sniff produces
//! - [`PcmFormat`]: the byte layout of the bridged PCM output
//! - [`AudioFormat`] / [`Encoding`]: format negotiation values used by the
//!   conversion provider, where `None` means "not specified"

use crate::error::{FlacError, Result};
use serde::{Deserialize, Serialize};

// ============================================================================
// STREAMINFO
// ============================================================================

/// Contents of a FLAC STREAMINFO metadata block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamInfo {
    /// Minimum block size in samples
    pub min_block_size: u16,
    /// Maximum block size in samples
    pub max_block_size: u16,
    /// Minimum frame size in bytes (0 = unknown)
    pub min_frame_size: u32,
    /// Maximum frame size in bytes (0 = unknown)
    pub max_frame_size: u32,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels (1..=8)
    pub num_channels: u8,
    /// Bits per sample (4..=32)
    pub sample_depth: u8,
    /// Total samples per channel (0 = unknown)
    pub num_samples: u64,
    /// MD5 of the unencoded audio (all zero = not computed)
    pub md5: [u8; 16],
}

impl StreamInfo {
    /// Size of the STREAMINFO block body in bytes.
    pub const LENGTH: usize = 34;

    /// Parse a STREAMINFO block body.
    pub fn parse(body: &[u8; Self::LENGTH]) -> Result<Self> {
        let min_block_size = u16::from_be_bytes([body[0], body[1]]);
        let max_block_size = u16::from_be_bytes([body[2], body[3]]);
        let min_frame_size = u32::from_be_bytes([0, body[4], body[5], body[6]]);
        let max_frame_size = u32::from_be_bytes([0, body[7], body[8], body[9]]);

        // 20 bits rate | 3 bits channels-1 | 5 bits depth-1 | 36 bits samples
        let sample_rate =
            (u32::from(body[10]) << 12) | (u32::from(body[11]) << 4) | (u32::from(body[12]) >> 4);
        let num_channels = ((body[12] >> 1) & 0x07) + 1;
        let sample_depth = (((body[12] & 0x01) << 4) | (body[13] >> 4)) + 1;
        let num_samples = (u64::from(body[13] & 0x0F) << 32)
            | u64::from(u32::from_be_bytes([body[14], body[15], body[16], body[17]]));

        let mut md5 = [0u8; 16];
        md5.copy_from_slice(&body[18..34]);

        if sample_rate == 0 {
            return Err(FlacError::InvalidFormat(
                "STREAMINFO declares a sample rate of 0 Hz".to_string(),
            ));
        }

        if sample_depth < 4 {
            return Err(FlacError::InvalidFormat(format!(
                "STREAMINFO declares an invalid sample depth of {} bits",
                sample_depth
            )));
        }

        if max_block_size != 0 && min_block_size > max_block_size {
            return Err(FlacError::InvalidFormat(format!(
                "STREAMINFO block sizes out of order ({} > {})",
                min_block_size, max_block_size
            )));
        }

        Ok(Self {
            min_block_size,
            max_block_size,
            min_frame_size,
            max_frame_size,
            sample_rate,
            num_channels,
            sample_depth,
            num_samples,
            md5,
        })
    }

    /// Total samples per channel, if the encoder recorded it.
    pub fn total_samples(&self) -> Option<u64> {
        (self.num_samples > 0).then_some(self.num_samples)
    }

    /// Returns `true` if the encoder stored an MD5 signature.
    pub fn has_md5(&self) -> bool {
        self.md5.iter().any(|&b| b != 0)
    }
}

// ============================================================================
// Stream Format Descriptor
// ============================================================================

/// Immutable description of a stream's sample layout.
///
/// Produced by a successful sniff; consumers read it to build the PCM format
/// they will receive. Any bit depth can be described, but only whole-byte
/// depths can be bridged (see [`StreamFormat::pcm_format`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamFormat {
    sample_rate: u32,
    bit_depth: u8,
    channels: u8,
}

impl StreamFormat {
    pub fn new(sample_rate: u32, bit_depth: u8, channels: u8) -> Self {
        Self {
            sample_rate,
            bit_depth,
            channels,
        }
    }

    pub fn from_stream_info(info: &StreamInfo) -> Self {
        Self::new(info.sample_rate, info.sample_depth, info.num_channels)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn bit_depth(&self) -> u8 {
        self.bit_depth
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Returns `true` if samples can be written as whole bytes.
    pub fn is_byte_aligned(&self) -> bool {
        self.bit_depth % 8 == 0 && (8..=32).contains(&self.bit_depth)
    }

    /// Bytes per encoded sample.
    ///
    /// # Errors
    ///
    /// [`FlacError::UnsupportedSampleDepth`] for depths that are not a
    /// multiple of 8 (e.g. 12 or 20 bits).
    pub fn bytes_per_sample(&self) -> Result<usize> {
        if self.is_byte_aligned() {
            Ok(usize::from(self.bit_depth / 8))
        } else {
            Err(FlacError::UnsupportedSampleDepth(self.bit_depth))
        }
    }

    /// Layout of the PCM bytes produced when bridging this stream.
    pub fn pcm_format(&self) -> Result<PcmFormat> {
        let bytes_per_sample = self.bytes_per_sample()?;
        if self.channels == 0 {
            return Err(FlacError::InvalidFormat(
                "stream declares zero channels".to_string(),
            ));
        }

        Ok(PcmFormat {
            sample_rate: self.sample_rate,
            bit_depth: self.bit_depth,
            channels: self.channels,
            signed: bytes_per_sample > 1,
            big_endian: false,
        })
    }
}

impl From<&StreamInfo> for StreamFormat {
    fn from(info: &StreamInfo) -> Self {
        Self::from_stream_info(info)
    }
}

// ============================================================================
// PCM Output Layout
// ============================================================================

/// Byte layout of interleaved PCM output.
///
/// Samples are little-endian. 8-bit samples use the unsigned offset
/// convention (`sample + 128`), wider samples are two's complement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PcmFormat {
    pub sample_rate: u32,
    pub bit_depth: u8,
    pub channels: u8,
    pub signed: bool,
    pub big_endian: bool,
}

impl PcmFormat {
    pub fn bytes_per_sample(&self) -> usize {
        usize::from(self.bit_depth / 8)
    }

    /// Bytes per interleaved frame (one sample from every channel).
    pub fn frame_size(&self) -> usize {
        self.bytes_per_sample() * usize::from(self.channels)
    }

    /// Bytes per second of audio.
    pub fn byte_rate(&self) -> u64 {
        u64::from(self.sample_rate) * self.frame_size() as u64
    }
}

// ============================================================================
// Format Negotiation
// ============================================================================

/// Audio data encodings known to the conversion provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// FLAC-compressed audio
    Flac,
    /// Linear PCM with signed samples
    PcmSigned,
}

impl Encoding {
    pub fn name(&self) -> &'static str {
        match self {
            Encoding::Flac => "FLAC",
            Encoding::PcmSigned => "PCM_SIGNED",
        }
    }
}

/// A requested or offered audio format.
///
/// `None` fields mean "not specified" and match any value during
/// negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    pub encoding: Encoding,
    pub sample_rate: Option<u32>,
    pub bits_per_sample: Option<u8>,
    pub channels: Option<u8>,
    pub signed: bool,
    pub big_endian: bool,
}

impl AudioFormat {
    /// FLAC-encoded format described by a sniffed stream.
    pub fn flac(stream: &StreamFormat) -> Self {
        Self {
            encoding: Encoding::Flac,
            sample_rate: Some(stream.sample_rate()),
            bits_per_sample: Some(stream.bit_depth()),
            channels: Some(stream.channels()),
            signed: true,
            big_endian: false,
        }
    }

    /// Signed little-endian PCM.
    pub fn pcm(sample_rate: Option<u32>, bits_per_sample: Option<u8>, channels: Option<u8>) -> Self {
        Self {
            encoding: Encoding::PcmSigned,
            sample_rate,
            bits_per_sample,
            channels,
            signed: true,
            big_endian: false,
        }
    }
}

impl From<PcmFormat> for AudioFormat {
    fn from(format: PcmFormat) -> Self {
        Self::pcm(
            Some(format.sample_rate),
            Some(format.bit_depth),
            Some(format.channels),
        )
    }
}
