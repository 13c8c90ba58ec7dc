//! # WAV Header
//!
//! Canonical 44-byte RIFF/WAVE header for integer PCM.

use crate::error::{FlacError, Result};
use crate::format::PcmFormat;
use bytes::{BufMut, BytesMut};
use std::io::{self, Write};

/// Size of the header written by [`write_header`].
pub const WAV_HEADER_LENGTH: usize = 44;

const FMT_CHUNK_LENGTH: u32 = 16;
const WAVE_FORMAT_PCM: u16 = 0x0001;

/// Byte length of `frames` frames of audio, checked against the 32-bit
/// RIFF size fields.
pub fn data_len(format: &PcmFormat, frames: usize) -> Result<u32> {
    let max = u64::from(u32::MAX) - (WAV_HEADER_LENGTH as u64 - 8);

    (frames as u64)
        .checked_mul(format.frame_size() as u64)
        .filter(|bytes| *bytes <= max)
        .map(|bytes| bytes as u32)
        .ok_or_else(|| {
            FlacError::InvalidFormat(format!(
                "{} frames of audio exceed the WAV size limit",
                frames
            ))
        })
}

/// Write a RIFF/WAVE header announcing `data_len` bytes of PCM.
pub fn write_header<W: Write + ?Sized>(
    sink: &mut W,
    format: &PcmFormat,
    data_len: u32,
) -> io::Result<()> {
    let block_align = format.frame_size() as u16;
    let byte_rate = format.sample_rate * u32::from(block_align);

    let mut header = BytesMut::with_capacity(WAV_HEADER_LENGTH);

    header.put_slice(b"RIFF");
    header.put_u32_le(data_len.saturating_add(36));
    header.put_slice(b"WAVE");

    header.put_slice(b"fmt ");
    header.put_u32_le(FMT_CHUNK_LENGTH);
    header.put_u16_le(WAVE_FORMAT_PCM);
    header.put_u16_le(u16::from(format.channels));
    header.put_u32_le(format.sample_rate);
    header.put_u32_le(byte_rate);
    header.put_u16_le(block_align);
    header.put_u16_le(u16::from(format.bit_depth));

    header.put_slice(b"data");
    header.put_u32_le(data_len);

    sink.write_all(&header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::StreamFormat;

    #[test]
    fn test_cd_header() {
        let format = StreamFormat::new(44100, 16, 2).pcm_format().unwrap();
        let mut out = Vec::new();
        write_header(&mut out, &format, 1000).unwrap();

        assert_eq!(out.len(), WAV_HEADER_LENGTH);
        assert_eq!(&out[0..4], b"RIFF");
        assert_eq!(u32::from_le_bytes(out[4..8].try_into().unwrap()), 1036);
        assert_eq!(&out[8..16], b"WAVEfmt ");
        assert_eq!(u16::from_le_bytes([out[22], out[23]]), 2);
        assert_eq!(u32::from_le_bytes(out[24..28].try_into().unwrap()), 44100);
        assert_eq!(u32::from_le_bytes(out[28..32].try_into().unwrap()), 176_400);
        assert_eq!(u16::from_le_bytes([out[32], out[33]]), 4);
        assert_eq!(u16::from_le_bytes([out[34], out[35]]), 16);
        assert_eq!(&out[36..40], b"data");
        assert_eq!(u32::from_le_bytes(out[40..44].try_into().unwrap()), 1000);
    }

    #[test]
    fn test_data_len() {
        let format = StreamFormat::new(48000, 24, 2).pcm_format().unwrap();
        assert_eq!(data_len(&format, 10).unwrap(), 60);
        assert!(data_len(&format, usize::MAX / 8).is_err());
    }
}
