//! Helpers for building FLAC metadata prefixes by hand.

#![allow(dead_code)]

use core_flac::metadata::FLAC_MARKER;

pub const STREAMINFO_TYPE: u8 = 0;
pub const PADDING_TYPE: u8 = 1;

/// Encode a STREAMINFO body.
pub fn stream_info_body(sample_rate: u32, channels: u8, depth: u8, num_samples: u64) -> [u8; 34] {
    let mut body = [0u8; 34];
    // min/max block size 4096
    body[0..2].copy_from_slice(&4096u16.to_be_bytes());
    body[2..4].copy_from_slice(&4096u16.to_be_bytes());

    // 20 bits rate, 3 bits channels - 1, 5 bits depth - 1, 36 bits samples
    let packed: u64 = (u64::from(sample_rate) << 44)
        | (u64::from(channels - 1) << 41)
        | (u64::from(depth - 1) << 36)
        | (num_samples & 0xF_FFFF_FFFF);
    body[10..18].copy_from_slice(&packed.to_be_bytes());
    body
}

fn block_header(block_type: u8, last: bool, len: usize) -> [u8; 4] {
    let len = (len as u32).to_be_bytes();
    let flag = if last { 0x80 } else { 0x00 };
    [flag | block_type, len[1], len[2], len[3]]
}

/// Marker followed by an optional padding block and a final STREAMINFO.
pub fn flac_prefix(
    padding_before: Option<usize>,
    sample_rate: u32,
    channels: u8,
    depth: u8,
    num_samples: u64,
) -> Vec<u8> {
    let mut data = FLAC_MARKER.to_vec();
    if let Some(len) = padding_before {
        data.extend(block_header(PADDING_TYPE, false, len));
        data.resize(data.len() + len, 0);
    }
    data.extend(block_header(STREAMINFO_TYPE, true, 34));
    data.extend(stream_info_body(sample_rate, channels, depth, num_samples));
    data
}

/// CD-style stereo prefix followed by a fake frame sync.
pub fn cd_stream(num_samples: u64) -> Vec<u8> {
    let mut data = flac_prefix(None, 44100, 2, 16, num_samples);
    data.extend([0xFF, 0xF8, 0x69, 0x08]);
    data
}

// ============================================================================
// Decodable Streams
// ============================================================================

/// CRC-8 of a FLAC frame header (poly 0x07, init 0).
pub fn crc8(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |crc, &byte| {
        (0..8).fold(crc ^ byte, |c, _| {
            if c & 0x80 != 0 {
                (c << 1) ^ 0x07
            } else {
                c << 1
            }
        })
    })
}

/// CRC-16 of a whole FLAC frame (poly 0x8005, init 0).
pub fn crc16(data: &[u8]) -> u16 {
    data.iter().fold(0u16, |crc, &byte| {
        (0..8).fold(crc ^ (u16::from(byte) << 8), |c, _| {
            if c & 0x8000 != 0 {
                (c << 1) ^ 0x8005
            } else {
                c << 1
            }
        })
    })
}

/// Interleaved little-endian 16-bit PCM for per-channel samples.
pub fn interleaved_le(channels: &[Vec<i16>]) -> Vec<u8> {
    let frames = channels[0].len();
    (0..frames)
        .flat_map(|i| channels.iter().flat_map(move |ch| ch[i].to_le_bytes()))
        .collect()
}

/// A complete 44.1 kHz 16-bit FLAC stream holding one frame of verbatim
/// subframes, with valid CRCs and MD5 signature.
///
/// Every channel must hold the same number of samples, between 16 and 256.
pub fn verbatim_flac(channels: &[Vec<i16>]) -> Vec<u8> {
    use md5::{Digest, Md5};

    let block = channels[0].len();
    assert!((16..=256).contains(&block));
    assert!(channels.iter().all(|ch| ch.len() == block));
    let num_channels = channels.len() as u8;

    let mut body = stream_info_body(44100, num_channels, 16, block as u64);
    body[0..2].copy_from_slice(&(block as u16).to_be_bytes());
    body[2..4].copy_from_slice(&(block as u16).to_be_bytes());
    body[18..34].copy_from_slice(&Md5::digest(interleaved_le(channels)));

    let mut data = FLAC_MARKER.to_vec();
    data.extend(block_header(STREAMINFO_TYPE, true, 34));
    data.extend(body);

    // fixed blocking, 8-bit block size code, 44.1 kHz, independent channels,
    // 16-bit, frame number 0
    let mut frame = vec![
        0xFF,
        0xF8,
        0x69,
        ((num_channels - 1) << 4) | 0x08,
        0x00,
        (block - 1) as u8,
    ];
    frame.push(crc8(&frame));
    for channel in channels {
        // VERBATIM subframe, no wasted bits
        frame.push(0x02);
        for sample in channel {
            frame.extend(sample.to_be_bytes());
        }
    }
    frame.extend(crc16(&frame).to_be_bytes());

    data.extend(frame);
    data
}

/// Stereo fixture: a rising left channel and a falling right channel.
pub fn stereo_ramp() -> Vec<Vec<i16>> {
    let left = (0..16).map(|i| i * 1000 - 8000).collect();
    let right = (0..16).map(|i| 100 - i * 37).collect();
    vec![left, right]
}
