//! Decoding real FLAC bytes with Symphonia.
//!
//! The fixture is a single frame of verbatim subframes built by hand, so
//! the expected PCM is known exactly.

#![cfg(feature = "decoder-flac")]

mod common;

use common::{crc16, crc8, interleaved_le, stereo_ramp, verbatim_flac};
use core_flac::{
    decode_all, flac_to_wav, AudioDecoder, AudioFormat, DecodeConfig, FlacError, FlacFileReader,
    FormatConverter, Md5Check, PcmFormat, SymphoniaDecoder,
};
use std::io::{Cursor, Read};

/// Offset of the MD5 signature within the stream.
const MD5_OFFSET: usize = 4 + 4 + 18;

#[test]
fn test_fixture_checksums() {
    assert_eq!(crc8(b"123456789"), 0xF4);
    assert_eq!(crc16(b"123456789"), 0xFEE8);

    let data = verbatim_flac(&stereo_ramp());
    assert_eq!(data.len(), 117);
    assert_eq!(&data[data.len() - 2..], &[0xE0, 0x83]);
}

#[test]
fn test_decoder_yields_native_samples() {
    let mut decoder = SymphoniaDecoder::from_bytes(verbatim_flac(&stereo_ramp())).unwrap();
    assert_eq!(decoder.stream_info().num_samples, 16);

    let samples = decode_all(&mut decoder, true).unwrap();
    let expected: Vec<Vec<i32>> = stereo_ramp()
        .into_iter()
        .map(|ch| ch.into_iter().map(i32::from).collect())
        .collect();

    assert_eq!(samples.len(), 16);
    assert_eq!(samples.channel(0).unwrap(), expected[0].as_slice());
    assert_eq!(samples.channel(1).unwrap(), expected[1].as_slice());
    assert_eq!(decoder.position_frames(), 16);
}

#[test]
fn test_reader_into_pcm() {
    let channels = stereo_ramp();
    let stream = FlacFileReader::new()
        .audio_input_stream(Cursor::new(verbatim_flac(&channels)))
        .unwrap();
    assert_eq!(stream.frame_length(), Some(16));

    let mut pcm = stream.into_pcm().unwrap();
    assert_eq!(pcm.frame_size(), 4);
    assert_eq!(pcm.remaining_frames(), 16);
    assert_eq!(&pcm.next_frame().unwrap()[..], &[0xC0, 0xE0, 0x64, 0x00]);
    assert_eq!(&pcm.next_frame().unwrap()[..], &[0xA8, 0xE4, 0x3F, 0x00]);

    let mut rest = Vec::new();
    pcm.read_to_end(&mut rest).unwrap();
    assert_eq!(rest.as_slice(), &interleaved_le(&channels)[8..]);
    assert!(pcm.next_frame().is_none());
}

#[test]
fn test_convert_decodes_real_stream() {
    let channels = stereo_ramp();
    let stream = FlacFileReader::new()
        .audio_input_stream(Cursor::new(verbatim_flac(&channels)))
        .unwrap();

    let target = AudioFormat::pcm(Some(44100), Some(16), Some(2));
    let pcm = FormatConverter::new().convert(&target, stream).unwrap();

    let bytes: Vec<u8> = pcm.flat_map(|frame| frame.to_vec()).collect();
    assert_eq!(bytes, interleaved_le(&channels));
}

#[test]
fn test_flac_to_wav_verifies_md5() {
    let channels = stereo_ramp();
    let mut wav = Vec::new();

    let summary = flac_to_wav(
        Cursor::new(verbatim_flac(&channels)),
        &mut wav,
        &DecodeConfig::default(),
    )
    .unwrap();

    assert_eq!(summary.md5, Md5Check::Matched);
    assert_eq!(summary.frames, 16);
    assert_eq!(
        summary.format,
        PcmFormat {
            sample_rate: 44100,
            bit_depth: 16,
            channels: 2,
            signed: true,
            big_endian: false,
        }
    );
    assert_eq!(summary.bytes_written, 44 + 64);
    assert_eq!(wav.len(), 44 + 64);
    assert_eq!(&wav[0..4], b"RIFF");
    assert_eq!(&wav[44..], interleaved_le(&channels).as_slice());
}

#[test]
fn test_flac_to_wav_rejects_bad_signature() {
    let mut data = verbatim_flac(&stereo_ramp());
    data[MD5_OFFSET] ^= 0xFF;

    let err = flac_to_wav(Cursor::new(data.clone()), Vec::new(), &DecodeConfig::default())
        .unwrap_err();
    assert!(matches!(err, FlacError::ChecksumMismatch));

    let summary = flac_to_wav(Cursor::new(data), Vec::new(), &DecodeConfig::lenient()).unwrap();
    assert_eq!(summary.md5, Md5Check::Mismatched);
    assert_eq!(summary.frames, 16);
}

#[test]
fn test_mono_stream() {
    let mut samples = vec![i16::MIN, -1, 0, 1, i16::MAX];
    samples.resize(16, 0);
    let channels = vec![samples];
    let mut pcm = FlacFileReader::new()
        .audio_input_stream(Cursor::new(verbatim_flac(&channels)))
        .unwrap()
        .into_pcm()
        .unwrap();

    let mut bytes = Vec::new();
    pcm.read_to_end(&mut bytes).unwrap();
    assert_eq!(bytes.len(), 32);
    assert_eq!(
        &bytes[..10],
        &[0x00, 0x80, 0xFF, 0xFF, 0x00, 0x00, 0x01, 0x00, 0xFF, 0x7F]
    );
    assert!(bytes[10..].iter().all(|&b| b == 0));
}
