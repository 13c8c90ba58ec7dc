//! # WAV Export
//!
//! Decodes a FLAC stream completely and writes it out as a RIFF/WAVE file.
//!
//! The export runs in four steps, any of which can abort it:
//!
//! 1. The stream's depth is checked against `DecodeConfig::export_depth`
//! 2. All blocks are decoded and the sample count verified
//! 3. The decoded audio is checked against the STREAMINFO MD5 signature
//! 4. The header and interleaved PCM are written to the sink

use crate::bridge::PcmStream;
use crate::checksum::{self, Md5Check};
use crate::config::DecodeConfig;
use crate::decoder::{decode_all, AudioDecoder};
use crate::error::{FlacError, Result};
use crate::format::{PcmFormat, StreamFormat};
use crate::wav;
use std::io::{BufWriter, Write};
use tracing::{debug, error, info, instrument, warn};

/// What an export wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    pub format: PcmFormat,
    /// Frames of audio written
    pub frames: u64,
    /// Total bytes written, header included
    pub bytes_written: u64,
    pub md5: Md5Check,
}

/// Decode everything `decoder` yields and write it to `sink` as WAV.
///
/// # Errors
///
/// - [`FlacError::InvalidConfig`] if `config` is invalid
/// - [`FlacError::UnsupportedSampleDepth`] if the export depth policy
///   rejects the stream
/// - [`FlacError::SampleCountMismatch`] / [`FlacError::ChecksumMismatch`]
///   when verification is enabled and fails
/// - [`FlacError::IoError`] if the sink fails
#[instrument(skip_all)]
pub fn export_wav<D, W>(decoder: &mut D, sink: W, config: &DecodeConfig) -> Result<ExportSummary>
where
    D: AudioDecoder + ?Sized,
    W: Write,
{
    config.validate()?;

    let info = decoder.stream_info().clone();
    config.export_depth.check(info.sample_depth).map_err(|e| {
        error!(bit_depth = info.sample_depth, "Export depth not supported");
        e
    })?;

    let samples = decode_all(decoder, config.verify_sample_count)?;

    let md5 = checksum::verify(&info, &samples);
    match md5 {
        Md5Check::Missing => warn!("MD5 signature is blank, decoded audio not verified"),
        Md5Check::Matched => debug!("MD5 signature verified"),
        Md5Check::Mismatched if config.verify_md5 => {
            error!("MD5 signature check failed");
            return Err(FlacError::ChecksumMismatch);
        }
        Md5Check::Mismatched => warn!("MD5 signature check failed, exporting anyway"),
    }

    let mut stream = PcmStream::new(samples, StreamFormat::from_stream_info(&info))?;
    let format = *stream.format();
    let frames = stream.remaining_frames();
    let data_len = wav::data_len(&format, frames)?;

    let mut sink = BufWriter::new(sink);
    wav::write_header(&mut sink, &format, data_len)?;
    let audio_bytes = stream.copy_to(&mut sink)?;
    sink.flush()?;

    let summary = ExportSummary {
        format,
        frames: frames as u64,
        bytes_written: wav::WAV_HEADER_LENGTH as u64 + audio_bytes,
        md5,
    };

    info!(
        frames = summary.frames,
        bytes = summary.bytes_written,
        "WAV export complete"
    );
    Ok(summary)
}

/// Decode FLAC bytes from `source` with Symphonia and write WAV to `sink`.
#[cfg(feature = "decoder-flac")]
pub fn flac_to_wav<R, W>(source: R, sink: W, config: &DecodeConfig) -> Result<ExportSummary>
where
    R: std::io::Read,
    W: Write,
{
    let mut decoder = crate::decoder::SymphoniaDecoder::from_reader(source)?;
    export_wav(&mut decoder, sink, config)
}

/// Convert a FLAC file on disk to a WAV file.
#[cfg(feature = "decoder-flac")]
pub fn flac_file_to_wav(
    input: impl AsRef<std::path::Path>,
    output: impl AsRef<std::path::Path>,
    config: &DecodeConfig,
) -> Result<ExportSummary> {
    use core_runtime::logging::strip_path;

    let input = input.as_ref();
    let output = output.as_ref();
    let (input_name, output_name) = (input.to_string_lossy(), output.to_string_lossy());
    info!(
        input = strip_path(&input_name),
        output = strip_path(&output_name),
        "Exporting FLAC to WAV"
    );

    let mut decoder = crate::decoder::SymphoniaDecoder::open(input)?;
    let file = std::fs::File::create(output)?;
    export_wav(&mut decoder, file, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::SampleBuffer;
    use crate::format::StreamInfo;
    use mockall::mock;

    mock! {
        Decoder {}

        impl AudioDecoder for Decoder {
            fn stream_info(&self) -> &StreamInfo;
            fn next_block(&mut self) -> Result<Option<SampleBuffer>>;
        }
    }

    fn stream_info(depth: u8, num_samples: u64, md5: [u8; 16]) -> StreamInfo {
        StreamInfo {
            min_block_size: 16,
            max_block_size: 4096,
            min_frame_size: 0,
            max_frame_size: 0,
            sample_rate: 44100,
            num_channels: 2,
            sample_depth: depth,
            num_samples,
            md5,
        }
    }

    fn mock_decoder(info: StreamInfo, channels: Vec<Vec<i32>>) -> MockDecoder {
        let mut decoder = MockDecoder::new();
        decoder.expect_stream_info().return_const(info);
        let mut blocks = vec![SampleBuffer::from_channels(channels).unwrap()].into_iter();
        decoder
            .expect_next_block()
            .returning(move || Ok(blocks.next()));
        decoder
    }

    #[test]
    fn test_writes_header_and_audio() {
        let mut decoder = mock_decoder(
            stream_info(16, 2, [0; 16]),
            vec![vec![100, -100], vec![200, -200]],
        );
        let mut out = Vec::new();
        let summary = export_wav(&mut decoder, &mut out, &DecodeConfig::default()).unwrap();

        assert_eq!(summary.frames, 2);
        assert_eq!(summary.bytes_written, 52);
        assert_eq!(summary.md5, Md5Check::Missing);
        assert_eq!(out.len(), 52);
        assert_eq!(&out[44..], &[0x64, 0x00, 0xC8, 0x00, 0x9C, 0xFF, 0x38, 0xFF]);
    }

    #[test]
    fn test_rejects_depth() {
        let mut decoder = MockDecoder::new();
        decoder
            .expect_stream_info()
            .return_const(stream_info(24, 0, [0; 16]));
        decoder.expect_next_block().never();

        let err = export_wav(&mut decoder, Vec::new(), &DecodeConfig::default()).unwrap_err();
        assert!(matches!(err, FlacError::UnsupportedSampleDepth(24)));
    }

    #[test]
    fn test_md5_mismatch() {
        let channels = vec![vec![1, 2], vec![3, 4]];
        let mut decoder = mock_decoder(stream_info(16, 2, [0xAB; 16]), channels.clone());
        let err = export_wav(&mut decoder, Vec::new(), &DecodeConfig::default()).unwrap_err();
        assert!(matches!(err, FlacError::ChecksumMismatch));

        let mut decoder = mock_decoder(stream_info(16, 2, [0xAB; 16]), channels);
        let config = DecodeConfig {
            verify_md5: false,
            ..Default::default()
        };
        let summary = export_wav(&mut decoder, Vec::new(), &config).unwrap();
        assert_eq!(summary.md5, Md5Check::Mismatched);
    }

    #[test]
    fn test_md5_match() {
        let samples = SampleBuffer::from_channels(vec![vec![7, 8], vec![-7, -8]]).unwrap();
        let digest = checksum::audio_md5(&samples, 16);
        let mut decoder = mock_decoder(stream_info(16, 2, digest), samples.into_channels());

        let summary = export_wav(&mut decoder, Vec::new(), &DecodeConfig::default()).unwrap();
        assert_eq!(summary.md5, Md5Check::Matched);
    }
}
