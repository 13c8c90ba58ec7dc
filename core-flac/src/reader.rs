//! # FLAC File Reader
//!
//! Entry points that identify FLAC files and open them as streams:
//!
//! - [`FlacFileReader::audio_file_format`] describes a file without
//!   consuming it
//! - [`FlacFileReader::audio_input_stream`] wraps a recognized source in a
//!   [`FlacStream`], which can be bridged to PCM with
//!   [`FlacStream::into_pcm`]

use crate::bridge::PcmStream;
use crate::config::DecodeConfig;
use crate::decoder::{decode_all, AudioDecoder};
use crate::error::{Result, SniffError};
use crate::format::{AudioFormat, StreamFormat, StreamInfo};
use crate::sniffer::FormatSniffer;
use core_runtime::logging::strip_path;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufReader, Read, Seek};
use std::path::Path;
use tracing::{debug, instrument, warn};

/// Container types this reader recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileType {
    Flac,
}

impl FileType {
    pub fn name(&self) -> &'static str {
        match self {
            FileType::Flac => "FLAC",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            FileType::Flac => "flac",
        }
    }
}

/// Description of a recognized audio file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFileFormat {
    pub file_type: FileType,
    pub format: AudioFormat,
    /// Samples per channel, if STREAMINFO records it
    pub frame_length: Option<u64>,
    /// File size in bytes, if known
    pub byte_length: Option<u64>,
}

/// Recognizes FLAC sources and opens them as [`FlacStream`]s.
#[derive(Debug, Clone)]
pub struct FlacFileReader {
    sniffer: FormatSniffer,
    verify_sample_count: bool,
}

impl Default for FlacFileReader {
    fn default() -> Self {
        Self::new()
    }
}

impl FlacFileReader {
    pub fn new() -> Self {
        Self::from_config(&DecodeConfig::default())
    }

    pub fn from_config(config: &DecodeConfig) -> Self {
        Self {
            sniffer: FormatSniffer::from_config(config),
            verify_sample_count: config.verify_sample_count,
        }
    }

    /// Describe the stream at the source's current position without
    /// consuming it.
    pub fn audio_file_format<R: Read + Seek>(
        &self,
        source: &mut R,
    ) -> std::result::Result<AudioFileFormat, SniffError> {
        let info = self.sniffer.identify_stream_info(source)?;
        let format = self.sniffer.describe(&info)?;

        Ok(AudioFileFormat {
            file_type: FileType::Flac,
            format: AudioFormat::flac(&format),
            frame_length: info.total_samples(),
            byte_length: None,
        })
    }

    /// Describe a FLAC file on disk.
    pub fn audio_file_format_from_path(
        &self,
        path: impl AsRef<Path>,
    ) -> std::result::Result<AudioFileFormat, SniffError> {
        let path = path.as_ref();
        let name = path.to_string_lossy();
        debug!(file = strip_path(&name), "Reading audio file format");

        let file = File::open(path).map_err(SniffError::Io)?;
        let byte_length = file.metadata().map(|m| m.len()).ok();

        let mut source = BufReader::new(file);
        let mut file_format = self.audio_file_format(&mut source)?;
        file_format.byte_length = byte_length;
        Ok(file_format)
    }

    /// Wrap a FLAC source in a stream positioned at its first byte.
    pub fn audio_input_stream<R: Read + Seek>(
        &self,
        mut source: R,
    ) -> std::result::Result<FlacStream<R>, SniffError> {
        let info = self.sniffer.identify_stream_info(&mut source)?;
        let stream_format = self.sniffer.describe(&info)?;

        Ok(FlacStream {
            source,
            format: AudioFormat::flac(&stream_format),
            info,
            verify_sample_count: self.verify_sample_count,
        })
    }

    /// Open a FLAC file on disk as a stream.
    #[instrument(skip(self, path))]
    pub fn audio_input_stream_from_path(
        &self,
        path: impl AsRef<Path>,
    ) -> std::result::Result<FlacStream<BufReader<File>>, SniffError> {
        let file = File::open(path.as_ref()).map_err(SniffError::Io)?;
        self.audio_input_stream(BufReader::new(file))
    }
}

/// A recognized, still-encoded FLAC stream.
///
/// Reading yields the encoded bytes unchanged. Call [`FlacStream::into_pcm`]
/// to decode it.
#[derive(Debug)]
pub struct FlacStream<R> {
    source: R,
    format: AudioFormat,
    info: StreamInfo,
    verify_sample_count: bool,
}

impl<R> FlacStream<R> {
    /// Encoded format of the stream.
    pub fn format(&self) -> &AudioFormat {
        &self.format
    }

    pub fn stream_format(&self) -> StreamFormat {
        StreamFormat::from_stream_info(&self.info)
    }

    /// STREAMINFO as read while sniffing.
    pub fn stream_info(&self) -> &StreamInfo {
        &self.info
    }

    /// Samples per channel, if known.
    pub fn frame_length(&self) -> Option<u64> {
        self.info.total_samples()
    }

    pub fn into_inner(self) -> R {
        self.source
    }
}

impl<R: Read> FlacStream<R> {
    /// Decode the stream with a decoder built by `open` and bridge it to
    /// PCM.
    pub fn into_pcm_with<D, F>(self, open: F) -> Result<PcmStream>
    where
        D: AudioDecoder,
        F: FnOnce(R) -> Result<D>,
    {
        let sniffed = self.stream_format();
        let mut decoder = open(self.source)?;

        let decoded = StreamFormat::from_stream_info(decoder.stream_info());
        if decoded != sniffed {
            warn!(?sniffed, ?decoded, "Decoder disagrees with sniffed format");
        }

        let samples = decode_all(&mut decoder, self.verify_sample_count)?;
        debug!(frames = samples.len(), "Bridging decoded stream to PCM");
        PcmStream::new(samples, decoded)
    }

    /// Decode the stream with Symphonia and bridge it to PCM.
    #[cfg(feature = "decoder-flac")]
    pub fn into_pcm(self) -> Result<PcmStream> {
        self.into_pcm_with(crate::decoder::SymphoniaDecoder::from_reader)
    }
}

impl<R: Read> Read for FlacStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.source.read(buf)
    }
}
