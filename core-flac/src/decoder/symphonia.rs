//! # Symphonia Decoder Implementation
//!
//! FLAC block decoder backed by the Symphonia library.

use crate::buffer::SampleBuffer;
use crate::decoder::sample_converter::SampleConverter;
use crate::decoder::AudioDecoder;
use crate::error::{FlacError, Result};
use crate::format::StreamInfo;
use crate::metadata::MetadataReader;
use std::io::{Cursor, Read};
use std::path::Path;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_FLAC};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, error, info, instrument, trace, warn};

/// Corrupted packets skipped in a row before decoding is abandoned.
const MAX_CONSECUTIVE_ERRORS: usize = 10;

/// Symphonia-backed FLAC decoder.
///
/// The whole encoded stream is held in memory. STREAMINFO is parsed
/// independently of Symphonia so that [`AudioDecoder::stream_info`] reports
/// exactly what the file declares.
pub struct SymphoniaDecoder {
    /// Format reader (demuxer) - owns the media source stream
    format_reader: Box<dyn FormatReader>,

    /// FLAC codec decoder
    decoder: Box<dyn Decoder>,

    /// Selected track ID
    track_id: u32,

    stream_info: StreamInfo,

    /// Frames decoded so far
    position_frames: u64,

    /// End-of-stream flag
    eof: bool,
}

impl SymphoniaDecoder {
    /// Create a decoder over a complete encoded FLAC stream.
    ///
    /// # Errors
    ///
    /// - [`FlacError::InvalidFormat`] if the data is not FLAC
    /// - [`FlacError::DecoderError`] if the codec cannot be instantiated
    #[instrument(skip(data), fields(bytes = data.len()))]
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let stream_info = MetadataReader::new(data.as_slice()).read_all()?;

        let media_source = Box::new(Cursor::new(data)) as Box<dyn MediaSource>;
        let mss = MediaSourceStream::new(media_source, Default::default());

        let mut hint = Hint::new();
        hint.with_extension("flac");

        let probe_result = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| {
                error!("Format probe failed: {}", e);
                FlacError::InvalidFormat(format!("Failed to probe format: {}", e))
            })?;

        let format_reader = probe_result.format;

        let track = format_reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec == CODEC_TYPE_FLAC)
            .ok_or_else(|| {
                error!("No FLAC track found");
                FlacError::InvalidFormat("No FLAC audio track".to_string())
            })?;
        let track_id = track.id;

        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| {
                error!("Failed to create decoder: {}", e);
                FlacError::DecoderError(format!("Failed to create codec decoder: {}", e))
            })?;

        info!(
            sample_rate = stream_info.sample_rate,
            channels = stream_info.num_channels,
            bit_depth = stream_info.sample_depth,
            total_samples = stream_info.num_samples,
            "Decoder initialized"
        );

        Ok(Self {
            format_reader,
            decoder,
            track_id,
            stream_info,
            position_frames: 0,
            eof: false,
        })
    }

    /// Read `reader` to its end and decode the bytes.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Decode a FLAC file from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref()).map_err(|e| {
            error!(file = %path.as_ref().display(), "Failed to read file: {}", e);
            FlacError::IoError(e)
        })?;
        Self::from_bytes(data)
    }

    /// Frames decoded so far.
    pub fn position_frames(&self) -> u64 {
        self.position_frames
    }

    fn decode_next_packet(&mut self) -> Result<Option<SampleBuffer>> {
        if self.eof {
            return Ok(None);
        }

        let mut consecutive_errors = 0;

        loop {
            let packet = match self.format_reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    debug!("Reached end of stream at {} frames", self.position_frames);
                    self.eof = true;
                    return Ok(None);
                }
                Err(SymphoniaError::ResetRequired) => {
                    return Err(FlacError::DecoderError(
                        "Track list changed, reset required".to_string(),
                    ));
                }
                Err(e) => {
                    error!("Fatal format reader error: {}", e);
                    return Err(FlacError::DecodingError(format!(
                        "Failed to read packet: {}",
                        e
                    )));
                }
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            // AudioBufferRef borrows the decoder; convert before the next call.
            match self.decoder.decode(&packet) {
                Ok(decoded) => {
                    let samples =
                        SampleConverter::to_native_depth(&decoded, self.stream_info.sample_depth)?;
                    self.position_frames += samples.len() as u64;

                    trace!(
                        frames = samples.len(),
                        position = self.position_frames,
                        "Decoded packet"
                    );

                    return Ok(Some(samples));
                }
                Err(SymphoniaError::IoError(err)) => {
                    consecutive_errors += 1;
                    warn!(
                        "Skipping corrupted packet (I/O error, attempt {}/{}): {}",
                        consecutive_errors, MAX_CONSECUTIVE_ERRORS, err
                    );

                    if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                        error!("Too many consecutive decode errors, stream may be corrupted");
                        return Err(FlacError::DecodingError(format!(
                            "Stream corruption after {} failed packets",
                            MAX_CONSECUTIVE_ERRORS
                        )));
                    }

                    continue;
                }
                Err(SymphoniaError::DecodeError(err)) => {
                    consecutive_errors += 1;
                    warn!(
                        "Skipping packet with decode error (attempt {}/{}): {}",
                        consecutive_errors, MAX_CONSECUTIVE_ERRORS, err
                    );

                    if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                        error!("Too many consecutive decode errors, stream may be corrupted");
                        return Err(FlacError::DecodingError(format!(
                            "Decoder failure after {} failed packets: {}",
                            MAX_CONSECUTIVE_ERRORS, err
                        )));
                    }

                    continue;
                }
                Err(e) => {
                    error!("Fatal decode error: {}", e);
                    return Err(FlacError::DecodingError(format!(
                        "Failed to decode packet: {}",
                        e
                    )));
                }
            }
        }
    }
}

impl AudioDecoder for SymphoniaDecoder {
    fn stream_info(&self) -> &StreamInfo {
        &self.stream_info
    }

    fn next_block(&mut self) -> Result<Option<SampleBuffer>> {
        self.decode_next_packet()
    }
}
