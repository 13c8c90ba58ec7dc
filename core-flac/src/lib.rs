//! # FLAC to PCM Module
//!
//! Exposes FLAC audio as plain interleaved PCM.
//!
//! ## Overview
//!
//! This module handles:
//! - Format sniffing from a bounded prefix of a seekable source, without
//!   consuming it
//! - Audio decoding using symphonia (optional, feature-gated)
//! - Pull-based PCM streams over fully decoded audio
//! - Format conversion queries (FLAC to signed little-endian PCM)
//! - WAV export with sample count and MD5 verification
//!
//! ## Usage
//!
//! ```rust
//! use core_flac::FormatSniffer;
//! use std::io::Cursor;
//!
//! let mut source = Cursor::new(b"RIFF....WAVEfmt ".to_vec());
//! let err = FormatSniffer::new().identify(&mut source).unwrap_err();
//!
//! assert!(err.is_not_recognized());
//! assert_eq!(source.position(), 0);
//! ```

pub mod bridge;
pub mod buffer;
pub mod checksum;
pub mod config;
pub mod conversion;
pub mod decoder;
pub mod error;
pub mod export;
pub mod format;
pub mod metadata;
pub mod probe;
pub mod reader;
pub mod sample;
pub mod sniffer;
pub mod wav;

pub use bridge::PcmStream;
pub use buffer::SampleBuffer;
pub use checksum::Md5Check;
pub use config::{DecodeConfig, DepthPolicy};
pub use conversion::FormatConverter;
pub use decoder::{decode_all, AudioDecoder};
pub use error::{FlacError, Result, SniffError};
pub use export::{export_wav, ExportSummary};
pub use format::{AudioFormat, Encoding, PcmFormat, StreamFormat, StreamInfo};
pub use metadata::MetadataReader;
pub use probe::{ProbeWindow, WindowRead};
pub use reader::{AudioFileFormat, FileType, FlacFileReader, FlacStream};
pub use sample::{encode_sample, SampleEncoder};
pub use sniffer::{FormatSniffer, DEFAULT_PROBE_LIMIT};

#[cfg(feature = "decoder-flac")]
pub use decoder::SymphoniaDecoder;
#[cfg(feature = "decoder-flac")]
pub use export::{flac_file_to_wav, flac_to_wav};
