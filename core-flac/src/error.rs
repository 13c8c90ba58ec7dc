//! # Decode Error Types
//!
//! Error types for probing, decoding and bridging FLAC streams.

use std::io;
use thiserror::Error;

/// Errors that can occur while decoding a FLAC stream to PCM.
#[derive(Error, Debug)]
pub enum FlacError {
    // ========================================================================
    // Format Errors
    // ========================================================================
    /// Sample depth cannot be expressed as whole bytes (or is outside 8..=32).
    #[error("Unsupported sample depth: {0} bits (only whole-byte depths up to 32 bits)")]
    UnsupportedSampleDepth(u8),

    /// Stream is not a FLAC stream or its metadata is malformed.
    #[error("Unsupported or invalid audio format: {0}")]
    InvalidFormat(String),

    /// Format sniffing did not recognize the stream.
    #[error("Stream not recognized: {0}")]
    NotRecognized(String),

    // ========================================================================
    // Decoding Errors
    // ========================================================================
    /// Error occurred while decoding audio frames.
    #[error("Decoding error: {0}")]
    DecodingError(String),

    /// The decoder library failed internally.
    #[error("Decoder internal error: {0}")]
    DecoderError(String),

    /// Decoded audio does not hash to the STREAMINFO MD5 signature.
    #[error("MD5 signature mismatch: decoded audio differs from the encoded stream")]
    ChecksumMismatch,

    /// Fully decoded sample count disagrees with the STREAMINFO total.
    #[error("Decoded {actual} samples per channel, stream declares {expected}")]
    SampleCountMismatch { expected: u64, actual: u64 },

    // ========================================================================
    // Conversion Errors
    // ========================================================================
    /// Requested format conversion is not offered.
    #[error("Conversion not supported: {0}")]
    ConversionNotSupported(String),

    /// Encoding PCM to FLAC is not implemented.
    #[error("FLAC encoding is not supported")]
    EncodingNotSupported,

    // ========================================================================
    // Stream Errors
    // ========================================================================
    /// Seeking is not supported on the probe window.
    #[error("Seeking not supported")]
    SeekNotSupported,

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

impl FlacError {
    /// Returns `true` if the stream itself is unsuitable, as opposed to an
    /// environmental failure.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            FlacError::UnsupportedSampleDepth(_)
                | FlacError::InvalidFormat(_)
                | FlacError::NotRecognized(_)
        )
    }

    /// Returns `true` if a caller may reasonably try another format handler.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FlacError::NotRecognized(_) | FlacError::ConversionNotSupported(_)
        )
    }
}

/// Why a format sniff did not produce a descriptor.
///
/// `NotRecognized` covers both "this is not FLAC" and "the metadata did not
/// fit in the probe window"; the caller is free to try another format.
/// `Io` is reserved for genuine faults of the underlying source.
#[derive(Error, Debug)]
pub enum SniffError {
    #[error("Stream not recognized as FLAC: {0}")]
    NotRecognized(String),

    /// The stream is FLAC but its depth is rejected by the sniffer's policy.
    #[error("FLAC stream has unsupported sample depth: {0} bits")]
    UnsupportedSampleDepth(u8),

    #[error("I/O error while probing: {0}")]
    Io(#[source] io::Error),
}

impl SniffError {
    pub fn is_not_recognized(&self) -> bool {
        matches!(self, SniffError::NotRecognized(_))
    }
}

impl From<SniffError> for FlacError {
    fn from(err: SniffError) -> Self {
        match err {
            SniffError::NotRecognized(reason) => FlacError::NotRecognized(reason),
            SniffError::UnsupportedSampleDepth(bits) => FlacError::UnsupportedSampleDepth(bits),
            SniffError::Io(e) => FlacError::IoError(e),
        }
    }
}

/// Result type for decode operations.
pub type Result<T> = std::result::Result<T, FlacError>;
