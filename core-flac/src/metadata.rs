//! # FLAC Metadata Reader
//!
//! Reads the `fLaC` marker and the metadata block chain that precedes the
//! audio frames. Every read is exactly sized, so the reader never pulls more
//! bytes from its source than the metadata it parses or skips.
//!
//! ```text
//! "fLaC" | header(4) body(len) | header(4) body(len) | ... | audio frames
//!          ^ bit 7: last block, bits 0-6: block type, 24-bit length
//! ```

use crate::error::{FlacError, Result};
use crate::format::StreamInfo;
use std::io::Read;
use tracing::trace;

/// Stream marker at the very start of a native FLAC stream.
pub const FLAC_MARKER: [u8; 4] = *b"fLaC";

/// Length of a metadata block header.
pub const BLOCK_HEADER_LENGTH: usize = 4;

/// Smallest possible metadata prefix: marker, one header and STREAMINFO.
pub const MIN_METADATA_LENGTH: usize = FLAC_MARKER.len() + BLOCK_HEADER_LENGTH + StreamInfo::LENGTH;

const SKIP_CHUNK: usize = 1024;

/// Metadata block types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataBlockType {
    StreamInfo,
    Padding,
    Application,
    SeekTable,
    VorbisComment,
    CueSheet,
    Picture,
    /// Types 7-126, reserved by the format
    Reserved(u8),
}

impl MetadataBlockType {
    /// Decode a 7-bit block type code. Code 127 is forbidden.
    pub fn from_code(code: u8) -> Result<Self> {
        Ok(match code {
            0 => Self::StreamInfo,
            1 => Self::Padding,
            2 => Self::Application,
            3 => Self::SeekTable,
            4 => Self::VorbisComment,
            5 => Self::CueSheet,
            6 => Self::Picture,
            7..=126 => Self::Reserved(code),
            _ => {
                return Err(FlacError::InvalidFormat(format!(
                    "invalid metadata block type {}",
                    code
                )))
            }
        })
    }
}

/// Parsed metadata block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataBlockHeader {
    pub block_type: MetadataBlockType,
    pub is_last: bool,
    pub length: u32,
}

impl MetadataBlockHeader {
    pub fn parse(bytes: [u8; BLOCK_HEADER_LENGTH]) -> Result<Self> {
        Ok(Self {
            block_type: MetadataBlockType::from_code(bytes[0] & 0x7F)?,
            is_last: bytes[0] & 0x80 != 0,
            length: u32::from_be_bytes([0, bytes[1], bytes[2], bytes[3]]),
        })
    }
}

/// Incremental reader over a FLAC metadata chain.
pub struct MetadataReader<R: Read> {
    inner: R,
    marker_read: bool,
    finished: bool,
    stream_info: Option<StreamInfo>,
    blocks_read: usize,
}

impl<R: Read> MetadataReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            marker_read: false,
            finished: false,
            stream_info: None,
            blocks_read: 0,
        }
    }

    /// Read the next metadata block, parsing STREAMINFO and skipping the
    /// rest. Returns `Ok(None)` once the last block has been read.
    ///
    /// # Errors
    ///
    /// - [`FlacError::InvalidFormat`] for a missing marker, a forbidden
    ///   block type, or a malformed or repeated STREAMINFO
    /// - [`FlacError::IoError`] with `UnexpectedEof` if the source ends
    ///   inside the metadata
    pub fn read_metadata_block(&mut self) -> Result<Option<MetadataBlockHeader>> {
        if self.finished {
            return Ok(None);
        }

        if !self.marker_read {
            let mut marker = [0u8; 4];
            self.inner.read_exact(&mut marker)?;
            if marker != FLAC_MARKER {
                return Err(FlacError::InvalidFormat(
                    "missing fLaC stream marker".to_string(),
                ));
            }
            self.marker_read = true;
        }

        let mut raw = [0u8; BLOCK_HEADER_LENGTH];
        self.inner.read_exact(&mut raw)?;
        let header = MetadataBlockHeader::parse(raw)?;

        match header.block_type {
            MetadataBlockType::StreamInfo => {
                if header.length as usize != StreamInfo::LENGTH {
                    return Err(FlacError::InvalidFormat(format!(
                        "STREAMINFO block is {} bytes, expected {}",
                        header.length,
                        StreamInfo::LENGTH
                    )));
                }
                if self.stream_info.is_some() {
                    return Err(FlacError::InvalidFormat(
                        "stream contains more than one STREAMINFO block".to_string(),
                    ));
                }

                let mut body = [0u8; StreamInfo::LENGTH];
                self.inner.read_exact(&mut body)?;
                self.stream_info = Some(StreamInfo::parse(&body)?);
            }
            _ => self.skip(header.length as usize)?,
        }

        trace!(
            block_type = ?header.block_type,
            length = header.length,
            is_last = header.is_last,
            "Read metadata block"
        );

        self.blocks_read += 1;
        self.finished = header.is_last;
        Ok(Some(header))
    }

    /// Read blocks until STREAMINFO has been seen, returning it.
    ///
    /// Stops early, leaving the remaining blocks unread, so that a probe
    /// only needs the bytes up to the end of STREAMINFO.
    pub fn read_stream_info(&mut self) -> Result<StreamInfo> {
        loop {
            if let Some(info) = &self.stream_info {
                return Ok(info.clone());
            }
            if self.read_metadata_block()?.is_none() {
                return Err(FlacError::InvalidFormat(
                    "metadata ended without a STREAMINFO block".to_string(),
                ));
            }
        }
    }

    /// Read the whole metadata chain, leaving the source at the first
    /// audio frame.
    pub fn read_all(&mut self) -> Result<StreamInfo> {
        while self.read_metadata_block()?.is_some() {}
        self.stream_info.clone().ok_or_else(|| {
            FlacError::InvalidFormat("metadata ended without a STREAMINFO block".to_string())
        })
    }

    pub fn stream_info(&self) -> Option<&StreamInfo> {
        self.stream_info.as_ref()
    }

    pub fn blocks_read(&self) -> usize {
        self.blocks_read
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn skip(&mut self, mut remaining: usize) -> Result<()> {
        let mut scratch = [0u8; SKIP_CHUNK];
        while remaining > 0 {
            let n = remaining.min(SKIP_CHUNK);
            self.inner.read_exact(&mut scratch[..n])?;
            remaining -= n;
        }
        Ok(())
    }
}
