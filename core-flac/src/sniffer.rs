//! # Format Sniffer
//!
//! Decides whether a seekable source holds a FLAC stream by reading its
//! metadata through a bounded [`ProbeWindow`], and describes the stream if
//! it does.
//!
//! ## Contract
//!
//! - At most `limit` bytes are read from the source
//! - The source is rewound to its starting position on every outcome
//! - Anything that is not FLAC, or whose STREAMINFO lies beyond the limit,
//!   is reported as [`SniffError::NotRecognized`]
//! - Genuine I/O faults are reported as [`SniffError::Io`]

use crate::config::{DecodeConfig, DepthPolicy};
use crate::error::{FlacError, SniffError};
use crate::format::{StreamFormat, StreamInfo};
use crate::metadata::{MetadataReader, MIN_METADATA_LENGTH};
use crate::probe::ProbeWindow;
use std::io::{self, Read, Seek};
use tracing::{debug, instrument, warn};

/// Default number of bytes a sniff may read.
///
/// Files with more leading metadata than this (large embedded pictures
/// placed before STREAMINFO, for example) are not recognized. Existing
/// callers rely on this value; change it through [`DecodeConfig`] rather
/// than here.
pub const DEFAULT_PROBE_LIMIT: usize = 8192;

/// Smallest limit that can hold a complete metadata prefix.
pub const MIN_PROBE_LIMIT: usize = MIN_METADATA_LENGTH;

/// Bounded FLAC format sniffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatSniffer {
    limit: usize,
    depth: DepthPolicy,
}

impl Default for FormatSniffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatSniffer {
    pub fn new() -> Self {
        Self {
            limit: DEFAULT_PROBE_LIMIT,
            depth: DepthPolicy::ByteAligned,
        }
    }

    pub fn from_config(config: &DecodeConfig) -> Self {
        Self {
            limit: config.probe_limit,
            depth: config.stream_depth,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_depth_policy(mut self, depth: DepthPolicy) -> Self {
        self.depth = depth;
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Identify the stream at the source's current position.
    ///
    /// # Errors
    ///
    /// - [`SniffError::NotRecognized`] if the bytes are not FLAC or the
    ///   metadata does not fit in the probe window
    /// - [`SniffError::UnsupportedSampleDepth`] if the stream is FLAC but its
    ///   depth is rejected by the depth policy
    /// - [`SniffError::Io`] if the source fails
    #[instrument(skip(self, source), fields(limit = self.limit))]
    pub fn identify<R: Read + Seek>(&self, source: &mut R) -> Result<StreamFormat, SniffError> {
        let info = self.identify_stream_info(source)?;
        self.describe(&info)
    }

    /// Apply the depth policy to a STREAMINFO block and describe the stream.
    pub fn describe(&self, info: &StreamInfo) -> Result<StreamFormat, SniffError> {
        let format = StreamFormat::from_stream_info(info);

        if !self.depth.accepts(format.bit_depth()) {
            debug!(bit_depth = format.bit_depth(), "FLAC stream depth rejected");
            return Err(SniffError::UnsupportedSampleDepth(format.bit_depth()));
        }

        debug!(
            sample_rate = format.sample_rate(),
            bit_depth = format.bit_depth(),
            channels = format.channels(),
            "Recognized FLAC stream"
        );
        Ok(format)
    }

    /// Read the STREAMINFO block through the probe window without applying
    /// the depth policy.
    pub fn identify_stream_info<R: Read + Seek>(
        &self,
        source: &mut R,
    ) -> Result<StreamInfo, SniffError> {
        let mut window = ProbeWindow::open(source, self.limit).map_err(SniffError::Io)?;

        let outcome = MetadataReader::new(&mut window).read_stream_info();
        let consumed = window.consumed();
        let hit_limit = window.hit_limit();

        if let Err(e) = window.restore() {
            warn!(error = %e, "Could not rewind source after probing");
            return Err(SniffError::Io(e));
        }

        outcome.map_err(|e| self.classify(e, consumed, hit_limit))
    }

    fn classify(&self, err: FlacError, consumed: usize, hit_limit: bool) -> SniffError {
        let reason = match err {
            FlacError::IoError(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                if hit_limit {
                    format!("no STREAMINFO within the first {} bytes", self.limit)
                } else {
                    format!("metadata ended after {} bytes", consumed)
                }
            }
            FlacError::IoError(e) => {
                debug!(error = %e, "Source failed while probing");
                return SniffError::Io(e);
            }
            other => other.to_string(),
        };

        debug!(reason = %reason, consumed, "Stream not recognized as FLAC");
        SniffError::NotRecognized(reason)
    }
}
