//! # Decode Configuration
//!
//! Configuration types for probing, decoding and exporting FLAC streams.

use crate::error::{FlacError, Result};
use crate::sniffer::{DEFAULT_PROBE_LIMIT, MIN_PROBE_LIMIT};
use serde::{Deserialize, Serialize};

/// Decode pipeline configuration.
///
/// Controls how far the sniffer may read, which sample depths are accepted,
/// and how strictly the decoded sample count is checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeConfig {
    /// Maximum number of bytes the format sniffer may consume before giving
    /// up on a stream.
    ///
    /// Streams whose metadata does not fit in this window are reported as
    /// not recognized, even if they are valid FLAC.
    ///
    /// Default: 8192 bytes.
    #[serde(default = "default_probe_limit")]
    pub probe_limit: usize,

    /// Sample depths accepted when sniffing and bridging a stream.
    ///
    /// Default: any whole-byte depth.
    #[serde(default = "default_stream_depth")]
    pub stream_depth: DepthPolicy,

    /// Sample depths accepted by WAV export.
    ///
    /// Default: exactly 16 bits.
    #[serde(default = "default_export_depth")]
    pub export_depth: DepthPolicy,

    /// Whether a decoded sample count that disagrees with STREAMINFO is
    /// an error. Streams that declare 0 samples are never checked.
    ///
    /// Default: true.
    #[serde(default = "default_verify_sample_count")]
    pub verify_sample_count: bool,

    /// Whether WAV export fails when decoded audio does not match the
    /// STREAMINFO MD5 signature. A blank signature is only logged.
    ///
    /// Default: true.
    #[serde(default = "default_verify_md5")]
    pub verify_md5: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            probe_limit: default_probe_limit(),
            stream_depth: default_stream_depth(),
            export_depth: default_export_depth(),
            verify_sample_count: default_verify_sample_count(),
            verify_md5: default_verify_md5(),
        }
    }
}

impl DecodeConfig {
    /// Configuration that only accepts CD-style 16-bit streams everywhere.
    pub fn strict() -> Self {
        Self {
            stream_depth: DepthPolicy::Exactly(16),
            ..Default::default()
        }
    }

    /// Configuration for damaged or unusually laid out files.
    ///
    /// - Larger probe window (64 KB) for files with big leading metadata
    /// - Export accepts any whole-byte depth
    /// - Truncated or damaged streams are not treated as errors
    pub fn lenient() -> Self {
        Self {
            probe_limit: 64 * 1024,
            stream_depth: DepthPolicy::ByteAligned,
            export_depth: DepthPolicy::ByteAligned,
            verify_sample_count: false,
            verify_md5: false,
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.probe_limit < MIN_PROBE_LIMIT {
            return Err(FlacError::InvalidConfig(format!(
                "probe_limit must be at least {} bytes",
                MIN_PROBE_LIMIT
            )));
        }

        self.stream_depth.validate("stream_depth")?;
        self.export_depth.validate("export_depth")?;

        Ok(())
    }
}

// ============================================================================
// Sample Depth Policy
// ============================================================================

/// Which sample depths a stage of the pipeline accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthPolicy {
    /// Any multiple of 8 from 8 to 32 bits.
    ByteAligned,
    /// Exactly this many bits.
    Exactly(u8),
}

impl DepthPolicy {
    pub fn accepts(&self, bit_depth: u8) -> bool {
        let byte_aligned = bit_depth % 8 == 0 && (8..=32).contains(&bit_depth);
        match self {
            DepthPolicy::ByteAligned => byte_aligned,
            DepthPolicy::Exactly(bits) => byte_aligned && bit_depth == *bits,
        }
    }

    /// Fails with [`FlacError::UnsupportedSampleDepth`] if `bit_depth` is
    /// not accepted.
    pub fn check(&self, bit_depth: u8) -> Result<()> {
        if self.accepts(bit_depth) {
            Ok(())
        } else {
            Err(FlacError::UnsupportedSampleDepth(bit_depth))
        }
    }

    fn validate(&self, field: &str) -> Result<()> {
        match self {
            DepthPolicy::ByteAligned => Ok(()),
            DepthPolicy::Exactly(bits) if DepthPolicy::ByteAligned.accepts(*bits) => Ok(()),
            DepthPolicy::Exactly(bits) => Err(FlacError::InvalidConfig(format!(
                "{} must be a multiple of 8 between 8 and 32, got {}",
                field, bits
            ))),
        }
    }
}

// ============================================================================
// Default Functions (for serde)
// ============================================================================

fn default_probe_limit() -> usize {
    DEFAULT_PROBE_LIMIT
}

fn default_stream_depth() -> DepthPolicy {
    DepthPolicy::ByteAligned
}

fn default_export_depth() -> DepthPolicy {
    DepthPolicy::Exactly(16)
}

fn default_verify_sample_count() -> bool {
    true
}

fn default_verify_md5() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DecodeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.probe_limit, 8192);
        assert_eq!(config.export_depth, DepthPolicy::Exactly(16));
        assert!(config.verify_sample_count);
        assert!(config.verify_md5);
    }

    #[test]
    fn test_presets() {
        let strict = DecodeConfig::strict();
        assert!(strict.validate().is_ok());
        assert!(!strict.stream_depth.accepts(24));

        let lenient = DecodeConfig::lenient();
        assert!(lenient.validate().is_ok());
        assert!(lenient.probe_limit > DecodeConfig::default().probe_limit);
        assert!(lenient.export_depth.accepts(24));
        assert!(!lenient.verify_sample_count);
        assert!(!lenient.verify_md5);
    }

    #[test]
    fn test_config_validation() {
        let mut config = DecodeConfig::default();

        // Too small to hold the minimal metadata prefix
        config.probe_limit = 41;
        assert!(matches!(config.validate(), Err(FlacError::InvalidConfig(_))));
        config.probe_limit = 42;
        assert!(config.validate().is_ok());

        config.export_depth = DepthPolicy::Exactly(12);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_depth_policy() {
        assert!(DepthPolicy::ByteAligned.accepts(8));
        assert!(DepthPolicy::ByteAligned.accepts(32));
        assert!(!DepthPolicy::ByteAligned.accepts(12));
        assert!(!DepthPolicy::ByteAligned.accepts(0));
        assert!(!DepthPolicy::ByteAligned.accepts(40));

        assert!(DepthPolicy::Exactly(16).accepts(16));
        assert!(matches!(
            DepthPolicy::Exactly(16).check(24),
            Err(FlacError::UnsupportedSampleDepth(24))
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: DecodeConfig = serde_json::from_str(r#"{"probe_limit": 4096}"#).unwrap();
        assert_eq!(config.probe_limit, 4096);
        assert_eq!(config.stream_depth, DepthPolicy::ByteAligned);
        assert!(config.verify_sample_count);

        let config: DecodeConfig =
            serde_json::from_str(r#"{"export_depth": {"exactly": 24}}"#).unwrap();
        assert_eq!(config.export_depth, DepthPolicy::Exactly(24));
    }
}
