//! # Format Conversion Provider
//!
//! Negotiates FLAC to PCM conversions and performs them.
//!
//! Only decoding is offered: FLAC sources with 8, 16 or 24-bit samples and
//! one or two channels convert to signed little-endian PCM of the same depth,
//! channel count and rate. Encoding PCM to FLAC is refused.

use crate::bridge::PcmStream;
use crate::decoder::AudioDecoder;
use crate::error::{FlacError, Result};
use crate::format::{AudioFormat, Encoding};
use crate::reader::FlacStream;
use std::io::Read;
use tracing::{debug, instrument, trace};

const SOURCE_ENCODINGS: &[Encoding] = &[Encoding::Flac];
const TARGET_ENCODINGS: &[Encoding] = &[Encoding::PcmSigned];

/// FLAC to PCM conversion provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatConverter;

impl FormatConverter {
    pub fn new() -> Self {
        Self
    }

    /// Encodings this provider converts from.
    pub fn source_encodings(&self) -> &'static [Encoding] {
        SOURCE_ENCODINGS
    }

    /// Encodings this provider converts to.
    pub fn target_encodings(&self) -> &'static [Encoding] {
        TARGET_ENCODINGS
    }

    /// Encodings `source` can be converted to. Empty if none.
    pub fn target_encodings_for(&self, source: &AudioFormat) -> Vec<Encoding> {
        if is_bit_size_ok(source, true)
            && is_channels_ok(source, true)
            && source.encoding == Encoding::Flac
        {
            trace!(?source, "Can decode to PCM");
            vec![Encoding::PcmSigned]
        } else {
            trace!(?source, "Cannot convert");
            Vec::new()
        }
    }

    /// Formats with encoding `target` that `source` converts to.
    ///
    /// Unspecified bit sizes and channel counts in `source` are accepted and
    /// carried into the offered format.
    pub fn target_formats(&self, target: Encoding, source: &AudioFormat) -> Vec<AudioFormat> {
        target_formats(target, source, true)
    }

    /// Returns `true` if `source` can be converted to exactly `target`.
    pub fn is_conversion_supported(&self, target: &AudioFormat, source: &AudioFormat) -> bool {
        self.target_formats(target.encoding, source)
            .iter()
            .any(|offered| matches_format(offered, target))
    }

    /// Check that `source` can be decoded to `target`.
    ///
    /// # Errors
    ///
    /// - [`FlacError::EncodingNotSupported`] for PCM to FLAC requests
    /// - [`FlacError::ConversionNotSupported`] for anything else not offered
    pub fn check(&self, target: &AudioFormat, source: &AudioFormat) -> Result<()> {
        if source.encoding == Encoding::PcmSigned && target.encoding == Encoding::Flac {
            return Err(FlacError::EncodingNotSupported);
        }

        if target_formats(target.encoding, source, false).is_empty() {
            return Err(FlacError::ConversionNotSupported(format!(
                "{} to {} is not offered for this source",
                source.encoding.name(),
                target.encoding.name()
            )));
        }

        if source.channels == target.channels
            && source.bits_per_sample == target.bits_per_sample
            && !target.big_endian
            && source.encoding == Encoding::Flac
            && target.encoding == Encoding::PcmSigned
        {
            return Ok(());
        }

        Err(FlacError::ConversionNotSupported(format!(
            "unable to convert {:?} to {:?}",
            source, target
        )))
    }

    /// Convert `source` to `target` using a decoder built by `open`.
    #[instrument(skip(self, source, open))]
    pub fn convert_with<R, D, F>(
        &self,
        target: &AudioFormat,
        source: FlacStream<R>,
        open: F,
    ) -> Result<PcmStream>
    where
        R: Read,
        D: AudioDecoder,
        F: FnOnce(R) -> Result<D>,
    {
        self.check(target, source.format())?;
        debug!(source = ?source.format(), "Decoding FLAC to PCM");
        source.into_pcm_with(open)
    }

    /// Convert `source` to `target`, decoding with Symphonia.
    #[cfg(feature = "decoder-flac")]
    pub fn convert<R: Read>(&self, target: &AudioFormat, source: FlacStream<R>) -> Result<PcmStream> {
        self.convert_with(target, source, crate::decoder::SymphoniaDecoder::from_reader)
    }
}

fn is_bit_size_ok(format: &AudioFormat, not_specified_ok: bool) -> bool {
    match format.bits_per_sample {
        None => not_specified_ok,
        Some(bits) => matches!(bits, 8 | 16 | 24),
    }
}

fn is_channels_ok(format: &AudioFormat, not_specified_ok: bool) -> bool {
    match format.channels {
        None => not_specified_ok,
        Some(channels) => matches!(channels, 1 | 2),
    }
}

fn target_formats(target: Encoding, source: &AudioFormat, not_specified_ok: bool) -> Vec<AudioFormat> {
    if is_bit_size_ok(source, not_specified_ok)
        && is_channels_ok(source, not_specified_ok)
        && source.encoding == Encoding::Flac
        && target == Encoding::PcmSigned
    {
        vec![AudioFormat::pcm(
            source.sample_rate,
            source.bits_per_sample,
            source.channels,
        )]
    } else {
        Vec::new()
    }
}

/// Field-wise match where an unspecified value on either side matches.
fn matches_format(offered: &AudioFormat, wanted: &AudioFormat) -> bool {
    fn field<T: PartialEq>(a: Option<T>, b: Option<T>) -> bool {
        match (a, b) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }

    offered.encoding == wanted.encoding
        && offered.signed == wanted.signed
        && offered.big_endian == wanted.big_endian
        && field(offered.sample_rate, wanted.sample_rate)
        && field(offered.bits_per_sample, wanted.bits_per_sample)
        && field(offered.channels, wanted.channels)
}
