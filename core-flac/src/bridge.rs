//! # PCM Pull Stream
//!
//! Presents a fully decoded [`SampleBuffer`] as a pull-based stream of
//! interleaved PCM frames.
//!
//! ## Design
//!
//! - **Granularity**: one call to [`PcmStream::next_frame`] yields exactly one
//!   frame, i.e. one encoded sample from every channel in channel order
//! - **Termination**: after the last frame the stream reports end of stream
//!   forever and releases the decoded samples
//! - **Byte access**: [`std::io::Read`] is implemented on top of the frame
//!   cursor for consumers that want arbitrary-sized reads
//!
//! ## Usage
//!
//! ```rust
//! use core_flac::{PcmStream, SampleBuffer, StreamFormat};
//!
//! let samples = SampleBuffer::from_channels(vec![vec![100, -100], vec![200, -200]])?;
//! let mut stream = PcmStream::new(samples, StreamFormat::new(44100, 16, 2))?;
//!
//! assert_eq!(&stream.next_frame().unwrap()[..], &[0x64, 0x00, 0xC8, 0x00]);
//! assert_eq!(&stream.next_frame().unwrap()[..], &[0x9C, 0xFF, 0x38, 0xFF]);
//! assert!(stream.next_frame().is_none());
//! # Ok::<(), core_flac::FlacError>(())
//! ```

use crate::buffer::SampleBuffer;
use crate::error::{FlacError, Result};
use crate::format::{PcmFormat, StreamFormat};
use crate::sample::SampleEncoder;
use bytes::{Buf, Bytes, BytesMut};
use std::io::{self, Read, Write};
use tracing::{debug, trace};

/// Cursor over the decoded samples.
#[derive(Debug)]
enum CursorState {
    /// Frames `index..samples.len()` are still to be emitted.
    Ready { samples: SampleBuffer, index: usize },
    /// Terminal. The sample buffer has been released.
    Exhausted,
}

/// Pull-based PCM frame stream over decoded samples.
#[derive(Debug)]
pub struct PcmStream {
    format: PcmFormat,
    encoder: SampleEncoder,
    state: CursorState,
    /// Unread tail of a frame handed out through `Read`.
    pending: Bytes,
    frames_emitted: u64,
}

impl PcmStream {
    /// Create a stream over `samples` laid out as `format`.
    ///
    /// # Errors
    ///
    /// - [`FlacError::UnsupportedSampleDepth`] if the depth is not a whole
    ///   number of bytes
    /// - [`FlacError::InvalidFormat`] if the buffer's channel count differs
    ///   from the format's
    pub fn new(samples: SampleBuffer, format: StreamFormat) -> Result<Self> {
        let pcm = format.pcm_format()?;
        let encoder = SampleEncoder::for_bit_depth(pcm.bit_depth)?;

        if samples.channel_count() != usize::from(pcm.channels) {
            return Err(FlacError::InvalidFormat(format!(
                "decoded {} channels, stream declares {}",
                samples.channel_count(),
                pcm.channels
            )));
        }

        debug!(
            frames = samples.len(),
            channels = pcm.channels,
            bit_depth = pcm.bit_depth,
            "PCM stream ready"
        );

        Ok(Self {
            format: pcm,
            encoder,
            state: CursorState::Ready { samples, index: 0 },
            pending: Bytes::new(),
            frames_emitted: 0,
        })
    }

    /// Layout of the bytes this stream produces.
    pub fn format(&self) -> &PcmFormat {
        &self.format
    }

    /// Size of one frame in bytes.
    pub fn frame_size(&self) -> usize {
        self.format.frame_size()
    }

    /// Frames not yet emitted.
    pub fn remaining_frames(&self) -> usize {
        match &self.state {
            CursorState::Ready { samples, index } => samples.len() - index,
            CursorState::Exhausted => 0,
        }
    }

    pub fn frames_emitted(&self) -> u64 {
        self.frames_emitted
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.state, CursorState::Exhausted)
    }

    /// Produce the next interleaved frame, or `None` at end of stream.
    ///
    /// Once `None` has been returned every later call returns `None`.
    pub fn next_frame(&mut self) -> Option<Bytes> {
        let CursorState::Ready { samples, index } = &mut self.state else {
            return None;
        };

        if *index >= samples.len() {
            debug!(frames = self.frames_emitted, "PCM stream exhausted");
            self.state = CursorState::Exhausted;
            return None;
        }

        let mut frame = BytesMut::with_capacity(self.format.frame_size());
        for sample in samples.frame(*index) {
            self.encoder.put(sample, &mut frame);
        }
        *index += 1;
        self.frames_emitted += 1;

        Some(frame.freeze())
    }

    /// Write every remaining frame to `sink`, returning the bytes written.
    ///
    /// Frames are written one at a time; wrap unbuffered sinks in a
    /// [`std::io::BufWriter`].
    pub fn copy_to<W: Write + ?Sized>(&mut self, sink: &mut W) -> io::Result<u64> {
        let mut written = 0u64;

        if !self.pending.is_empty() {
            sink.write_all(&self.pending)?;
            written += self.pending.len() as u64;
            self.pending.clear();
        }

        while let Some(frame) = self.next_frame() {
            sink.write_all(&frame)?;
            written += frame.len() as u64;
        }

        trace!(bytes = written, "Copied PCM stream to sink");
        Ok(written)
    }

    /// Release the decoded samples and end the stream early.
    pub fn close(&mut self) {
        if !self.is_exhausted() {
            debug!(
                frames = self.frames_emitted,
                remaining = self.remaining_frames(),
                "PCM stream closed"
            );
        }
        self.state = CursorState::Exhausted;
        self.pending = Bytes::new();
    }
}

impl Iterator for PcmStream {
    type Item = Bytes;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_frame()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining_frames();
        (remaining, Some(remaining))
    }
}

impl std::iter::FusedIterator for PcmStream {}

impl Read for PcmStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;

        while filled < buf.len() {
            if self.pending.is_empty() {
                match self.next_frame() {
                    Some(frame) => self.pending = frame,
                    None => break,
                }
            }

            let n = self.pending.len().min(buf.len() - filled);
            buf[filled..filled + n].copy_from_slice(&self.pending[..n]);
            self.pending.advance(n);
            filled += n;
        }

        Ok(filled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stereo(left: Vec<i32>, right: Vec<i32>, bits: u8) -> PcmStream {
        let samples = SampleBuffer::from_channels(vec![left, right]).unwrap();
        PcmStream::new(samples, StreamFormat::new(44100, bits, 2)).unwrap()
    }

    #[test]
    fn test_interleaves_channels() {
        let mut stream = stereo(vec![100, -100], vec![200, -200], 16);

        assert_eq!(stream.remaining_frames(), 2);
        assert_eq!(&stream.next_frame().unwrap()[..], &[0x64, 0x00, 0xC8, 0x00]);
        assert_eq!(&stream.next_frame().unwrap()[..], &[0x9C, 0xFF, 0x38, 0xFF]);
        assert!(stream.next_frame().is_none());
        assert!(stream.is_exhausted());
        assert_eq!(stream.frames_emitted(), 2);
    }

    #[test]
    fn test_exhaustion_is_sticky() {
        let mut stream = stereo(vec![1], vec![2], 8);
        assert!(stream.next_frame().is_some());
        for _ in 0..3 {
            assert!(stream.next_frame().is_none());
        }
        assert_eq!(stream.remaining_frames(), 0);
    }

    #[test]
    fn test_empty_buffer() {
        let samples = SampleBuffer::new(1);
        let mut stream = PcmStream::new(samples, StreamFormat::new(8000, 8, 1)).unwrap();
        assert!(stream.next_frame().is_none());
        assert!(stream.is_exhausted());
    }

    #[test]
    fn test_rejects_unaligned_depth() {
        let samples = SampleBuffer::zeroed(2, 4);
        let err = PcmStream::new(samples, StreamFormat::new(44100, 20, 2)).unwrap_err();
        assert!(matches!(err, FlacError::UnsupportedSampleDepth(20)));
    }

    #[test]
    fn test_rejects_channel_mismatch() {
        let samples = SampleBuffer::zeroed(1, 4);
        let err = PcmStream::new(samples, StreamFormat::new(44100, 16, 2)).unwrap_err();
        assert!(matches!(err, FlacError::InvalidFormat(_)));
    }

    #[test]
    fn test_read_splits_frames() {
        let mut stream = stereo(vec![100, -100], vec![200, -200], 16);

        let mut first = [0u8; 3];
        assert_eq!(stream.read(&mut first).unwrap(), 3);
        assert_eq!(first, [0x64, 0x00, 0xC8]);

        let mut rest = Vec::new();
        stream.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, vec![0x00, 0x9C, 0xFF, 0x38, 0xFF]);

        assert_eq!(stream.read(&mut first).unwrap(), 0);
    }

    #[test]
    fn test_copy_to_flushes_pending() {
        let mut stream = stereo(vec![1, 2], vec![3, 4], 24);
        let mut head = [0u8; 2];
        stream.read_exact(&mut head).unwrap();

        let mut sink = Vec::new();
        let written = stream.copy_to(&mut sink).unwrap();
        assert_eq!(written, 10);
        assert_eq!(head.len() + sink.len(), 12);
    }

    #[test]
    fn test_close_releases() {
        let mut stream = stereo(vec![0; 16], vec![0; 16], 16);
        stream.next_frame();
        stream.close();
        assert!(stream.is_exhausted());
        assert!(stream.next_frame().is_none());
        assert_eq!(stream.size_hint(), (0, Some(0)));
    }
}
