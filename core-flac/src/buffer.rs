//! # Sample Buffer
//!
//! Channel-major storage for decoded samples.

use crate::error::{FlacError, Result};

/// Decoded samples, one vector per channel.
///
/// `channel(c)[i]` is the native-depth sample of channel `c` at frame `i`.
/// Every channel holds the same number of frames.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleBuffer {
    channels: Vec<Vec<i32>>,
}

impl SampleBuffer {
    /// Empty buffer with `channels` channels.
    pub fn new(channels: usize) -> Self {
        Self::with_capacity(channels, 0)
    }

    pub fn with_capacity(channels: usize, frames: usize) -> Self {
        Self {
            channels: (0..channels).map(|_| Vec::with_capacity(frames)).collect(),
        }
    }

    /// Buffer of `frames` zero samples in every channel.
    pub fn zeroed(channels: usize, frames: usize) -> Self {
        Self {
            channels: vec![vec![0; frames]; channels],
        }
    }

    /// Build a buffer from per-channel sample vectors.
    ///
    /// # Errors
    ///
    /// [`FlacError::InvalidFormat`] if the channels have different lengths.
    pub fn from_channels(channels: Vec<Vec<i32>>) -> Result<Self> {
        if let Some(first) = channels.first() {
            let frames = first.len();
            if let Some((index, channel)) = channels
                .iter()
                .enumerate()
                .find(|(_, c)| c.len() != frames)
            {
                return Err(FlacError::InvalidFormat(format!(
                    "channel {} holds {} samples, channel 0 holds {}",
                    index,
                    channel.len(),
                    frames
                )));
            }
        }

        Ok(Self { channels })
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of frames (samples per channel).
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn channel(&self, index: usize) -> Option<&[i32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// Samples of one frame, in channel order.
    pub fn frame(&self, index: usize) -> impl Iterator<Item = i32> + '_ {
        self.channels.iter().filter_map(move |c| c.get(index).copied())
    }

    /// Append another buffer's frames to the end of this one.
    ///
    /// An empty buffer with no channels adopts the layout of `block`.
    pub fn append(&mut self, block: SampleBuffer) -> Result<()> {
        if self.channels.is_empty() {
            self.channels = block.channels;
            return Ok(());
        }

        if block.channel_count() != self.channel_count() {
            return Err(FlacError::DecodingError(format!(
                "block has {} channels, stream has {}",
                block.channel_count(),
                self.channel_count()
            )));
        }

        for (dst, src) in self.channels.iter_mut().zip(block.channels) {
            dst.extend(src);
        }

        Ok(())
    }

    pub fn into_channels(self) -> Vec<Vec<i32>> {
        self.channels
    }
}
