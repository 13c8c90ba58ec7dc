//! # Probe Window
//!
//! A read-only view of the first `limit` bytes of a seekable source, used
//! while sniffing a stream's format. The source is rewound to where the
//! window was opened when the window is restored or dropped, so a failed
//! sniff never consumes bytes another format handler needs.

use crate::error::FlacError;
use std::io::{self, Read, Seek, SeekFrom};
use tracing::warn;

/// Outcome of a window read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowRead {
    /// This many bytes were read from the source.
    Bytes(usize),
    /// The request would cross the probe limit; nothing was read.
    EndOfWindow,
}

/// Bounded, rewinding view over the head of a source.
pub struct ProbeWindow<'a, R: Read + Seek> {
    inner: &'a mut R,
    origin: u64,
    limit: usize,
    consumed: usize,
    hit_limit: bool,
    restored: bool,
}

impl<'a, R: Read + Seek> ProbeWindow<'a, R> {
    /// Open a window of `limit` bytes at the source's current position.
    pub fn open(inner: &'a mut R, limit: usize) -> io::Result<Self> {
        let origin = inner.stream_position()?;
        Ok(Self {
            inner,
            origin,
            limit,
            consumed: 0,
            hit_limit: false,
            restored: false,
        })
    }

    /// The probe limit. This is the window's reported length regardless of
    /// how long the source actually is.
    pub fn len(&self) -> usize {
        self.limit
    }

    pub fn is_empty(&self) -> bool {
        self.limit == 0
    }

    /// Bytes delivered so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub fn remaining(&self) -> usize {
        self.limit - self.consumed
    }

    /// Returns `true` once a read has been refused for crossing the limit.
    pub fn hit_limit(&self) -> bool {
        self.hit_limit
    }

    /// Read up to `len` bytes into `buf[offset..offset + len]`.
    ///
    /// Returns [`WindowRead::EndOfWindow`] without touching the source if
    /// `consumed + len` or `offset + len` would exceed the limit. Otherwise
    /// forwards one read to the source and counts the bytes it delivered.
    pub fn read_at(&mut self, buf: &mut [u8], offset: usize, len: usize) -> io::Result<WindowRead> {
        let end = offset.checked_add(len).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "read range overflows")
        })?;
        if end > buf.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("read range {}..{} exceeds buffer of {} bytes", offset, end, buf.len()),
            ));
        }

        if end > self.limit || len > self.remaining() {
            self.hit_limit = true;
            return Ok(WindowRead::EndOfWindow);
        }

        let n = self.inner.read(&mut buf[offset..end])?;
        self.consumed += n;
        Ok(WindowRead::Bytes(n))
    }

    /// Rewind the source to the window origin and consume the window.
    pub fn restore(mut self) -> io::Result<()> {
        self.rewind()
    }

    fn rewind(&mut self) -> io::Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        self.inner.seek(SeekFrom::Start(self.origin))?;
        self.consumed = 0;
        Ok(())
    }
}

impl<R: Read + Seek> Read for ProbeWindow<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = buf.len();
        match self.read_at(buf, 0, len)? {
            WindowRead::Bytes(n) => Ok(n),
            WindowRead::EndOfWindow => Ok(0),
        }
    }
}

/// Probe windows only move forward.
impl<R: Read + Seek> Seek for ProbeWindow<'_, R> {
    fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            FlacError::SeekNotSupported,
        ))
    }
}

impl<R: Read + Seek> Drop for ProbeWindow<'_, R> {
    fn drop(&mut self) {
        if let Err(e) = self.rewind() {
            warn!(error = %e, origin = self.origin, "Failed to rewind probed source");
        }
    }
}

impl<R: Read + Seek> std::fmt::Debug for ProbeWindow<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeWindow")
            .field("origin", &self.origin)
            .field("limit", &self.limit)
            .field("consumed", &self.consumed)
            .finish()
    }
}
