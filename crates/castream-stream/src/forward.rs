//! Random access over a forward-only byte source.
//!
//! [`ForwardOnlyStream`] keeps two cursors: the logical `position` callers
//! see, and `consumed`, the number of bytes actually pulled from the
//! underlying source. Seeks only move `position`; the next [`open`] or read
//! reconciles the two by skipping forward, or by reopening the source when
//! the target lies behind `consumed` and the stream was built with a
//! [`SourceOpener`].
//!
//! [`open`]: ForwardOnlyStream::open

use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};

use castream_common::{Error, Result};

use crate::contract::{RandomAccessStream, StreamBounds};
use crate::source::{ByteSource, CloseHandle, SourceOpener};

/// Scratch buffer size for skipping. Matches the HTTP responder's chunk.
const SKIP_CHUNK: usize = 8192;

/// Random-access stream over a single-pass source.
pub struct ForwardOnlyStream {
    name: String,
    bounds: StreamBounds,
    position: u64,
    consumed: u64,
    source: Option<ByteSource>,
    opener: Option<Box<dyn SourceOpener>>,
    close_handle: CloseHandle,
}

impl fmt::Debug for ForwardOnlyStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForwardOnlyStream")
            .field("name", &self.name)
            .field("length", &self.bounds.length())
            .field("position", &self.position)
            .field("consumed", &self.consumed)
            .field("open", &self.source.is_some())
            .field("reopenable", &self.opener.is_some())
            .finish()
    }
}

impl ForwardOnlyStream {
    /// Wrap a source that can only be read once. Seeks behind the bytes
    /// already consumed are rejected.
    pub fn new(name: impl Into<String>, length: u64, source: impl Read + Send + 'static) -> Self {
        Self {
            name: name.into(),
            bounds: StreamBounds::new(length),
            position: 0,
            consumed: 0,
            source: Some(Box::new(source)),
            opener: None,
            close_handle: CloseHandle::new(),
        }
    }

    /// Wrap a source that can be re-acquired from `opener`. Seeks behind the
    /// bytes already consumed start over from a fresh source.
    pub fn reopenable(
        name: impl Into<String>,
        length: u64,
        opener: impl SourceOpener + 'static,
    ) -> Result<Self> {
        let source = opener.open()?;
        Ok(Self {
            name: name.into(),
            bounds: StreamBounds::new(length),
            position: 0,
            consumed: 0,
            source: Some(source),
            opener: Some(Box::new(opener)),
            close_handle: CloseHandle::new(),
        })
    }

    /// Tie this stream to an existing close signal. Closing `handle` then
    /// closes this stream, and closing this stream trips `handle`.
    pub fn with_close_handle(mut self, handle: CloseHandle) -> Self {
        self.close_handle = handle;
        self
    }

    /// Display name given at construction.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bytes pulled from the underlying source so far.
    pub fn physical_position(&self) -> u64 {
        self.consumed
    }

    /// Whether seeks behind the physical cursor are honoured.
    pub fn is_reopenable(&self) -> bool {
        self.opener.is_some()
    }

    /// Whether the source has been released.
    pub fn is_closed(&self) -> bool {
        self.source.is_none() || self.close_handle.is_closed()
    }

    /// A handle that closes this stream from another thread.
    pub fn close_handle(&self) -> CloseHandle {
        self.close_handle.clone()
    }

    /// Bring the physical cursor to the logical position.
    ///
    /// Reopens the source if the position lies behind what has been
    /// consumed, then skips forward. Fails if the source ends before the
    /// position is reached. A no-op when the cursors already agree.
    pub fn open(&mut self) -> Result<()> {
        self.ensure_open()?;

        if self.position < self.consumed {
            self.reopen()?;
        }

        let gap = self.position - self.consumed;
        if gap > 0 {
            tracing::trace!(name = %self.name, from = self.consumed, skip = gap, "Skipping source");
            self.skip(gap)?;
        }
        Ok(())
    }

    /// Release the underlying source. Safe to call repeatedly.
    pub fn close(&mut self) {
        self.close_handle.close();
        if self.source.take().is_some() {
            tracing::debug!(
                name = %self.name,
                position = self.position,
                consumed = self.consumed,
                "Closed stream source"
            );
        }
    }

    fn ensure_open(&mut self) -> Result<()> {
        if self.close_handle.is_closed() {
            // Closed from another thread; drop the source here.
            self.close();
        }
        if self.source.is_none() {
            return Err(Error::closed());
        }
        Ok(())
    }

    fn reopen(&mut self) -> Result<()> {
        let opener = self.opener.as_ref().ok_or_else(|| {
            Error::invalid_argument(format!(
                "cannot move back to {} on a forward-only source already at {}",
                self.position, self.consumed
            ))
        })?;
        let source = opener.open()?;
        tracing::debug!(
            name = %self.name,
            target = self.position,
            discarded = self.consumed,
            "Reopened source for backward seek"
        );
        self.source = Some(source);
        self.consumed = 0;
        Ok(())
    }

    fn skip(&mut self, count: u64) -> Result<()> {
        let source = self.source.as_mut().ok_or_else(Error::closed)?;
        let mut scratch = [0u8; SKIP_CHUNK];
        let mut remaining = count;

        while remaining > 0 {
            let want = remaining.min(SKIP_CHUNK as u64) as usize;
            match source.read(&mut scratch[..want]) {
                Ok(0) => {
                    return Err(Error::io(
                        io::ErrorKind::UnexpectedEof,
                        format!(
                            "source ended after {} of {} skipped bytes",
                            count - remaining,
                            count
                        ),
                    ));
                }
                Ok(n) => {
                    self.consumed += n as u64;
                    remaining -= n as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

impl RandomAccessStream for ForwardOnlyStream {
    fn bounds(&self) -> &StreamBounds {
        &self.bounds
    }

    fn bounds_mut(&mut self) -> &mut StreamBounds {
        &mut self.bounds
    }

    fn current_position(&self) -> u64 {
        self.position
    }

    fn move_to(&mut self, position: u64) -> Result<()> {
        self.bounds.check(position)?;
        if position < self.consumed && self.opener.is_none() {
            return Err(Error::invalid_argument(format!(
                "cannot move back to {} on a forward-only source already at {}",
                position, self.consumed
            )));
        }
        self.position = position;
        Ok(())
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        match self.read_into(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }

    fn read_into(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.open()?;

        let remaining = self.bounds.length() - self.position;
        let want = (buf.len() as u64).min(remaining) as usize;
        if want == 0 {
            return Ok(0);
        }

        let source = self.source.as_mut().ok_or_else(Error::closed)?;
        let read = loop {
            match source.read(&mut buf[..want]) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        };

        if self.close_handle.is_closed() {
            self.close();
            return Err(Error::closed());
        }

        self.consumed += read as u64;
        self.position += read as u64;
        Ok(read)
    }
}

impl Read for ForwardOnlyStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_into(buf)?)
    }
}

impl Seek for ForwardOnlyStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => offset as i128,
            SeekFrom::End(delta) => self.bounds.length() as i128 + delta as i128,
            SeekFrom::Current(delta) => self.position as i128 + delta as i128,
        };
        let target = self.bounds.resolve(target)?;
        self.move_to(target)?;
        Ok(self.position)
    }
}
