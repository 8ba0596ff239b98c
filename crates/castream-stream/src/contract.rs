//! The random-access stream contract.
//!
//! A [`RandomAccessStream`] has a fixed length, a logical cursor that may be
//! moved anywhere in `[0, length]`, and a single mark slot. Implementations
//! supply the cursor and the byte-level reads; the contract supplies the
//! exact-remaining count and mark/reset on top of them.

use std::io::Read;

use castream_common::{Error, Result};

/// The only read limit [`RandomAccessStream::mark`] accepts.
///
/// A random-access stream needs no read-ahead budget, so bounded marks are
/// rejected outright.
pub const NO_READ_LIMIT: i32 = -1;

/// Fixed length and mark slot shared by every stream implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamBounds {
    length: u64,
    marked: u64,
}

impl StreamBounds {
    /// Create bounds for a stream of `length` bytes, marked at 0.
    pub fn new(length: u64) -> Self {
        Self { length, marked: 0 }
    }

    /// Total size in bytes.
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Position captured by the last mark.
    pub fn marked(&self) -> u64 {
        self.marked
    }

    fn set_marked(&mut self, position: u64) {
        self.marked = position;
    }

    /// Validate that `position` lies in `[0, length]`.
    pub fn check(&self, position: u64) -> Result<()> {
        if position > self.length {
            return Err(Error::invalid_argument(format!(
                "position {} out of the bounds of the file (length {})",
                position, self.length
            )));
        }
        Ok(())
    }

    /// Resolve a signed target (as produced by relative seeks) against the
    /// bounds.
    pub fn resolve(&self, target: i128) -> Result<u64> {
        if target < 0 || target > self.length as i128 {
            return Err(Error::invalid_argument(format!(
                "position {} out of the bounds of the file (length {})",
                target, self.length
            )));
        }
        Ok(target as u64)
    }
}

/// Random-access view over a byte source of known length.
pub trait RandomAccessStream: Read + Send {
    /// Length and mark slot of this stream.
    fn bounds(&self) -> &StreamBounds;

    /// Mutable access to the mark slot.
    fn bounds_mut(&mut self) -> &mut StreamBounds;

    /// Current logical position.
    fn current_position(&self) -> u64;

    /// Reposition the logical cursor. Targets outside `[0, length]` are
    /// rejected with [`Error::InvalidArgument`].
    fn move_to(&mut self, position: u64) -> Result<()>;

    /// Read one byte, or `None` at end of stream.
    fn read_byte(&mut self) -> Result<Option<u8>>;

    /// Read up to `buf.len()` bytes. Returns the count actually read, which
    /// may be short; `0` means end of stream.
    fn read_into(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Total size in bytes. Never fails.
    fn length(&self) -> u64 {
        self.bounds().length()
    }

    /// Exact number of bytes between the cursor and the end.
    fn available_exact(&self) -> u64 {
        self.length() - self.current_position()
    }

    /// The estimated-availability query of ordinary byte streams. Range
    /// responses need an exact count, so this always fails.
    fn available(&self) -> Result<usize> {
        Err(Error::unsupported("use available_exact()"))
    }

    /// Save the current position. `read_limit` must be [`NO_READ_LIMIT`].
    fn mark(&mut self, read_limit: i32) -> Result<()> {
        if read_limit != NO_READ_LIMIT {
            return Err(Error::invalid_argument(format!(
                "mark() read limit is not used, pass {} (got {})",
                NO_READ_LIMIT, read_limit
            )));
        }
        let position = self.current_position();
        self.bounds_mut().set_marked(position);
        Ok(())
    }

    /// Move back to the marked position.
    fn reset(&mut self) -> Result<()> {
        let marked = self.bounds().marked();
        self.move_to(marked)
    }

    /// Marks are always supported.
    fn mark_supported(&self) -> bool {
        true
    }
}
