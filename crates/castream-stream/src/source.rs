//! Byte sources and the close signal shared with other threads.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A single-pass byte source.
pub type ByteSource = Box<dyn Read + Send>;

/// Something that can hand out a fresh source positioned at byte 0.
///
/// Streams built from an opener can honour seeks behind the bytes they have
/// already consumed by starting over.
pub trait SourceOpener: Send {
    /// Open a new source at the start of the media.
    fn open(&self) -> io::Result<ByteSource>;
}

impl<F> SourceOpener for F
where
    F: Fn() -> io::Result<ByteSource> + Send,
{
    fn open(&self) -> io::Result<ByteSource> {
        self()
    }
}

/// Opens a file from disk on every call.
#[derive(Debug, Clone)]
pub struct FileOpener {
    path: PathBuf,
}

impl FileOpener {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current on-disk size of the file.
    pub fn length(&self) -> io::Result<u64> {
        Ok(std::fs::metadata(&self.path)?.len())
    }
}

impl SourceOpener for FileOpener {
    fn open(&self) -> io::Result<ByteSource> {
        let file = File::open(&self.path)?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Cloneable close signal for a stream.
///
/// Triggering it makes the owning stream fail its current or next read and
/// release its source, even while another thread holds the stream itself.
#[derive(Debug, Clone, Default)]
pub struct CloseHandle(Arc<AtomicBool>);

impl CloseHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn close(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
