//! The streaming service: owns the one active cast session.
//!
//! A session over a single-pass source keeps one [`ForwardOnlyStream`]
//! behind a mutex, and range workers lock it one chunk at a time. A session
//! over a re-acquirable source (a file) keeps only the opener and hands each
//! range worker a stream of its own. Either way, replacing or stopping the
//! session trips its close handle first, so a worker still reading the old
//! media fails its next read instead of serving bytes into the new session.

use std::fmt;
use std::io::{self, Read};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use castream_common::{Error, Result};
use castream_stream::{
    ByteSource, CloseHandle, FileOpener, ForwardOnlyStream, RandomAccessStream, SourceOpener,
    StreamBounds,
};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::keepalive::{notification_title, KeepAlive};

/// Opener shared between a session and its range workers.
struct SharedOpener(Arc<dyn SourceOpener + Sync>);

impl SourceOpener for SharedOpener {
    fn open(&self) -> io::Result<ByteSource> {
        self.0.open()
    }
}

enum SessionSource {
    /// One stream, taken in turns.
    Shared(Arc<Mutex<ForwardOnlyStream>>),
    /// A fresh stream per range worker.
    Reopenable(Arc<dyn SourceOpener + Sync>),
}

/// The stream a range worker reads from.
#[derive(Debug)]
pub enum SessionStream {
    /// Private to one worker.
    Owned(ForwardOnlyStream),
    /// The session's single-pass stream. Locked per call.
    Shared(Arc<Mutex<ForwardOnlyStream>>),
}

impl SessionStream {
    /// Run `f` with exclusive access to the stream. For shared streams the
    /// lock is held only for the duration of `f`.
    pub fn with<R>(&mut self, f: impl FnOnce(&mut ForwardOnlyStream) -> R) -> R {
        match self {
            SessionStream::Owned(stream) => f(stream),
            SessionStream::Shared(stream) => f(&mut stream.lock()),
        }
    }
}

/// One media item being cast.
pub struct StreamSession {
    /// Unique session identifier.
    pub id: Uuid,
    /// Display name for notifications and status.
    pub name: String,
    /// Total media size in bytes.
    pub length: u64,
    /// Session start timestamp.
    pub started_at: DateTime<Utc>,
    source: SessionSource,
    close_handle: CloseHandle,
    position: AtomicU64,
}

impl fmt::Debug for StreamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamSession")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("length", &self.length)
            .field("started_at", &self.started_at)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

impl StreamSession {
    /// Session over a source that can only be read once.
    pub(crate) fn single_pass(stream: ForwardOnlyStream) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: stream.name().to_string(),
            length: stream.length(),
            started_at: Utc::now(),
            close_handle: stream.close_handle(),
            source: SessionSource::Shared(Arc::new(Mutex::new(stream))),
            position: AtomicU64::new(0),
        }
    }

    /// Session over a source `opener` can re-acquire. The opener is tried
    /// once here so that an unreadable source fails up front.
    pub(crate) fn reopenable(
        name: String,
        length: u64,
        opener: impl SourceOpener + Sync + 'static,
    ) -> Result<Self> {
        drop(opener.open()?);
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            length,
            started_at: Utc::now(),
            close_handle: CloseHandle::new(),
            source: SessionSource::Reopenable(Arc::new(opener)),
            position: AtomicU64::new(0),
        })
    }

    /// Whether workers get streams of their own.
    pub fn is_reopenable(&self) -> bool {
        matches!(self.source, SessionSource::Reopenable(_))
    }

    pub fn is_closed(&self) -> bool {
        self.close_handle.is_closed()
    }

    /// A stream for one range response. Fails once the session is closed.
    pub fn stream(&self) -> Result<SessionStream> {
        if self.is_closed() {
            return Err(Error::closed());
        }
        match &self.source {
            SessionSource::Shared(stream) => Ok(SessionStream::Shared(stream.clone())),
            SessionSource::Reopenable(opener) => {
                let stream = ForwardOnlyStream::reopenable(
                    self.name.clone(),
                    self.length,
                    SharedOpener(opener.clone()),
                )?
                .with_close_handle(self.close_handle.clone());
                Ok(SessionStream::Owned(stream))
            }
        }
    }

    /// Bytes a response starting at `start` would carry, without touching
    /// the source.
    pub fn measure(&self, start: u64) -> Result<u64> {
        match &self.source {
            SessionSource::Shared(stream) => {
                let mut stream = stream.lock();
                let previous = stream.current_position();
                stream.move_to(start)?;
                let available = stream.available_exact();
                stream.move_to(previous)?;
                Ok(available)
            }
            SessionSource::Reopenable(_) => {
                StreamBounds::new(self.length).check(start)?;
                Ok(self.length - start)
            }
        }
    }

    /// Logical position after the most recently served chunk.
    pub fn position(&self) -> u64 {
        self.position.load(Ordering::Relaxed)
    }

    pub(crate) fn record_position(&self, position: u64) {
        self.position.store(position, Ordering::Relaxed);
    }

    /// Signal close, and release a shared source right away unless a worker
    /// is mid-read (that worker releases it on return).
    fn close(&self) {
        self.close_handle.close();
        if let SessionSource::Shared(stream) = &self.source {
            if let Some(mut stream) = stream.try_lock() {
                stream.close();
            }
        }
        tracing::info!(
            session_id = %self.id,
            name = %self.name,
            duration_secs = (Utc::now() - self.started_at).num_seconds(),
            "Ended stream session"
        );
    }
}

/// Snapshot of the active session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamStatus {
    pub session_id: Uuid,
    pub name: String,
    pub length: u64,
    pub position: u64,
    pub reopenable: bool,
    pub started_at: DateTime<Utc>,
}

struct Inner {
    session: Option<Arc<StreamSession>>,
    awake: bool,
}

/// Owns the active session and the process liveness that goes with it.
pub struct StreamerService {
    inner: Mutex<Inner>,
    keep_alive: Arc<dyn KeepAlive>,
}

impl StreamerService {
    pub fn new(keep_alive: Arc<dyn KeepAlive>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                session: None,
                awake: false,
            }),
            keep_alive,
        }
    }

    /// Start casting a single-pass source of `length` bytes. Any previous
    /// session is closed first.
    pub fn set_stream_src(
        &self,
        name: impl Into<String>,
        length: u64,
        source: impl Read + Send + 'static,
    ) -> Arc<StreamSession> {
        let mut inner = self.inner.lock();
        self.close_previous(&mut inner);
        let session = StreamSession::single_pass(ForwardOnlyStream::new(name, length, source));
        self.register(&mut inner, Arc::new(session))
    }

    /// Start casting a source that `opener` can re-acquire. Sessions built
    /// this way serve ranges in any order, and concurrently.
    pub fn set_stream_opener(
        &self,
        name: impl Into<String>,
        length: u64,
        opener: impl SourceOpener + Sync + 'static,
    ) -> Result<Arc<StreamSession>> {
        let name = name.into();
        self.install(|| StreamSession::reopenable(name, length, opener))
    }

    /// Start casting a file from disk, sized from its metadata.
    pub fn set_stream_file(&self, path: &Path, name: Option<&str>) -> Result<Arc<StreamSession>> {
        let name = match name {
            Some(name) => name.to_string(),
            None => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| Error::invalid_argument(format!("not a file: {:?}", path)))?,
        };

        self.install(|| {
            let opener = FileOpener::new(path);
            let length = opener.length()?;
            StreamSession::reopenable(name, length, opener)
        })
    }

    /// Close the active session, then build and register its replacement.
    fn install(
        &self,
        build: impl FnOnce() -> Result<StreamSession>,
    ) -> Result<Arc<StreamSession>> {
        let mut inner = self.inner.lock();
        self.close_previous(&mut inner);

        match build() {
            Ok(session) => Ok(self.register(&mut inner, Arc::new(session))),
            Err(e) => {
                self.sleep(&mut inner);
                Err(e)
            }
        }
    }

    fn close_previous(&self, inner: &mut Inner) {
        if let Some(previous) = inner.session.take() {
            previous.close();
        }
    }

    fn register(&self, inner: &mut Inner, session: Arc<StreamSession>) -> Arc<StreamSession> {
        let title = notification_title(&session.name);
        if inner.awake {
            self.keep_alive.retitle(&title);
        } else {
            self.keep_alive.acquire(&title);
            inner.awake = true;
        }

        tracing::info!(
            session_id = %session.id,
            name = %session.name,
            length = session.length,
            reopenable = session.is_reopenable(),
            "Registered new stream session"
        );
        inner.session = Some(session.clone());
        session
    }

    fn sleep(&self, inner: &mut Inner) {
        if inner.awake {
            self.keep_alive.release();
            inner.awake = false;
        }
    }

    /// The active session, if any.
    pub fn current(&self) -> Option<Arc<StreamSession>> {
        self.inner.lock().session.clone()
    }

    /// The active session, or [`Error::NotFound`].
    pub fn active(&self) -> Result<Arc<StreamSession>> {
        self.current()
            .ok_or_else(|| Error::not_found("no active stream session"))
    }

    /// Stop casting. Returns `false` when nothing was active.
    pub fn stop_stream(&self) -> bool {
        let mut inner = self.inner.lock();
        let stopped = inner.session.is_some();
        self.close_previous(&mut inner);
        self.sleep(&mut inner);
        stopped
    }

    /// Tear everything down. Called when the server stops.
    pub fn shutdown(&self) {
        if self.stop_stream() {
            tracing::info!("Streamer shut down with an active session");
        }
    }

    /// Status of the active session, if any.
    pub fn status(&self) -> Option<StreamStatus> {
        let session = self.current()?;
        Some(StreamStatus {
            session_id: session.id,
            name: session.name.clone(),
            length: session.length,
            position: session.position(),
            reopenable: session.is_reopenable(),
            started_at: session.started_at,
        })
    }
}

impl Drop for StreamerService {
    fn drop(&mut self) {
        self.shutdown();
    }
}
