//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates a default config, a
//! [`StreamerService`] backed by a counting keep-alive, and the full
//! [`AppContext`]. The [`with_server`] constructor starts Axum on a random
//! port for HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use castream::config::Config;
use castream::server::{create_router, AppContext};
use castream::streaming::{KeepAlive, StreamerService};

/// Keep-alive that counts transitions instead of holding anything.
#[derive(Default)]
pub struct CountingKeepAlive {
    pub acquired: AtomicUsize,
    pub retitled: AtomicUsize,
    pub released: AtomicUsize,
}

impl CountingKeepAlive {
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

impl KeepAlive for CountingKeepAlive {
    fn acquire(&self, _title: &str) {
        self.acquired.fetch_add(1, Ordering::SeqCst);
    }

    fn retitle(&self, _title: &str) {
        self.retitled.fetch_add(1, Ordering::SeqCst);
    }

    fn release(&self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Test harness wrapping a fully-constructed [`AppContext`].
pub struct TestHarness {
    pub ctx: AppContext,
    pub streamer: Arc<StreamerService>,
    pub keep_alive: Arc<CountingKeepAlive>,
}

impl TestHarness {
    /// Create a new harness with default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a new harness with a custom configuration.
    pub fn with_config(config: Config) -> Self {
        let keep_alive = Arc::new(CountingKeepAlive::default());
        let streamer = Arc::new(StreamerService::new(keep_alive.clone()));

        let ctx = AppContext {
            config: Arc::new(config),
            streamer: streamer.clone(),
        };

        Self {
            ctx,
            streamer,
            keep_alive,
        }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        Self::with_server_config(Config::default()).await
    }

    /// Start an Axum server with custom config on a random port.
    pub async fn with_server_config(config: Config) -> (Self, SocketAddr) {
        let harness = Self::with_config(config);
        let app = create_router(harness.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }
}

/// Patterned bytes so that misplaced ranges are visible.
pub fn media_bytes(len: usize) -> Vec<u8> {
    (0..=255u8).cycle().take(len).collect()
}

/// Write a media fixture of `len` bytes into `dir`.
pub fn write_media(dir: &tempfile::TempDir, name: &str, len: usize) -> (PathBuf, Vec<u8>) {
    let path = dir.path().join(name);
    let data = media_bytes(len);
    std::fs::write(&path, &data).expect("failed to write media fixture");
    (path, data)
}
