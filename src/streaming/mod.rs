//! Media streaming module.
//!
//! Serves the active cast session over HTTP with range support. The cast
//! receiver is handed a `/stream/{file_name}` URL and fetches the media in
//! byte ranges, seeking as the viewer scrubs.
//!
//! # Routes
//!
//! - `GET /stream` - Active session, with range support
//! - `GET /stream/{file_name}` - Same, with a file name for receivers that
//!   sniff the extension

mod direct;
pub mod keepalive;
pub mod range;
mod service;

pub use direct::stream_active;
pub use keepalive::{notification_title, KeepAlive, TracingKeepAlive};
pub use range::{guess_content_type, parse_range_header, RangeSpec};
pub use service::{SessionStream, StreamSession, StreamStatus, StreamerService};

use axum::{routing::get, Router};

use crate::server::AppContext;

/// Create the streaming router.
pub fn stream_router() -> Router<AppContext> {
    Router::new()
        .route("/stream", get(stream_active))
        .route("/stream/:file_name", get(stream_active))
}
