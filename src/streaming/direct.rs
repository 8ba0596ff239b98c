//! Range responses for the active session.
//!
//! Each request is served by a blocking worker that moves a stream to the
//! start of the range and pushes chunks through a bounded channel into the
//! response body. File sessions give every worker a stream of its own. A
//! single-pass session's stream is locked for one chunk at a time and never
//! while the worker waits on the client, so a stalled client cannot hold up
//! the next request.

use std::io;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use castream_common::{Error, Result};
use castream_stream::{ForwardOnlyStream, RandomAccessStream};
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::ReceiverStream;

use super::range::{guess_content_type, parse_range_header};
use super::service::StreamSession;
use crate::server::AppContext;

/// One range to copy out of a stream.
#[derive(Debug, Clone, Copy)]
struct RangeJob {
    start: u64,
    /// Upper bound on bytes to send; the stream's exact remaining count may
    /// be lower.
    wanted: u64,
    chunk_size: usize,
    send_body: bool,
}

/// Serve the active session, honouring `Range` headers.
pub async fn stream_active(
    State(ctx): State<AppContext>,
    method: Method,
    headers: HeaderMap,
) -> Response {
    let session = match ctx.streamer.active() {
        Ok(session) => session,
        Err(e) => return error_response(&e, 0),
    };
    let length = session.length;

    let requested = headers
        .get(header::RANGE)
        .and_then(|h| h.to_str().ok())
        .and_then(parse_range_header);

    let (start, wanted, partial) = match requested {
        Some(spec) => match spec.resolve(length) {
            Some((start, end)) => (start, end - start + 1, true),
            None => {
                tracing::debug!(session_id = %session.id, range = ?spec, length, "Unsatisfiable range");
                return range_not_satisfiable(length);
            }
        },
        None => (0, length, false),
    };

    let config = &ctx.config.stream;
    let job = RangeJob {
        start,
        wanted,
        chunk_size: config.chunk_size,
        send_body: method != Method::HEAD,
    };

    let (head_tx, head_rx) = oneshot::channel();
    let (body_tx, body_rx) = mpsc::channel(config.channel_depth);
    let worker_session = session.clone();
    tokio::task::spawn_blocking(move || respond_range(&worker_session, job, head_tx, body_tx));

    let content_length = match head_rx.await {
        Ok(Ok(n)) => n,
        Ok(Err(e)) => return error_response(&e, length),
        Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };

    let content_type = guess_content_type(&session.name);
    let mut response_headers = vec![
        (header::CONTENT_TYPE, content_type.to_string()),
        (header::CONTENT_LENGTH, content_length.to_string()),
        (header::ACCEPT_RANGES, "bytes".to_string()),
    ];

    let status = if partial {
        let end = start + content_length.saturating_sub(1);
        response_headers.push((
            header::CONTENT_RANGE,
            format!("bytes {}-{}/{}", start, end, length),
        ));
        StatusCode::PARTIAL_CONTENT
    } else {
        StatusCode::OK
    };

    let mut response = Body::from_stream(ReceiverStream::new(body_rx)).into_response();
    *response.status_mut() = status;
    for (name, value) in response_headers {
        if let Ok(value) = value.parse() {
            response.headers_mut().insert(name, value);
        }
    }
    response
}

fn range_not_satisfiable(length: u64) -> Response {
    (
        StatusCode::RANGE_NOT_SATISFIABLE,
        [(header::CONTENT_RANGE, format!("bytes */{}", length))],
        Body::empty(),
    )
        .into_response()
}

fn error_response(err: &Error, length: u64) -> Response {
    match err {
        // A single-pass source cannot go back; the client must ask again
        // from further on.
        Error::InvalidArgument(_) => range_not_satisfiable(length),
        Error::NotFound(_) => StatusCode::NOT_FOUND.into_response(),
        Error::Io(_) | Error::Unsupported(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// Position the stream and report the exact byte count the response will
/// carry.
fn prepare(stream: &mut ForwardOnlyStream, start: u64) -> Result<u64> {
    stream.move_to(start)?;
    stream.open()?;
    Ok(stream.available_exact())
}

/// Read the next chunk at `position`. Another worker may have moved a
/// shared stream since the last chunk, so it is put back first.
fn read_chunk(stream: &mut ForwardOnlyStream, position: u64, buf: &mut [u8]) -> Result<usize> {
    if stream.current_position() != position {
        stream.move_to(position)?;
    }
    stream.read_into(buf)
}

fn respond_range(
    session: &Arc<StreamSession>,
    job: RangeJob,
    head: oneshot::Sender<Result<u64>>,
    body: mpsc::Sender<io::Result<Bytes>>,
) {
    // HEAD only sizes the response; the source is left where it was.
    if !job.send_body {
        let _ = head.send(session.measure(job.start).map(|n| n.min(job.wanted)));
        return;
    }

    let mut stream = match session.stream() {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!(session_id = %session.id, "Failed to open session stream: {}", e);
            let _ = head.send(Err(e));
            return;
        }
    };

    let to_send = match stream.with(|s| prepare(s, job.start)) {
        Ok(available) => available.min(job.wanted),
        Err(e) => {
            tracing::warn!(session_id = %session.id, start = job.start, "Failed to position stream: {}", e);
            let _ = head.send(Err(e));
            return;
        }
    };

    if head.send(Ok(to_send)).is_err() {
        return;
    }

    tracing::debug!(
        session_id = %session.id,
        start = job.start,
        bytes = to_send,
        "Serving range"
    );

    let mut buf = vec![0u8; job.chunk_size];
    let mut position = job.start;
    let end = job.start + to_send;
    while position < end {
        let want = (end - position).min(job.chunk_size as u64) as usize;
        match stream.with(|s| read_chunk(s, position, &mut buf[..want])) {
            Ok(0) => {
                tracing::warn!(
                    session_id = %session.id,
                    position,
                    missing = end - position,
                    "Source ended before its declared length"
                );
                let _ = body.blocking_send(Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "source ended before its declared length",
                )));
                return;
            }
            Ok(n) => {
                position += n as u64;
                session.record_position(position);
                if body
                    .blocking_send(Ok(Bytes::copy_from_slice(&buf[..n])))
                    .is_err()
                {
                    tracing::debug!(session_id = %session.id, position, "Client disconnected mid-range");
                    return;
                }
            }
            Err(e) => {
                // Ends this connection only; the session stays usable unless
                // it was closed.
                if e.is_io() {
                    tracing::warn!(session_id = %session.id, position, "Range read failed: {}", e);
                } else {
                    tracing::debug!(session_id = %session.id, position, "Range abandoned: {}", e);
                }
                let _ = body.blocking_send(Err(e.into()));
                return;
            }
        }
    }
}
