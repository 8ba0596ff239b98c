//! Router tests driven in-process with `tower::ServiceExt::oneshot`.

mod common;

use std::io::Cursor;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use common::{media_bytes, TestHarness};
use http_body_util::BodyExt;
use tower::ServiceExt;

use castream::server::create_router;

async fn body_bytes(body: Body) -> Vec<u8> {
    body.collect().await.unwrap().to_bytes().to_vec()
}

#[tokio::test]
async fn test_health_endpoint() {
    let h = TestHarness::new();
    let app = create_router(h.ctx.clone());

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_range_response_headers() {
    let h = TestHarness::new();
    let data = media_bytes(1000);
    h.streamer
        .set_stream_src("clip.webm", 1000, Cursor::new(data.clone()));
    let app = create_router(h.ctx.clone());

    let response = app
        .oneshot(
            Request::get("/stream/clip.webm")
                .header(header::RANGE, "bytes=250-499")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    let headers = response.headers();
    assert_eq!(headers[header::CONTENT_TYPE], "video/webm");
    assert_eq!(headers[header::CONTENT_RANGE], "bytes 250-499/1000");
    assert_eq!(headers[header::CONTENT_LENGTH], "250");
    assert_eq!(headers[header::ACCEPT_RANGES], "bytes");

    let body = body_bytes(response.into_body()).await;
    assert_eq!(body, &data[250..500]);
}

#[tokio::test]
async fn test_malformed_range_serves_whole_resource() {
    let h = TestHarness::new();
    h.streamer
        .set_stream_src("clip.mp4", 64, Cursor::new(media_bytes(64)));
    let app = create_router(h.ctx.clone());

    let response = app
        .oneshot(
            Request::get("/stream")
                .header(header::RANGE, "bytes=0-1,5-9")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response.into_body()).await.len(), 64);
}

#[tokio::test]
async fn test_status_json_shape() {
    let h = TestHarness::new();
    h.streamer
        .set_stream_src("clip.mp4", 64, Cursor::new(media_bytes(64)));
    let app = create_router(h.ctx.clone());

    let response = app
        .oneshot(Request::get("/api/status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value =
        serde_json::from_slice(&body_bytes(response.into_body()).await).unwrap();
    assert_eq!(json["name"], "clip.mp4");
    assert_eq!(json["length"], 64);
    assert_eq!(json["position"], 0);
    assert!(json["session_id"].is_string());
}

#[tokio::test]
async fn test_stop_requires_post() {
    let h = TestHarness::new();
    let app = create_router(h.ctx.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/api/stop")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
