//! Control API: session status and the stop command.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use super::AppContext;

pub fn api_routes() -> Router<AppContext> {
    Router::new()
        .route("/status", get(get_status))
        .route("/stop", post(stop_stream))
}

async fn get_status(State(ctx): State<AppContext>) -> impl IntoResponse {
    match ctx.streamer.status() {
        Some(status) => Json(status).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn stop_stream(State(ctx): State<AppContext>) -> impl IntoResponse {
    if ctx.streamer.stop_stream() {
        tracing::info!("Stream stopped via API");
    }
    StatusCode::NO_CONTENT
}
