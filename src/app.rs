use axum::{extract::FromRef, http::StatusCode, routing::get, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::core::config::UploadConfig;
use crate::core::middleware;
use crate::features::text_files::{self, TextFileRepository};
use crate::shared::flash::FlashKey;
use crate::shared::templates::Templates;

/// Everything handlers share; each field is extractable on its own via `State<T>`
#[derive(Clone, FromRef)]
pub struct AppState {
    pub text_files: Arc<dyn TextFileRepository>,
    pub templates: Arc<Templates>,
    pub upload: Arc<UploadConfig>,
    pub flash_key: FlashKey,
}

// Simple health check endpoint
async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Build the application router with request tracing
pub fn router(state: AppState) -> Router {
    let health_route = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(text_files::routes(state))
        .merge(health_route)
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
}
