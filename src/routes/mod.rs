//! API Routes
//!
//! - `/` - Load check
//! - `/health` - Liveness
//! - `/chat` - Routed blog generation or support chat (rate limited)

pub mod chat;
pub mod health;

use axum::{
    http::{header::InvalidHeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use crate::config::ServerConfig;
use crate::middleware::{cors_layer, ClientRateLimiter};
use crate::models::{ApiResponse, AppState, BlogResponse};
use std::any::Any;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::{error, info};

/// Create the application router
pub fn create_router(state: AppState, server: &ServerConfig) -> Result<Router, InvalidHeaderValue> {
    info!(
        origin = %server.allowed_origin,
        rate_limit = server.rate_limit_per_minute.get(),
        "Creating application router"
    );

    let limiter = ClientRateLimiter::per_minute(server.rate_limit_per_minute);

    Ok(Router::new()
        .merge(chat::router(state, limiter))
        .merge(health::router())
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors_layer(&server.allowed_origin)?)
        .layer(TraceLayer::new_for_http()))
}

/// A panicking handler still answers with the generic error body
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = %detail, "Request handler panicked");

    (
        StatusCode::OK,
        Json(ApiResponse::Blog(BlogResponse::unexpected_error())),
    )
        .into_response()
}
