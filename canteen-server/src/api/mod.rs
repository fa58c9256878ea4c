//! HTTP API routers for the two services.

pub mod orders;
pub mod payments;

use axum::Json;
use axum::response::IntoResponse;
use serde::Serialize;

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Simple health check - returns OK if the server is running.
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}
