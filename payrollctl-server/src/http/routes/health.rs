//! Liveness and database health endpoints

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::db::repos::{HealthReport, MetaRepo};
use crate::http::server::AppState;

/// Service banner
#[derive(Serialize)]
pub struct RootResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Liveness response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET /
async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        status: "ok",
        service: "Boston Payroll API",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /health - liveness, no database access
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

/// GET /api/health - always 200; the body says whether the database answered
///
/// Failures are logged by `MetaRepo::health`.
async fn api_health(State(state): State<Arc<AppState>>) -> Json<HealthReport> {
    Json(MetaRepo::new(&state.pool).health().await)
}

/// Health routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/health", get(api_health))
}
