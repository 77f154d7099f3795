//! Available years endpoint

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use payrollctl_core::sources::DEFAULT_YEAR;
use serde::Serialize;

use crate::db::repos::MetaRepo;
use crate::http::error::ApiError;
use crate::http::server::AppState;

#[derive(Debug, Serialize)]
pub struct YearsResponse {
    pub years: Vec<i32>,
    pub default: i32,
}

impl YearsResponse {
    /// `years` is newest first; an empty table falls back to DEFAULT_YEAR.
    pub fn new(years: Vec<i32>) -> Self {
        let default = years.first().copied().unwrap_or(DEFAULT_YEAR);
        Self { years, default }
    }
}

/// GET /api/years
async fn list_years(State(state): State<Arc<AppState>>) -> Result<Json<YearsResponse>, ApiError> {
    let years = MetaRepo::new(&state.pool).available_years().await?;
    Ok(Json(YearsResponse::new(years)))
}

/// Year routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/years", get(list_years))
}
