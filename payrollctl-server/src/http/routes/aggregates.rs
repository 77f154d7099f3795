//! Department rollup, summary statistics and earnings breakdown

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::db::repos::{AggregateRepo, DepartmentStats, EarningsBreakdown, Stats};
use crate::http::error::ApiError;
use crate::http::extractors::ApiQuery;
use crate::http::server::AppState;
use crate::models::{validate_year, ScopeParams};

#[derive(Debug, Default, Deserialize)]
pub struct YearParams {
    pub year: Option<i32>,
}

#[derive(Serialize)]
pub struct DepartmentsResponse {
    pub departments: Vec<DepartmentStats>,
    pub year: i32,
}

/// GET /api/departments
async fn list_departments(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<YearParams>,
) -> Result<Json<DepartmentsResponse>, ApiError> {
    let year = validate_year(params.year)?;
    let departments = AggregateRepo::new(&state.pool).departments(year).await?;
    Ok(Json(DepartmentsResponse { departments, year }))
}

/// GET /api/stats
async fn stats(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<ScopeParams>,
) -> Result<Json<Stats>, ApiError> {
    let scope = params.into_filter()?;
    let stats = AggregateRepo::new(&state.pool)
        .stats(scope.year, scope.department.as_deref())
        .await?;
    Ok(Json(stats))
}

/// GET /api/earnings-breakdown
async fn earnings_breakdown(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<ScopeParams>,
) -> Result<Json<EarningsBreakdown>, ApiError> {
    let scope = params.into_filter()?;
    let breakdown = AggregateRepo::new(&state.pool)
        .earnings_breakdown(scope.year, scope.department.as_deref())
        .await?;
    Ok(Json(breakdown))
}

/// Aggregate routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/departments", get(list_departments))
        .route("/api/stats", get(stats))
        .route("/api/earnings-breakdown", get(earnings_breakdown))
}
