//! Employee listing endpoint

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::db::repos::{Employee, EmployeeRepo};
use crate::http::error::ApiError;
use crate::http::extractors::ApiQuery;
use crate::http::server::AppState;
use crate::models::EmployeeParams;

/// One page of employees
#[derive(Serialize)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub year: i32,
}

/// GET /api/employees - filtered, sorted, paginated
async fn list_employees(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<EmployeeParams>,
) -> Result<Json<EmployeeListResponse>, ApiError> {
    let (filter, sort, page) = params.into_parts()?;
    let (data, total) = EmployeeRepo::new(&state.pool)
        .list(&filter, sort, page)
        .await?;

    Ok(Json(EmployeeListResponse {
        data,
        total,
        limit: page.limit,
        offset: page.offset,
        year: filter.year,
    }))
}

/// Employee routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/employees", get(list_employees))
}
