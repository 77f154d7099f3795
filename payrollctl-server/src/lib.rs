//! payrollctl-server: read-only HTTP API over Boston payroll data
//!
//! Layers, bottom-up:
//! - `models` turns query strings into validated filters, sort and page
//! - `db` builds parameterized SQL and runs it on the shared pool
//! - `http` wires routes, CORS, tracing and error responses

pub mod db;
pub mod http;
pub mod models;

pub use db::{create_pool, create_schema, DbError};
pub use http::{build_router, run_server, ApiError, AppState, ServerConfig, ServerError};
