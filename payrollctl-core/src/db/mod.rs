//! Database layer - connection pool and schema
//!
//! # Design Principles
//!
//! - One table, `payroll_earnings`, created idempotently
//! - Connection pool shared by every request and job
//! - Rely on the unique key and ON CONFLICT, never check-then-insert

pub mod pool;
pub mod schema;

pub use pool::{create_pool, create_pool_with_options, DEFAULT_MAX_CONNECTIONS};
pub use schema::{create_schema, INDEXES, TABLE};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("table '{table}' missing after schema creation")]
    SchemaVerification { table: &'static str },
}
