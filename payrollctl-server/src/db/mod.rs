//! Query layer - parameterized SQL over `payroll_earnings`
//!
//! # Design Principles
//!
//! - Every value is bound; only allowlisted identifiers are interpolated
//! - Aggregation happens in SQL, one round trip per figure set
//! - Connection pool and schema live in payrollctl-core

pub mod filter;
pub mod repos;

pub use payrollctl_core::db::{create_pool, create_schema, DbError};
pub use repos::*;
