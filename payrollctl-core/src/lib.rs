//! payrollctl-core: the earnings record, its table, and where it comes from
//!
//! Shared by the HTTP server and the ETL jobs.

pub mod config;
pub mod db;
pub mod error;
pub mod money;
pub mod record;
pub mod sources;

pub use config::PayrollConfig;
pub use db::DbError;
pub use error::{PayrollError, Result};
pub use record::{EarningsComponent, EarningsRecord, RecordKey, RECORD_COLUMNS};
