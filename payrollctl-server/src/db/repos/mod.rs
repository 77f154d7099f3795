//! Repository implementations for database access
//!
//! Each repository borrows the shared pool and builds its SQL with
//! `QueryBuilder`, binding every value.

pub mod aggregates;
pub mod employees;
pub mod meta;

pub use aggregates::{AggregateRepo, DepartmentStats, EarningsBreakdown, Stats};
pub use employees::{select_employees, Employee, EmployeeRepo};
pub use meta::{HealthReport, MetaRepo};
pub use payrollctl_core::db::DbError;
