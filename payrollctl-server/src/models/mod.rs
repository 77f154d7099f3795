//! Request models with validation at construction
//!
//! Query-string input is turned into these types before any SQL is built.
//! Invalid filters return ValidationError; sort and paging are coerced.

pub mod breakdown;
pub mod filter;
pub mod pagination;
pub mod sort;
pub mod validation;

pub use breakdown::{percentages, ComponentTotals};
pub use filter::{validate_year, EmployeeFilter, EmployeeParams, ScopeParams};
pub use pagination::{Page, DEFAULT_LIMIT, MAX_LIMIT};
pub use sort::{Sort, SortColumn, SortOrder};
pub use validation::ValidationError;
