//! Route handlers organized by resource

pub mod health;
pub mod employees;
pub mod export;
pub mod aggregates;
pub mod years;
