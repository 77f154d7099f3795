//! Command implementations for payrollctl CLI

pub mod archive;
pub mod config;
pub mod load;
pub mod migrate;
pub mod schema;
pub mod serve;
pub mod validate;

pub use archive::run_archive;
pub use config::run_config;
pub use load::run_load;
pub use migrate::run_migrate;
pub use schema::run_schema;
pub use serve::run_serve;
pub use validate::run_validate;

use anyhow::{Context, Result};
use payrollctl_core::db::create_pool_with_options;
use payrollctl_core::PayrollConfig;
use sqlx::PgPool;

/// Connect using `--database-url` if given, else the configured URL.
pub(crate) async fn connect(database_url: Option<String>, config: &PayrollConfig) -> Result<PgPool> {
    let url = match database_url.filter(|url| !url.is_empty()) {
        Some(url) => url,
        None => config.database_url()?,
    };

    create_pool_with_options(&url, config.database.max_connections)
        .await
        .context("Failed to create database pool")
}
