//! `payrollctl schema` - create the table and indexes

use anyhow::{Context, Result};
use clap::Parser;
use payrollctl_core::db::{create_schema, INDEXES, TABLE};
use payrollctl_core::PayrollConfig;

use crate::ui;

#[derive(Parser, Debug)]
pub struct SchemaArgs {
    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

pub async fn run_schema(args: SchemaArgs) -> Result<()> {
    let config = PayrollConfig::load()?;
    let pool = super::connect(args.database_url, &config).await?;

    ui::with_spinner_async(
        format!("Creating {}", TABLE),
        format!("{} ready ({} indexes)", TABLE, INDEXES.len()),
        async { create_schema(&pool).await.context("Schema creation failed") },
    )
    .await?;

    pool.close().await;
    Ok(())
}
