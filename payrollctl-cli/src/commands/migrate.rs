//! `payrollctl migrate` - copy the table from one database to another

use anyhow::{bail, Context, Result};
use clap::Parser;
use payrollctl_core::db::create_pool;
use payrollctl_etl::migrate;

use crate::ui;

#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Source database URL
    #[arg(long, env = "MIGRATE_SOURCE_URL")]
    pub from: String,

    /// Target database URL (schema is created if missing)
    #[arg(long, env = "MIGRATE_TARGET_URL")]
    pub to: String,

    /// Rows per INSERT statement
    #[arg(long, default_value_t = 1000)]
    pub batch_size: usize,
}

pub async fn run_migrate(args: MigrateArgs) -> Result<()> {
    if args.from == args.to {
        bail!("Source and target are the same database");
    }

    let source = create_pool(&args.from)
        .await
        .context("Failed to connect to source database")?;
    let target = create_pool(&args.to)
        .await
        .context("Failed to connect to target database")?;

    let pb = ui::spinner("Migrating payroll_earnings");
    let result = migrate(&source, &target, args.batch_size, |sent| {
        ui::set_message(&pb, format!("Migrating payroll_earnings: {} rows copied", sent));
    })
    .await;

    source.close().await;
    target.close().await;

    let summary = match result {
        Ok(summary) => {
            ui::finish_success(pb, format!("Copied {} rows", summary.copied));
            summary
        }
        Err(e) => {
            ui::finish_error(pb, format!("Migration failed: {}", e));
            return Err(e);
        }
    };

    println!(
        "Source rows: {}\nCopied:      {}\nTarget rows: {}",
        summary.source_rows, summary.copied, summary.target_rows
    );
    if !summary.complete() {
        bail!(
            "Target has {} rows, fewer than the {} in the source",
            summary.target_rows,
            summary.source_rows
        );
    }
    Ok(())
}
