//! `payrollctl archive` - per-year CSV snapshots plus a manifest

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use payrollctl_core::PayrollConfig;
use payrollctl_etl::archive::MANIFEST_NAME;
use payrollctl_etl::{archive_all, archive_year, ArchiveOutcome};

use crate::ui;

#[derive(Parser, Debug)]
pub struct ArchiveArgs {
    /// Archive only this year (default: every year in the table)
    #[arg(long)]
    pub year: Option<i32>,

    /// Overwrite existing archive files
    #[arg(long)]
    pub force: bool,

    /// Output directory (default: [etl] archive_dir)
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

pub async fn run_archive(args: ArchiveArgs) -> Result<()> {
    let config = PayrollConfig::load()?;
    let dir = args.dir.unwrap_or_else(|| config.etl.archive_dir.clone());
    let pool = super::connect(args.database_url, &config).await?;

    let all_years = args.year.is_none();
    let outcomes = match args.year {
        Some(year) => vec![(
            year,
            ui::with_spinner_async(
                format!("Archiving {}", year),
                format!("Archived {}", year),
                archive_year(&pool, &dir, year, args.force),
            )
            .await?,
        )],
        None => {
            ui::with_spinner_async(
                format!("Archiving to {}", dir.display()),
                "Archive complete",
                archive_all(&pool, &dir, args.force),
            )
            .await?
        }
    };

    for (year, outcome) in &outcomes {
        match outcome {
            ArchiveOutcome::Written { path, rows } => {
                println!("{}: {} rows -> {}", year, rows, path.display())
            }
            ArchiveOutcome::Skipped { path } => {
                println!("{}: {} exists (use --force to overwrite)", year, path.display())
            }
            ArchiveOutcome::Empty => println!("{}: no rows, nothing written", year),
        }
    }

    if all_years && !outcomes.is_empty() {
        println!("Manifest: {}", dir.join(MANIFEST_NAME).display());
    } else if outcomes.is_empty() {
        println!("No data in database to archive");
    }

    pool.close().await;
    Ok(())
}
