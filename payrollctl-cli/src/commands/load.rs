//! `payrollctl load` - download yearly earnings files and upsert them

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{ArgGroup, Parser};
use payrollctl_core::{sources, PayrollConfig};
use payrollctl_etl::{http_client, load_all, load_file, load_year, LoadSummary};

use crate::ui;

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("which").required(true).args(["year", "all"])))]
pub struct LoadArgs {
    /// Year to load
    #[arg(long)]
    pub year: Option<i32>,

    /// Load every year with a known source, oldest first
    #[arg(long)]
    pub all: bool,

    /// Load a local CSV/XLSX file instead of downloading (requires --year)
    #[arg(long, requires = "year", conflicts_with = "all")]
    pub file: Option<PathBuf>,

    /// Keep downloaded files under <archive_dir>/downloads
    #[arg(long)]
    pub keep_download: bool,

    /// Rows per INSERT statement (default: [etl] batch_size)
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

pub async fn run_load(args: LoadArgs) -> Result<()> {
    let mut config = PayrollConfig::load()?;
    if let Some(batch_size) = args.batch_size {
        config.etl.batch_size = batch_size;
    }

    if let Some(year) = args.year {
        if !sources::year_in_range(year) && args.file.is_none() {
            bail!(
                "No source for {}. Known years: {:?}",
                year,
                sources::years()
            );
        }
    }

    let pool = super::connect(args.database_url, &config).await?;

    let summaries = if let (Some(path), Some(year)) = (&args.file, args.year) {
        let summary = ui::with_spinner_async(
            format!("Loading {} from {}", year, path.display()),
            format!("Loaded {}", year),
            load_file(&pool, path, year, config.etl.batch_size),
        )
        .await?;
        vec![summary]
    } else {
        let client = http_client(Duration::from_secs(config.etl.request_timeout_secs))?;
        let keep_dir = args
            .keep_download
            .then(|| config.etl.archive_dir.join("downloads"));

        match args.year {
            Some(year) => {
                let summary = ui::with_spinner_async(
                    format!("Loading {}", year),
                    format!("Loaded {}", year),
                    load_year(&pool, &client, &config.etl, year, keep_dir.as_deref()),
                )
                .await?;
                vec![summary]
            }
            None => {
                ui::with_spinner_async(
                    "Loading all years",
                    "Loaded all years",
                    load_all(&pool, &client, &config.etl, keep_dir.as_deref()),
                )
                .await?
            }
        }
    };

    for summary in &summaries {
        println!("{}", describe(summary));
    }

    pool.close().await;
    Ok(())
}

fn describe(summary: &LoadSummary) -> String {
    let mut line = format!(
        "{}: {} records parsed, {} upserted from {}",
        summary.year,
        summary.parsed,
        summary.upserted,
        summary.source.display()
    );
    let skipped = [
        (summary.malformed, "malformed"),
        (summary.unnamed, "without a name"),
        (summary.duplicates, "duplicate"),
    ];
    for (count, what) in skipped {
        if count > 0 {
            line.push_str(&format!(", {} {} rows skipped", count, what));
        }
    }
    line
}
