//! Upsert cleaned records into `payroll_earnings`
//!
//! Loads are idempotent: the unique key (year, name, department, title)
//! turns a re-run into updates.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use payrollctl_core::config::EtlConfig;
use payrollctl_core::{sources, EarningsRecord};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::download::{download_year, SourceFormat};
use crate::parse::{parse_file, ParseReport};

/// Postgres accepts at most this many bind parameters per statement
const MAX_BIND_PARAMS: usize = 65_535;

/// Bound values per record
const FIELDS_PER_RECORD: usize = 13;

const INSERT_HEAD: &str = "INSERT INTO payroll_earnings (\
    year, name, department, title, regular, retro, other, overtime, \
    injured, detail, quinn_education, total_gross, zip_code) ";

const ON_CONFLICT: &str = " ON CONFLICT (year, name, department, title) DO UPDATE SET \
    regular = EXCLUDED.regular, \
    retro = EXCLUDED.retro, \
    other = EXCLUDED.other, \
    overtime = EXCLUDED.overtime, \
    injured = EXCLUDED.injured, \
    detail = EXCLUDED.detail, \
    quinn_education = EXCLUDED.quinn_education, \
    total_gross = EXCLUDED.total_gross, \
    zip_code = EXCLUDED.zip_code";

/// Clamp a requested batch size to what one statement can bind.
pub fn effective_batch_size(requested: usize) -> usize {
    requested.clamp(1, MAX_BIND_PARAMS / FIELDS_PER_RECORD)
}

/// Multi-row upsert for one batch.
pub fn upsert_query(batch: &[EarningsRecord]) -> QueryBuilder<'_, Postgres> {
    let mut builder = QueryBuilder::new(INSERT_HEAD);
    builder.push_values(batch, |mut row, r| {
        row.push_bind(r.year)
            .push_bind(&r.name)
            .push_bind(&r.department)
            .push_bind(&r.title)
            .push_bind(r.regular)
            .push_bind(r.retro)
            .push_bind(r.other)
            .push_bind(r.overtime)
            .push_bind(r.injured)
            .push_bind(r.detail)
            .push_bind(r.quinn_education)
            .push_bind(r.total_gross)
            .push_bind(&r.zip_code);
    });
    builder.push(ON_CONFLICT);
    builder
}

/// Upsert one batch on an open connection or transaction.
///
/// The batch must not repeat a key (see `parse::dedupe_keys`).
pub async fn upsert_batch(conn: &mut PgConnection, batch: &[EarningsRecord]) -> Result<u64> {
    if batch.is_empty() {
        return Ok(0);
    }
    let result = upsert_query(batch)
        .build()
        .execute(conn)
        .await
        .context("Batch upsert failed")?;
    Ok(result.rows_affected())
}

/// Upsert all records in batches inside one transaction.
pub async fn upsert_records(
    pool: &PgPool,
    records: &[EarningsRecord],
    batch_size: usize,
) -> Result<u64> {
    let batch_size = effective_batch_size(batch_size);
    let mut tx = pool.begin().await.context("Failed to start transaction")?;

    let mut affected = 0u64;
    for (n, batch) in records.chunks(batch_size).enumerate() {
        affected += upsert_batch(&mut *tx, batch).await?;
        tracing::debug!(batch = n + 1, rows = batch.len(), "upserted batch");
    }

    tx.commit().await.context("Failed to commit load")?;
    Ok(affected)
}

/// Outcome of loading one year
#[derive(Debug, Clone)]
pub struct LoadSummary {
    pub year: i32,
    pub source: PathBuf,
    pub parsed: usize,
    pub upserted: u64,
    pub malformed: usize,
    pub unnamed: usize,
    pub duplicates: usize,
}

impl LoadSummary {
    fn new(year: i32, source: &Path, report: &ParseReport, upserted: u64) -> Self {
        Self {
            year,
            source: source.to_path_buf(),
            parsed: report.records.len(),
            upserted,
            malformed: report.malformed,
            unnamed: report.unnamed,
            duplicates: report.duplicates,
        }
    }
}

/// Download, parse and upsert one year.
///
/// The download goes to a temp dir removed afterwards, or into `keep_dir`
/// when given.
pub async fn load_year(
    pool: &PgPool,
    client: &reqwest::Client,
    config: &EtlConfig,
    year: i32,
    keep_dir: Option<&Path>,
) -> Result<LoadSummary> {
    let temp = tempfile::tempdir().context("Failed to create temp directory")?;
    let dir = match keep_dir {
        Some(dir) => {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            dir
        }
        None => temp.path(),
    };

    let download = download_year(client, &config.source_base_url, year, dir).await?;
    let summary = load_parsed(pool, &download.path, download.format, year, config.batch_size).await?;

    temp.close().context("Failed to remove temp directory")?;
    Ok(summary)
}

/// Parse and upsert a local file, detecting CSV vs XLSX from its content.
pub async fn load_file(
    pool: &PgPool,
    path: &Path,
    year: i32,
    batch_size: usize,
) -> Result<LoadSummary> {
    let head = read_head(path).await?;
    let format = SourceFormat::detect(&head);
    load_parsed(pool, path, format, year, batch_size).await
}

/// Every year with a known source, oldest first. Stops at the first failure.
pub async fn load_all(
    pool: &PgPool,
    client: &reqwest::Client,
    config: &EtlConfig,
    keep_dir: Option<&Path>,
) -> Result<Vec<LoadSummary>> {
    let mut summaries = Vec::new();
    for year in sources::years() {
        let summary = load_year(pool, client, config, year, keep_dir)
            .await
            .with_context(|| format!("Loading {} failed", year))?;
        summaries.push(summary);
    }
    Ok(summaries)
}

async fn load_parsed(
    pool: &PgPool,
    path: &Path,
    format: SourceFormat,
    year: i32,
    batch_size: usize,
) -> Result<LoadSummary> {
    let owned = path.to_path_buf();
    let report = tokio::task::spawn_blocking(move || parse_file(&owned, format, year))
        .await
        .context("Parser task panicked")??;

    let upserted = upsert_records(pool, &report.records, batch_size).await?;
    tracing::info!(year, records = report.records.len(), upserted, "year loaded");
    Ok(LoadSummary::new(year, path, &report, upserted))
}

async fn read_head(path: &Path) -> Result<Vec<u8>> {
    use tokio::io::AsyncReadExt;

    let mut file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let mut head = vec![0u8; 4];
    let n = file.read(&mut head).await?;
    head.truncate(n);
    Ok(head)
}
