//! Snapshot the table to per-year CSV files
//!
//! The portal only keeps a rolling window of years; archiving before a
//! reload keeps older years available locally.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use payrollctl_core::EarningsRecord;
use sqlx::PgPool;

const ARCHIVE_QUERY: &str = r#"
    SELECT
        year, name,
        COALESCE(department, '') AS department,
        COALESCE(title, '') AS title,
        COALESCE(regular, 0) AS regular,
        COALESCE(retro, 0) AS retro,
        COALESCE(other, 0) AS other,
        COALESCE(overtime, 0) AS overtime,
        COALESCE(injured, 0) AS injured,
        COALESCE(detail, 0) AS detail,
        COALESCE(quinn_education, 0) AS quinn_education,
        COALESCE(total_gross, 0) AS total_gross,
        COALESCE(zip_code, '') AS zip_code
    FROM payroll_earnings
    WHERE year = $1
    ORDER BY total_gross DESC, name"#;

pub const MANIFEST_NAME: &str = "manifest.txt";

pub fn archive_path(dir: &Path, year: i32) -> PathBuf {
    dir.join(format!("boston_payroll_{}.csv", year))
}

/// What `archive_year` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveOutcome {
    Written { path: PathBuf, rows: usize },
    /// File already existed and `force` was not set
    Skipped { path: PathBuf },
    /// No rows for the year; nothing written
    Empty,
}

/// CSV bytes with a header row, in record column order.
pub fn records_to_csv(records: &[EarningsRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    writer
        .into_inner()
        .map_err(|e| e.into_error())
        .context("Failed to flush CSV writer")
}

/// Write one year's rows to `dir`.
pub async fn archive_year(pool: &PgPool, dir: &Path, year: i32, force: bool) -> Result<ArchiveOutcome> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let path = archive_path(dir, year);
    if !force && tokio::fs::try_exists(&path).await.unwrap_or(false) {
        tracing::info!(year, path = %path.display(), "archive exists, skipping");
        return Ok(ArchiveOutcome::Skipped { path });
    }

    let records: Vec<EarningsRecord> = sqlx::query_as(ARCHIVE_QUERY)
        .bind(year)
        .fetch_all(pool)
        .await
        .with_context(|| format!("Failed to read {} rows", year))?;

    if records.is_empty() {
        tracing::warn!(year, "no rows to archive");
        return Ok(ArchiveOutcome::Empty);
    }

    let bytes = records_to_csv(&records)?;
    tokio::fs::write(&path, bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!(year, rows = records.len(), path = %path.display(), "archived");
    Ok(ArchiveOutcome::Written {
        path,
        rows: records.len(),
    })
}

/// Archive every year in the table, then write the manifest.
pub async fn archive_all(pool: &PgPool, dir: &Path, force: bool) -> Result<Vec<(i32, ArchiveOutcome)>> {
    let years: Vec<i32> = sqlx::query_scalar("SELECT DISTINCT year FROM payroll_earnings ORDER BY year")
        .fetch_all(pool)
        .await
        .context("Failed to list years")?;

    if years.is_empty() {
        tracing::warn!("no data in database to archive");
        return Ok(Vec::new());
    }

    let mut outcomes = Vec::with_capacity(years.len());
    for &year in &years {
        outcomes.push((year, archive_year(pool, dir, year, force).await?));
    }

    write_manifest(dir, &years, Local::now()).await?;
    Ok(outcomes)
}

/// Write `manifest.txt` listing each year's file and size.
pub async fn write_manifest(dir: &Path, years: &[i32], at: DateTime<Local>) -> Result<PathBuf> {
    let mut files = Vec::new();
    for &year in years {
        let path = archive_path(dir, year);
        if let Ok(meta) = tokio::fs::metadata(&path).await {
            files.push((year, meta.len()));
        }
    }

    let manifest = render_manifest(years, &files, at);
    let path = dir.join(MANIFEST_NAME);
    tokio::fs::write(&path, manifest)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

fn render_manifest(years: &[i32], files: &[(i32, u64)], at: DateTime<Local>) -> String {
    let year_list = years
        .iter()
        .map(i32::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    let mut out = String::from("Boston Payroll Data Archive\n");
    out.push_str(&format!("Archived at: {}\n", at.to_rfc3339()));
    out.push_str(&format!("Years: [{}]\n", year_list));
    out.push_str("\nFiles:\n");
    for (year, size) in files {
        let mb = *size as f64 / (1024.0 * 1024.0);
        out.push_str(&format!("  boston_payroll_{}.csv  ({:.1} MB)\n", year, mb));
    }
    out
}
