//! Copy every row from one database into another
//!
//! The target schema is created first; rows stream from the source and are
//! upserted in batches, each batch committed on its own.

use anyhow::{Context, Result};
use futures::TryStreamExt;
use payrollctl_core::db::create_schema;
use payrollctl_core::EarningsRecord;
use sqlx::PgPool;

use crate::load::{effective_batch_size, upsert_batch};
use crate::parse::dedupe_keys;

const SOURCE_QUERY: &str = r#"
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
    ORDER BY year, name"#;

/// Row counts before and after a migration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationSummary {
    pub source_rows: i64,
    pub copied: u64,
    pub target_rows: i64,
}

impl MigrationSummary {
    /// The target holds at least every source row.
    pub fn complete(&self) -> bool {
        self.target_rows >= self.source_rows
    }
}

/// Copy all rows from `source` to `target`.
///
/// `on_batch` is called with the running number of rows sent.
pub async fn migrate(
    source: &PgPool,
    target: &PgPool,
    batch_size: usize,
    mut on_batch: impl FnMut(u64),
) -> Result<MigrationSummary> {
    create_schema(target)
        .await
        .context("Failed to create schema on target")?;

    let source_rows = count_rows(source).await.context("Failed to count source rows")?;
    tracing::info!(source_rows, "starting migration");

    let batch_size = effective_batch_size(batch_size);
    let mut rows = sqlx::query_as::<_, EarningsRecord>(SOURCE_QUERY).fetch(source);
    let mut batch = Vec::with_capacity(batch_size);
    let mut copied = 0u64;

    while let Some(record) = rows.try_next().await.context("Failed to read source row")? {
        batch.push(record);
        if batch.len() >= batch_size {
            copied += flush(target, &mut batch).await?;
            on_batch(copied);
        }
    }
    if !batch.is_empty() {
        copied += flush(target, &mut batch).await?;
        on_batch(copied);
    }

    let target_rows = count_rows(target).await.context("Failed to count target rows")?;
    let summary = MigrationSummary {
        source_rows,
        copied,
        target_rows,
    };
    if summary.complete() {
        tracing::info!(?summary, "migration complete");
    } else {
        tracing::warn!(?summary, "target has fewer rows than source");
    }
    Ok(summary)
}

/// Upsert and clear `batch`; returns the rows sent.
async fn flush(target: &PgPool, batch: &mut Vec<EarningsRecord>) -> Result<u64> {
    let sent = batch.len() as u64;
    let (records, collapsed) = dedupe_keys(std::mem::take(batch));
    if collapsed > 0 {
        tracing::debug!(collapsed, "source rows sharing a key after NULL folding");
    }

    let mut tx = target.begin().await.context("Failed to start batch")?;
    upsert_batch(&mut *tx, &records).await?;
    tx.commit().await.context("Failed to commit batch")?;
    Ok(sent)
}

async fn count_rows(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM payroll_earnings")
        .fetch_one(pool)
        .await
}
