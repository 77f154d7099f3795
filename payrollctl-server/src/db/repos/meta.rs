//! Dataset metadata - available years, record count, health

use serde::Serialize;
use sqlx::PgPool;

use super::DbError;

/// Database health as reported by GET /api/health
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub database: &'static str,
    pub total_records: i64,
    pub years_available: Vec<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthReport {
    fn unhealthy(err: &DbError) -> Self {
        Self {
            status: "unhealthy",
            database: "error",
            total_records: 0,
            years_available: Vec::new(),
            error: Some(err.to_string()),
        }
    }
}

/// Metadata repository
pub struct MetaRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> MetaRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Distinct years present in the table, newest first.
    pub async fn available_years(&self) -> Result<Vec<i32>, DbError> {
        let years = sqlx::query_scalar("SELECT DISTINCT year FROM payroll_earnings ORDER BY year DESC")
            .fetch_all(self.pool)
            .await?;
        Ok(years)
    }

    pub async fn total_records(&self) -> Result<i64, DbError> {
        let total = sqlx::query_scalar("SELECT COUNT(*) FROM payroll_earnings")
            .fetch_one(self.pool)
            .await?;
        Ok(total)
    }

    /// Never fails: database errors become an "unhealthy" report.
    pub async fn health(&self) -> HealthReport {
        let result = async {
            let total_records = self.total_records().await?;
            let years_available = self.available_years().await?;
            Ok::<_, DbError>((total_records, years_available))
        }
        .await;

        match result {
            Ok((total_records, years_available)) => HealthReport {
                status: "healthy",
                database: "connected",
                total_records,
                years_available,
                error: None,
            },
            Err(err) => {
                tracing::warn!(error = %err, "health check failed");
                HealthReport::unhealthy(&err)
            }
        }
    }
}
