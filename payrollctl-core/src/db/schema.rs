//! Table and index creation for `payroll_earnings`

use sqlx::PgPool;

use super::DbError;

/// The one table of the dataset.
pub const TABLE: &str = "payroll_earnings";

/// Secondary indexes as (name, definition).
pub const INDEXES: [(&str, &str); 5] = [
    (
        "idx_payroll_year",
        "CREATE INDEX IF NOT EXISTS idx_payroll_year ON payroll_earnings(year)",
    ),
    (
        "idx_payroll_department",
        "CREATE INDEX IF NOT EXISTS idx_payroll_department ON payroll_earnings(department)",
    ),
    (
        "idx_payroll_total_gross",
        "CREATE INDEX IF NOT EXISTS idx_payroll_total_gross ON payroll_earnings(total_gross DESC)",
    ),
    (
        "idx_payroll_name_search",
        "CREATE INDEX IF NOT EXISTS idx_payroll_name_search ON payroll_earnings(name varchar_pattern_ops)",
    ),
    (
        "idx_payroll_year_dept",
        "CREATE INDEX IF NOT EXISTS idx_payroll_year_dept ON payroll_earnings(year, department)",
    ),
];

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS payroll_earnings (
        id SERIAL PRIMARY KEY,
        year INTEGER NOT NULL,
        name VARCHAR(255) NOT NULL,
        department VARCHAR(255),
        title VARCHAR(255),
        regular DECIMAL(12,2) DEFAULT 0,
        retro DECIMAL(12,2) DEFAULT 0,
        other DECIMAL(12,2) DEFAULT 0,
        overtime DECIMAL(12,2) DEFAULT 0,
        injured DECIMAL(12,2) DEFAULT 0,
        detail DECIMAL(12,2) DEFAULT 0,
        quinn_education DECIMAL(12,2) DEFAULT 0,
        total_gross DECIMAL(12,2) DEFAULT 0,
        zip_code VARCHAR(10),
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        UNIQUE(year, name, department, title)
    )
"#;

/// Create the table and its indexes, then verify the table is visible.
///
/// Safe to run repeatedly.
pub async fn create_schema(pool: &PgPool) -> Result<(), DbError> {
    tracing::info!("Creating {} schema...", TABLE);

    let mut tx = pool.begin().await?;

    sqlx::query(CREATE_TABLE).execute(&mut *tx).await?;

    for (name, sql) in INDEXES {
        tracing::debug!(index = name, "ensuring index");
        sqlx::query(sql).execute(&mut *tx).await?;
    }

    tx.commit().await?;

    let (exists,): (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM information_schema.tables WHERE table_name = $1)",
    )
    .bind(TABLE)
    .fetch_one(pool)
    .await?;

    if !exists {
        return Err(DbError::SchemaVerification { table: TABLE });
    }

    tracing::info!("Table '{}' verified", TABLE);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_definitions_match_names() {
        for (name, sql) in INDEXES {
            assert!(sql.contains(name), "{name} not in its definition");
            assert!(sql.contains(TABLE));
        }
    }

    #[test]
    fn table_has_unique_identity() {
        assert!(CREATE_TABLE.contains("UNIQUE(year, name, department, title)"));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn create_schema_is_idempotent() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.expect("pool");

        create_schema(&pool).await.expect("first run");
        create_schema(&pool).await.expect("second run");

        let names: Vec<(String,)> = sqlx::query_as(
            "SELECT indexname FROM pg_indexes WHERE tablename = $1 AND indexname LIKE 'idx_payroll%'",
        )
        .bind(TABLE)
        .fetch_all(&pool)
        .await
        .expect("index query");

        for (name, _) in INDEXES {
            assert!(names.iter().any(|(n,)| n == name), "missing {name}");
        }
    }
}
