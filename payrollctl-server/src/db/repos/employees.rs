//! Employee listing - filter, sort, paginate
//!
//! Counting and fetching are separate queries so `total` stays correct when
//! the offset runs past the last row.

use async_stream::try_stream;
use futures::stream::BoxStream;
use futures::TryStreamExt;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use crate::db::filter::{push_order, push_scope};
use crate::models::{EmployeeFilter, Page, Sort};
use super::DbError;

const SELECT_EMPLOYEE: &str = r#"
    SELECT
        id, year, name, department, title,
        COALESCE(regular, 0) AS regular,
        COALESCE(retro, 0) AS retro,
        COALESCE(other, 0) AS other,
        COALESCE(overtime, 0) AS overtime,
        COALESCE(injured, 0) AS injured,
        COALESCE(detail, 0) AS detail,
        COALESCE(quinn_education, 0) AS quinn_education,
        COALESCE(total_gross, 0) AS total_gross,
        zip_code
    FROM payroll_earnings"#;

/// Employee row as served by the API and the CSV export
///
/// Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Employee {
    pub id: i32,
    pub year: i32,
    pub name: String,
    pub department: Option<String>,
    pub title: Option<String>,
    #[serde(serialize_with = "payrollctl_core::money::serialize")]
    pub regular: Decimal,
    #[serde(serialize_with = "payrollctl_core::money::serialize")]
    pub retro: Decimal,
    #[serde(serialize_with = "payrollctl_core::money::serialize")]
    pub other: Decimal,
    #[serde(serialize_with = "payrollctl_core::money::serialize")]
    pub overtime: Decimal,
    #[serde(serialize_with = "payrollctl_core::money::serialize")]
    pub injured: Decimal,
    #[serde(serialize_with = "payrollctl_core::money::serialize")]
    pub detail: Decimal,
    #[serde(serialize_with = "payrollctl_core::money::serialize")]
    pub quinn_education: Decimal,
    #[serde(serialize_with = "payrollctl_core::money::serialize")]
    pub total_gross: Decimal,
    pub zip_code: Option<String>,
}

/// Build the row query for `filter`, optionally paginated.
///
/// Owns its bound values, so callers can move it into a task and stream
/// from it.
pub fn select_employees(
    filter: &EmployeeFilter,
    sort: Sort,
    page: Option<Page>,
) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(SELECT_EMPLOYEE);
    push_scope(&mut builder, filter);
    push_order(&mut builder, sort);
    if let Some(page) = page {
        builder.push(" LIMIT ");
        builder.push_bind(page.limit);
        builder.push(" OFFSET ");
        builder.push_bind(page.offset);
    }
    builder
}

/// Employee repository
pub struct EmployeeRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> EmployeeRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Count rows matching `filter`.
    pub async fn count(&self, filter: &EmployeeFilter) -> Result<i64, DbError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM payroll_earnings");
        push_scope(&mut builder, filter);

        let total: i64 = builder.build_query_scalar().fetch_one(self.pool).await?;
        Ok(total)
    }

    /// Every row matching `filter` in `sort` order, unpaginated.
    ///
    /// The stream holds its own pool handle, so it can outlive the repo and
    /// be driven from a spawned task.
    pub fn stream(
        &self,
        filter: &EmployeeFilter,
        sort: Sort,
    ) -> BoxStream<'static, Result<Employee, DbError>> {
        let pool = self.pool.clone();
        let mut builder = select_employees(filter, sort, None);

        Box::pin(try_stream! {
            let mut rows = builder.build_query_as::<Employee>().fetch(&pool);
            while let Some(row) = rows.try_next().await? {
                yield row;
            }
        })
    }

    /// One page of rows plus the total match count.
    pub async fn list(
        &self,
        filter: &EmployeeFilter,
        sort: Sort,
        page: Page,
    ) -> Result<(Vec<Employee>, i64), DbError> {
        let total = self.count(filter).await?;

        let mut builder = select_employees(filter, sort, Some(page));
        let rows: Vec<Employee> = builder.build_query_as().fetch_all(self.pool).await?;

        tracing::debug!(
            year = filter.year,
            total,
            returned = rows.len(),
            "employee listing"
        );
        Ok((rows, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SortColumn, SortOrder};

    #[test]
    fn paginated_query_shape() {
        let builder = select_employees(
            &EmployeeFilter::year(2022),
            Sort::new(SortColumn::Name, SortOrder::Asc),
            Some(Page::new(25, 50)),
        );
        let sql = builder.sql();
        assert!(sql.contains("WHERE year = $1"));
        assert!(sql.trim_end().ends_with("ORDER BY name ASC, id LIMIT $2 OFFSET $3"));
    }

    #[test]
    fn unpaginated_query_has_no_limit() {
        let builder = select_employees(&EmployeeFilter::year(2022), Sort::by_name(), None);
        assert!(!builder.sql().contains("LIMIT"));
    }

    #[test]
    fn zero_amounts_serialize_with_cents() {
        let employee = Employee {
            id: 7,
            year: 2021,
            name: "Doe,Jane".into(),
            department: None,
            title: None,
            regular: Decimal::new(100, 0),
            retro: Decimal::ZERO,
            other: Decimal::ZERO,
            overtime: Decimal::new(1_000, 2),
            injured: Decimal::ZERO,
            detail: Decimal::ZERO,
            quinn_education: Decimal::ZERO,
            total_gross: Decimal::new(11_000, 2),
            zip_code: None,
        };
        let json = serde_json::to_value(&employee).unwrap();
        assert_eq!(json["regular"], "100.00");
        assert_eq!(json["retro"], "0.00");
        assert_eq!(json["injured"], "0.00");
        assert_eq!(json["overtime"], "10.00");
        assert_eq!(json["total_gross"], "110.00");
    }
}
