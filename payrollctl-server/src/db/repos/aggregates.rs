//! Department rollups, summary statistics and earnings composition

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use crate::db::filter::{push_department_scope, push_scope};
use crate::models::{percentages, ComponentTotals, EmployeeFilter};
use super::DbError;

/// Per-department aggregate for one year
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct DepartmentStats {
    pub name: String,
    pub employee_count: i64,
    #[serde(serialize_with = "payrollctl_core::money::serialize")]
    pub total_earnings: Decimal,
    #[serde(serialize_with = "payrollctl_core::money::serialize")]
    pub avg_earnings: Decimal,
    #[serde(serialize_with = "payrollctl_core::money::serialize")]
    pub avg_overtime: Decimal,
    #[serde(serialize_with = "payrollctl_core::money::serialize")]
    pub total_overtime: Decimal,
    #[serde(serialize_with = "payrollctl_core::money::serialize")]
    pub total_detail: Decimal,
}

/// Summary statistics with a year-over-year comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub year: i32,
    pub total_employees: i64,
    #[serde(serialize_with = "payrollctl_core::money::serialize")]
    pub total_payroll: Decimal,
    #[serde(serialize_with = "payrollctl_core::money::serialize")]
    pub avg_salary: Decimal,
    #[serde(serialize_with = "payrollctl_core::money::serialize")]
    pub median_salary: Decimal,
    #[serde(serialize_with = "payrollctl_core::money::serialize")]
    pub total_overtime: Decimal,
    #[serde(serialize_with = "payrollctl_core::money::serialize")]
    pub total_detail: Decimal,
    pub top_department: Option<String>,
    #[serde(serialize_with = "payrollctl_core::money::serialize")]
    pub top_department_total: Decimal,
    pub prior_year_employees: Option<i64>,
    #[serde(serialize_with = "payrollctl_core::money::option::serialize")]
    pub prior_year_payroll: Option<Decimal>,
    #[serde(serialize_with = "payrollctl_core::money::option::serialize")]
    pub prior_year_avg_salary: Option<Decimal>,
    #[serde(serialize_with = "payrollctl_core::money::option::serialize")]
    pub prior_year_overtime: Option<Decimal>,
}

/// Earnings composition for one scope
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EarningsBreakdown {
    pub year: i32,
    pub breakdown: ComponentTotals,
    pub percentages: BTreeMap<&'static str, f64>,
}

#[derive(Debug, FromRow)]
struct ScopeTotals {
    total_employees: i64,
    total_payroll: Decimal,
    avg_salary: Decimal,
    median_salary: Decimal,
    total_overtime: Decimal,
    total_detail: Decimal,
}

#[derive(Debug, FromRow)]
struct PriorTotals {
    total_employees: i64,
    total_payroll: Decimal,
    avg_salary: Decimal,
    total_overtime: Decimal,
}

/// Aggregate repository
pub struct AggregateRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> AggregateRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Department rollup, largest payroll first.
    ///
    /// Rows without a department are left out.
    pub async fn departments(&self, year: i32) -> Result<Vec<DepartmentStats>, DbError> {
        let mut builder = QueryBuilder::<Postgres>::new(
            r#"
            SELECT
                department AS name,
                COUNT(*) AS employee_count,
                COALESCE(SUM(total_gross), 0) AS total_earnings,
                COALESCE(ROUND(AVG(total_gross), 2), 0) AS avg_earnings,
                COALESCE(ROUND(AVG(overtime), 2), 0) AS avg_overtime,
                COALESCE(SUM(overtime), 0) AS total_overtime,
                COALESCE(SUM(detail), 0) AS total_detail
            FROM payroll_earnings"#,
        );
        push_department_scope(&mut builder, year);
        builder.push(" GROUP BY department ORDER BY total_earnings DESC, department");

        let rows = builder.build_query_as().fetch_all(self.pool).await?;
        Ok(rows)
    }

    /// Summary statistics for a year, optionally within one department.
    pub async fn stats(
        &self,
        year: i32,
        department: Option<&str>,
    ) -> Result<Stats, DbError> {
        let scope = EmployeeFilter::year(year).with_department(department.map(str::to_owned));

        let mut builder = QueryBuilder::<Postgres>::new(
            r#"
            SELECT
                COUNT(*) AS total_employees,
                COALESCE(SUM(total_gross), 0) AS total_payroll,
                COALESCE(ROUND(AVG(total_gross), 2), 0) AS avg_salary,
                COALESCE(ROUND((PERCENTILE_CONT(0.5) WITHIN GROUP (ORDER BY total_gross))::numeric, 2), 0)
                    AS median_salary,
                COALESCE(SUM(overtime), 0) AS total_overtime,
                COALESCE(SUM(detail), 0) AS total_detail
            FROM payroll_earnings"#,
        );
        push_scope(&mut builder, &scope);
        let current: ScopeTotals = builder.build_query_as().fetch_one(self.pool).await?;

        let prior = self.prior_year(&scope).await?;

        let (top_department, top_department_total) = match department {
            Some(name) => (Some(name.to_owned()), current.total_payroll),
            None => match self.top_department(year).await? {
                Some((name, total)) => (Some(name), total),
                None => (None, Decimal::ZERO),
            },
        };

        Ok(Stats {
            year,
            total_employees: current.total_employees,
            total_payroll: current.total_payroll,
            avg_salary: current.avg_salary,
            median_salary: current.median_salary,
            total_overtime: current.total_overtime,
            total_detail: current.total_detail,
            top_department,
            top_department_total,
            prior_year_employees: prior.as_ref().map(|p| p.total_employees),
            prior_year_payroll: prior.as_ref().map(|p| p.total_payroll),
            prior_year_avg_salary: prior.as_ref().map(|p| p.avg_salary),
            prior_year_overtime: prior.as_ref().map(|p| p.total_overtime),
        })
    }

    /// Same scope one year earlier; None when that year has no rows.
    async fn prior_year(&self, scope: &EmployeeFilter) -> Result<Option<PriorTotals>, DbError> {
        let prior_scope = EmployeeFilter::year(scope.year - 1)
            .with_department(scope.department.clone());

        let mut builder = QueryBuilder::<Postgres>::new(
            r#"
            SELECT
                COUNT(*) AS total_employees,
                COALESCE(SUM(total_gross), 0) AS total_payroll,
                COALESCE(ROUND(AVG(total_gross), 2), 0) AS avg_salary,
                COALESCE(SUM(overtime), 0) AS total_overtime
            FROM payroll_earnings"#,
        );
        push_scope(&mut builder, &prior_scope);
        let prior: PriorTotals = builder.build_query_as().fetch_one(self.pool).await?;

        Ok((prior.total_employees > 0).then_some(prior))
    }

    /// Department with the largest summed gross for `year`.
    async fn top_department(&self, year: i32) -> Result<Option<(String, Decimal)>, DbError> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT department AS name, COALESCE(SUM(total_gross), 0) AS total FROM payroll_earnings",
        );
        push_department_scope(&mut builder, year);
        builder.push(" GROUP BY department ORDER BY total DESC, department LIMIT 1");

        let row: Option<(String, Decimal)> =
            builder.build_query_as().fetch_optional(self.pool).await?;
        Ok(row)
    }

    /// Per-component sums with their percentage shares.
    pub async fn earnings_breakdown(
        &self,
        year: i32,
        department: Option<&str>,
    ) -> Result<EarningsBreakdown, DbError> {
        let scope = EmployeeFilter::year(year).with_department(department.map(str::to_owned));

        let mut builder = QueryBuilder::<Postgres>::new(
            r#"
            SELECT
                COALESCE(SUM(regular), 0) AS regular,
                COALESCE(SUM(overtime), 0) AS overtime,
                COALESCE(SUM(detail), 0) AS detail,
                COALESCE(SUM(retro), 0) AS retro,
                COALESCE(SUM(other), 0) AS other,
                COALESCE(SUM(injured), 0) AS injured,
                COALESCE(SUM(quinn_education), 0) AS quinn_education
            FROM payroll_earnings"#,
        );
        push_scope(&mut builder, &scope);
        let breakdown: ComponentTotals = builder.build_query_as().fetch_one(self.pool).await?;

        Ok(EarningsBreakdown {
            year,
            percentages: percentages(&breakdown),
            breakdown,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scope_stats_serialize_with_cents() {
        let stats = Stats {
            year: 2020,
            total_employees: 0,
            total_payroll: Decimal::ZERO,
            avg_salary: Decimal::ZERO,
            median_salary: Decimal::ZERO,
            total_overtime: Decimal::ZERO,
            total_detail: Decimal::ZERO,
            top_department: None,
            top_department_total: Decimal::ZERO,
            prior_year_employees: None,
            prior_year_payroll: None,
            prior_year_avg_salary: None,
            prior_year_overtime: None,
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["total_payroll"], "0.00");
        assert_eq!(json["avg_salary"], "0.00");
        assert_eq!(json["median_salary"], "0.00");
        assert_eq!(json["top_department_total"], "0.00");
        assert!(json["top_department"].is_null());
        assert!(json["prior_year_payroll"].is_null());
    }

    #[test]
    fn department_amounts_keep_cents() {
        let row = DepartmentStats {
            name: "Boston Fire Department".into(),
            employee_count: 3,
            total_earnings: Decimal::new(300_000, 0),
            avg_earnings: Decimal::new(100_000, 0),
            avg_overtime: Decimal::ZERO,
            total_overtime: Decimal::ZERO,
            total_detail: Decimal::new(5, 1),
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["total_earnings"], "300000.00");
        assert_eq!(json["avg_overtime"], "0.00");
        assert_eq!(json["total_detail"], "0.50");
    }
}
