//! Post-load data checks
//!
//! Each check returns pass/fail plus a printable report; a check that errors
//! counts as failed so one broken query does not hide the others.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use payrollctl_core::db::INDEXES;
use payrollctl_core::sources;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, ContentArrangement, Table};
use rust_decimal::Decimal;
use sqlx::PgPool;

/// Fewer records than this draws a warning, not a failure
pub const EXPECTED_MIN_RECORDS: i64 = 100_000;

/// Result of one check
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub name: &'static str,
    pub passed: bool,
    pub report: String,
}

impl CheckOutcome {
    fn failed(name: &'static str, report: impl Into<String>) -> Self {
        Self {
            name,
            passed: false,
            report: report.into(),
        }
    }
}

/// Table with the condensed UTF-8 preset used for all check reports
pub fn grid<I, S>(headers: I) -> Table
where
    I: IntoIterator<Item = S>,
    S: Into<Cell>,
{
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.into_iter().map(Into::into).collect::<Vec<Cell>>());
    table
}

/// `$1,234,567.89`
pub fn format_money(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    format!("{}${}.{}", if negative { "-" } else { "" }, group_thousands(whole), frac)
}

/// `1,234,567`
pub fn format_count(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let sign = if value < 0 { "-" } else { "" };
    format!("{}{}", sign, group_thousands(&digits))
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Record counts per year; fails unless every known year is present.
pub async fn record_counts(pool: &PgPool) -> Result<CheckOutcome, sqlx::Error> {
    const NAME: &str = "record_counts";

    let rows: Vec<(i32, i64)> = sqlx::query_as(
        "SELECT year, COUNT(*) FROM payroll_earnings GROUP BY year ORDER BY year",
    )
    .fetch_all(pool)
    .await?;

    let mut table = grid(["Year", "Count"]);
    for (year, count) in &rows {
        table.add_row(vec![year.to_string(), format_count(*count)]);
    }
    let total: i64 = rows.iter().map(|(_, c)| c).sum();
    let mut report = format!("{}\n\nTotal records: {}\n", table, format_count(total));

    let expected = sources::years().len();
    if rows.len() != expected {
        let _ = writeln!(report, "[ERROR] Expected {} years of data, found {}", expected, rows.len());
        return Ok(CheckOutcome::failed(NAME, report));
    }
    if total < EXPECTED_MIN_RECORDS {
        let _ = writeln!(
            report,
            "[WARNING] Total records below the expected ~{}",
            format_count(EXPECTED_MIN_RECORDS)
        );
    } else {
        report.push_str("[OK] Record counts look good\n");
    }

    Ok(CheckOutcome {
        name: NAME,
        passed: true,
        report,
    })
}

/// No two rows share the unique key.
pub async fn no_duplicates(pool: &PgPool) -> Result<CheckOutcome, sqlx::Error> {
    const NAME: &str = "no_duplicates";

    let rows: Vec<(i32, String, Option<String>, Option<String>, i64)> = sqlx::query_as(
        r#"
        SELECT year, name, department, title, COUNT(*)
        FROM payroll_earnings
        GROUP BY year, name, department, title
        HAVING COUNT(*) > 1
        LIMIT 10"#,
    )
    .fetch_all(pool)
    .await?;

    if rows.is_empty() {
        return Ok(CheckOutcome {
            name: NAME,
            passed: true,
            report: "[OK] No duplicates found\n".into(),
        });
    }

    let mut table = grid(["Year", "Name", "Dept", "Title", "Count"]);
    for (year, name, department, title, count) in &rows {
        table.add_row(vec![
            year.to_string(),
            name.clone(),
            department.clone().unwrap_or_default(),
            title.clone().unwrap_or_default(),
            count.to_string(),
        ]);
    }
    Ok(CheckOutcome::failed(
        NAME,
        format!("[ERROR] Found {} duplicate keys\n{}\n", rows.len(), table),
    ))
}

/// Top ten departments of `year`, or of the newest year in the table.
pub async fn departments(pool: &PgPool, year: Option<i32>) -> Result<CheckOutcome, sqlx::Error> {
    const NAME: &str = "departments";

    let year = match year {
        Some(year) => Some(year),
        None => {
            sqlx::query_scalar("SELECT MAX(year) FROM payroll_earnings")
                .fetch_one(pool)
                .await?
        }
    };
    let Some(year) = year else {
        return Ok(CheckOutcome::failed(NAME, "[ERROR] No departments found\n"));
    };

    let rows: Vec<(Option<String>, i64)> = sqlx::query_as(
        r#"
        SELECT department, COUNT(*) AS employees
        FROM payroll_earnings
        WHERE year = $1
        GROUP BY department
        ORDER BY employees DESC, department
        LIMIT 10"#,
    )
    .bind(year)
    .fetch_all(pool)
    .await?;

    let mut table = grid(["Department", "Employees"]);
    for (department, count) in &rows {
        table.add_row(vec![department.clone().unwrap_or_default(), format_count(*count)]);
    }
    let mut report = format!("Top departments by employee count ({})\n{}\n", year, table);

    if rows.is_empty() {
        report.push_str("[ERROR] No departments found\n");
        return Ok(CheckOutcome::failed(NAME, report));
    }
    report.push_str("[OK] Departments look reasonable\n");
    Ok(CheckOutcome {
        name: NAME,
        passed: true,
        report,
    })
}

/// Total and average gross per year. Informational.
pub async fn earnings_totals(pool: &PgPool) -> Result<CheckOutcome, sqlx::Error> {
    let rows: Vec<(i32, Decimal, Decimal)> = sqlx::query_as(
        r#"
        SELECT
            year,
            COALESCE(SUM(total_gross), 0)::numeric(15,2),
            COALESCE(AVG(total_gross), 0)::numeric(10,2)
        FROM payroll_earnings
        GROUP BY year
        ORDER BY year"#,
    )
    .fetch_all(pool)
    .await?;

    let mut table = grid(["Year", "Total Earnings", "Avg Earnings"]);
    for (year, total, avg) in &rows {
        table.add_row(vec![year.to_string(), format_money(*total), format_money(*avg)]);
    }

    Ok(CheckOutcome {
        name: "earnings_totals",
        passed: true,
        report: format!("{}\n[OK] Earnings totals calculated\n", table),
    })
}

/// Every index from the schema exists.
pub async fn indexes(pool: &PgPool) -> Result<CheckOutcome, sqlx::Error> {
    const NAME: &str = "indexes";

    let present: BTreeSet<String> = sqlx::query_scalar(
        r#"
        SELECT indexname::text
        FROM pg_indexes
        WHERE tablename = 'payroll_earnings'
          AND indexname LIKE 'idx_payroll%'"#,
    )
    .fetch_all(pool)
    .await?
    .into_iter()
    .collect();

    let missing: Vec<&str> = INDEXES
        .iter()
        .map(|(name, _)| *name)
        .filter(|name| !present.contains(*name))
        .collect();

    if !missing.is_empty() {
        return Ok(CheckOutcome::failed(
            NAME,
            format!("[ERROR] Missing indexes: {}\n", missing.join(", ")),
        ));
    }

    let mut report = format!("[OK] All {} indexes exist\n", INDEXES.len());
    for name in &present {
        let _ = writeln!(report, "  - {}", name);
    }
    Ok(CheckOutcome {
        name: NAME,
        passed: true,
        report,
    })
}

/// Run every check in order. `year` picks the department check's year.
pub async fn run_all(pool: &PgPool, year: Option<i32>) -> Vec<CheckOutcome> {
    let mut outcomes = Vec::with_capacity(5);

    macro_rules! check {
        ($name:literal, $fut:expr) => {
            match $fut.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    tracing::error!(check = $name, error = %e, "validation check errored");
                    outcomes.push(CheckOutcome::failed($name, format!("[ERROR] {}\n", e)));
                }
            }
        };
    }

    check!("record_counts", record_counts(pool));
    check!("no_duplicates", no_duplicates(pool));
    check!("departments", departments(pool, year));
    check!("earnings_totals", earnings_totals(pool));
    check!("indexes", indexes(pool));

    outcomes
}

pub fn all_passed(outcomes: &[CheckOutcome]) -> bool {
    outcomes.iter().all(|o| o.passed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_and_counts() {
        assert_eq!(format_money(Decimal::new(123_456_789, 2)), "$1,234,567.89");
        assert_eq!(format_money(Decimal::new(5, 1)), "$0.50");
        assert_eq!(format_money(Decimal::new(-100_000, 2)), "-$1,000.00");
        assert_eq!(format_count(100_000), "100,000");
        assert_eq!(format_count(999), "999");
    }

    #[test]
    fn grid_renders_header_and_rows() {
        let mut table = grid(["Year", "Count"]);
        table.add_row(vec!["2020", "22,000"]);
        table.add_row(vec!["2021", "9"]);
        let text = table.to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[1].contains("Year") && lines[1].contains("Count"));
        assert!(text.contains("22,000"));
        assert!(lines.iter().any(|l| l.contains("2021") && l.contains('9')));
    }

    #[test]
    fn summary_fails_on_any_failure() {
        let ok = CheckOutcome {
            name: "a",
            passed: true,
            report: String::new(),
        };
        let bad = CheckOutcome::failed("b", "boom");
        assert!(all_passed(&[ok.clone()]));
        assert!(!all_passed(&[ok, bad]));
    }
}
