//! Source files to clean `EarningsRecord`s
//!
//! CSV goes through the `csv` crate, Excel through `calamine` (first sheet).
//! Both produce rows of strings that share one cleaning path.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use payrollctl_core::{EarningsComponent, EarningsRecord, RecordKey};
use rust_decimal::Decimal;

use crate::columns::{Column, ColumnMap};
use crate::decode::decode_text;
use crate::download::SourceFormat;

/// Width of the name/department/title columns
const TEXT_WIDTH: usize = 255;

/// Width of the zip_code column
const ZIP_WIDTH: usize = 10;

/// Records from one file plus what was dropped on the way
#[derive(Debug, Default)]
pub struct ParseReport {
    pub records: Vec<EarningsRecord>,
    /// Rows the CSV reader could not read
    pub malformed: usize,
    /// Rows without an employee name (Excel padding, footers)
    pub unnamed: usize,
    /// Rows collapsed into a later row with the same key
    pub duplicates: usize,
    /// Records whose components do not add up to the published total.
    /// The published total is kept.
    pub total_mismatches: usize,
}

/// Parse a downloaded or local file for `year`.
pub fn parse_file(path: &Path, format: SourceFormat, year: i32) -> Result<ParseReport> {
    let report = match format {
        SourceFormat::Csv => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            parse_csv(&bytes, year)?
        }
        SourceFormat::Xlsx => parse_xlsx(path, year)?,
    };

    tracing::info!(
        year,
        path = %path.display(),
        records = report.records.len(),
        malformed = report.malformed,
        unnamed = report.unnamed,
        duplicates = report.duplicates,
        total_mismatches = report.total_mismatches,
        "parsed source file"
    );
    Ok(report)
}

/// Parse CSV bytes in any of the encodings the city has published.
pub fn parse_csv(bytes: &[u8], year: i32) -> Result<ParseReport> {
    let text = decode_text(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read CSV header row")?
        .iter()
        .map(str::to_owned)
        .collect();

    let mut malformed = 0usize;
    let rows = reader.records().filter_map(|row| match row {
        Ok(record) => Some(record.iter().map(str::to_owned).collect::<Vec<_>>()),
        Err(err) => {
            tracing::debug!(error = %err, "skipping malformed CSV row");
            malformed += 1;
            None
        }
    });

    let mut report = clean_rows(&headers, rows, year)?;
    report.malformed = malformed;
    Ok(report)
}

/// Parse the first worksheet of an Excel workbook.
pub fn parse_xlsx(path: &Path, year: i32) -> Result<ParseReport> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook {}", path.display()))?;

    let Some(sheet) = workbook.sheet_names().first().cloned() else {
        bail!("workbook {} has no sheets", path.display());
    };
    let range = workbook
        .worksheet_range(&sheet)
        .with_context(|| format!("Failed to read sheet '{}'", sheet))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        bail!("sheet '{}' is empty", sheet);
    };
    let headers: Vec<String> = header_row.iter().map(cell_text).collect();

    clean_rows(
        &headers,
        rows.map(|row| row.iter().map(cell_text).collect()),
        year,
    )
}

/// Render a spreadsheet cell the way it would appear in a CSV export.
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

fn clean_rows<I>(headers: &[String], rows: I, year: i32) -> Result<ParseReport>
where
    I: Iterator<Item = Vec<String>>,
{
    let map = ColumnMap::from_headers(headers);
    if map.position(Column::Name).is_none() {
        bail!("no NAME column among headers {:?}", headers);
    }
    let missing = map.missing();
    if !missing.is_empty() {
        tracing::warn!(year, ?missing, "columns absent from source, using defaults");
    }
    if !map.unmapped().is_empty() {
        tracing::debug!(year, unmapped = ?map.unmapped(), "ignoring unknown columns");
    }

    let mut records = Vec::new();
    let mut unnamed = 0usize;
    for row in rows {
        match clean_row(&map, &row, year) {
            Some(record) => records.push(record),
            None => unnamed += 1,
        }
    }

    let (records, duplicates) = dedupe_keys(records);
    let total_mismatches = records
        .iter()
        .filter(|r| r.components_sum() != r.total_gross)
        .count();
    if total_mismatches > 0 {
        tracing::warn!(year, total_mismatches, "components do not sum to total gross");
    }

    Ok(ParseReport {
        records,
        malformed: 0,
        unnamed,
        duplicates,
        total_mismatches,
    })
}

/// Build one record; None when the row has no name.
fn clean_row(map: &ColumnMap, row: &[String], year: i32) -> Option<EarningsRecord> {
    let field = |column: Column| cell(map, row, column);

    let name = clean_text(field(Column::Name), TEXT_WIDTH);
    if name.is_empty() {
        return None;
    }

    let mut record = EarningsRecord {
        year,
        name,
        department: clean_text(field(Column::Department), TEXT_WIDTH),
        title: clean_text(field(Column::Title), TEXT_WIDTH),
        total_gross: parse_money(field(Column::TotalGross)),
        zip_code: normalize_zip(field(Column::ZipCode)),
        ..Default::default()
    };
    for component in EarningsComponent::ALL {
        *record.component_mut(component) = parse_money(field(Column::Component(component)));
    }
    Some(record)
}

/// Trimmed cell for `column`; empty when the column or cell is absent.
fn cell<'r>(map: &ColumnMap, row: &'r [String], column: Column) -> &'r str {
    map.position(column)
        .and_then(|idx| row.get(idx))
        .map(|s| s.trim())
        .unwrap_or("")
}

fn clean_text(raw: &str, width: usize) -> String {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("nan") {
        return String::new();
    }
    trimmed.chars().take(width).collect()
}

/// Parse a money cell: `$1,234.50`, `(12.00)` for negatives, blank as 0.
///
/// Anything unparsable counts as 0. Rounded to cents.
pub fn parse_money(raw: &str) -> Decimal {
    let mut text: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | ' '))
        .collect();
    if text.is_empty() {
        return Decimal::ZERO;
    }

    let negative = text.starts_with('(') && text.ends_with(')');
    if negative {
        text = text[1..text.len() - 1].to_string();
        if text.is_empty() {
            return Decimal::ZERO;
        }
    }

    let value = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .unwrap_or_else(|_| {
            tracing::debug!(value = raw, "unparsable amount, using 0");
            Decimal::ZERO
        })
        .round_dp(2);

    if negative && !value.is_zero() {
        -value
    } else {
        value
    }
}

/// Normalize a postal code to text as published (`02131`, `02131-1234`).
///
/// Spreadsheets store zips as numbers, which drops leading zeros and may
/// add a `.0`.
pub fn normalize_zip(raw: &str) -> String {
    let mut zip = raw.trim();
    if zip.eq_ignore_ascii_case("nan") {
        return String::new();
    }
    if let Some(stripped) = zip.strip_suffix(".0") {
        if stripped.chars().all(|c| c.is_ascii_digit()) {
            zip = stripped;
        }
    }
    if !zip.is_empty() && zip.len() < 5 && zip.chars().all(|c| c.is_ascii_digit()) {
        return format!("{:0>5}", zip);
    }
    zip.chars().take(ZIP_WIDTH).collect()
}

/// Collapse records sharing a key, keeping the last values at the first
/// position. Returns the records and the number collapsed.
///
/// A single INSERT ... ON CONFLICT cannot touch the same row twice.
pub fn dedupe_keys(records: Vec<EarningsRecord>) -> (Vec<EarningsRecord>, usize) {
    let mut seen: HashMap<RecordKey, usize> = HashMap::with_capacity(records.len());
    let mut out: Vec<EarningsRecord> = Vec::with_capacity(records.len());
    let mut duplicates = 0usize;

    for record in records {
        match seen.get(&record.key()) {
            Some(&idx) => {
                out[idx] = record;
                duplicates += 1;
            }
            None => {
                seen.insert(record.key(), out.len());
                out.push(record);
            }
        }
    }
    (out, duplicates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cents(n: i64) -> Decimal {
        Decimal::new(n, 2)
    }

    const SAMPLE_2022: &str = "\
NAME,DEPARTMENT_NAME,TITLE,REGULAR,RETRO,OTHER,OVERTIME,INJURED,DETAIL,QUINN_EDUCATION,TOTAL_ GROSS,POSTAL
\"Doe,Jane\",Boston Police Department,Police Officer,\"$85,000.00\",,500.00,\"12,345.50\",,\"3,000.00\",\"8,500.00\",\"$109,345.50\",2131
\"Roe,Rick\",Boston Fire Department,Fire Fighter,70000,(250.00),,,,,,69750,02136
,,,,,,,,,,,
";

    #[test]
    fn parses_and_cleans_csv() {
        let report = parse_csv(SAMPLE_2022.as_bytes(), 2022).unwrap();
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.unnamed, 1);
        assert_eq!(report.duplicates, 0);
        assert_eq!(report.total_mismatches, 0);

        let jane = &report.records[0];
        assert_eq!(jane.year, 2022);
        assert_eq!(jane.name, "Doe,Jane");
        assert_eq!(jane.department, "Boston Police Department");
        assert_eq!(jane.regular, cents(8_500_000));
        assert_eq!(jane.retro, Decimal::ZERO);
        assert_eq!(jane.overtime, cents(1_234_550));
        assert_eq!(jane.total_gross, cents(10_934_550));
        assert_eq!(jane.zip_code, "02131");

        let rick = &report.records[1];
        assert_eq!(rick.retro, cents(-25_000));
        assert_eq!(rick.total_gross, cents(6_975_000));
    }

    #[test]
    fn missing_columns_default() {
        let csv = "Name,Department,Title,Total Earnings\nSmith;Al,Library,Librarian,\"52,000\"\n";
        let report = parse_csv(csv.as_bytes(), 2020).unwrap();
        let al = &report.records[0];
        assert_eq!(al.total_gross, cents(5_200_000));
        assert_eq!(al.overtime, Decimal::ZERO);
        assert_eq!(al.zip_code, "");
        // Only a total was published, so the components cannot match it.
        assert_eq!(report.total_mismatches, 1);
    }

    #[test]
    fn latin1_csv() {
        let bytes = b"NAME,TITLE,TOTAL GROSS\nJos\xE9 Pe\xF1a,Clerk,100\n";
        let report = parse_csv(bytes, 2021).unwrap();
        assert_eq!(report.records[0].name, "José Peña");
    }

    #[test]
    fn header_without_name_is_an_error() {
        let err = parse_csv(b"EMPLOYEE,TOTAL\nx,1\n", 2021).unwrap_err();
        assert!(err.to_string().contains("NAME"));
    }

    #[test]
    fn short_rows_are_padded() {
        let report = parse_csv(b"NAME,DEPARTMENT_NAME,TITLE,REGULAR\nLee,Parks\n", 2023).unwrap();
        let lee = &report.records[0];
        assert_eq!(lee.department, "Parks");
        assert_eq!(lee.title, "");
        assert_eq!(lee.regular, Decimal::ZERO);
    }

    #[test]
    fn duplicate_keys_keep_last() {
        let csv = "NAME,DEPARTMENT_NAME,TITLE,TOTAL GROSS\nA,D,T,1\nB,D,T,2\nA,D,T,3\n";
        let report = parse_csv(csv.as_bytes(), 2024).unwrap();
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[0].name, "A");
        assert_eq!(report.records[0].total_gross, Decimal::from(3));
    }

    #[test]
    fn money_formats() {
        assert_eq!(parse_money("$1,234.56"), cents(123_456));
        assert_eq!(parse_money(" (99.10) "), cents(-9_910));
        assert_eq!(parse_money("-5"), Decimal::from(-5));
        assert_eq!(parse_money(""), Decimal::ZERO);
        assert_eq!(parse_money("n/a"), Decimal::ZERO);
        assert_eq!(parse_money("85000.12000000001"), cents(8_500_012));
        assert!(!parse_money("()").is_sign_negative());
        assert!(parse_money("()").is_zero());
        assert!(!parse_money("(0.00)").is_sign_negative());
    }

    #[test]
    fn zip_formats() {
        assert_eq!(normalize_zip("2131"), "02131");
        assert_eq!(normalize_zip("2131.0"), "02131");
        assert_eq!(normalize_zip("02131"), "02131");
        assert_eq!(normalize_zip("02131-1234"), "02131-1234");
        assert_eq!(normalize_zip("nan"), "");
        assert_eq!(normalize_zip(""), "");
    }

    #[test]
    fn spreadsheet_cells_render_like_csv() {
        assert_eq!(cell_text(&Data::Float(2131.0)), "2131");
        assert_eq!(cell_text(&Data::Float(85000.5)), "85000.5");
        assert_eq!(cell_text(&Data::Int(42)), "42");
        assert_eq!(cell_text(&Data::String("Doe,Jane".into())), "Doe,Jane");
        assert_eq!(cell_text(&Data::Empty), "");
    }

    #[test]
    fn long_text_truncated() {
        let long = "x".repeat(300);
        assert_eq!(clean_text(&long, TEXT_WIDTH).len(), TEXT_WIDTH);
    }
}
