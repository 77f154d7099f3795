//! CSV export endpoint
//!
//! The body is streamed: a spawned task pages through the row stream,
//! encodes chunks of rows and feeds them into a bounded channel that backs
//! the response body. No row limit applies.

use std::io;
use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use futures::channel::mpsc;
use futures::{SinkExt, TryStreamExt};
use sqlx::PgPool;

use crate::db::repos::{Employee, EmployeeRepo};
use crate::http::error::ApiError;
use crate::http::extractors::ApiQuery;
use crate::http::server::AppState;
use crate::models::{EmployeeFilter, EmployeeParams, Sort};

/// Rows encoded per body chunk
const CHUNK_ROWS: usize = 500;

/// Encoded chunks buffered ahead of a slow client
const CHANNEL_DEPTH: usize = 4;

type Chunk = Result<Bytes, io::Error>;

/// Encode rows as CSV, with the header line when `with_header` is set.
pub fn encode_chunk(rows: &[Employee], with_header: bool) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(with_header)
        .from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

pub fn export_filename(year: i32) -> String {
    format!("boston_payroll_{}.csv", year)
}

/// GET /api/export - every matching row, sorted by name
async fn export_employees(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<EmployeeParams>,
) -> Result<Response, ApiError> {
    let (filter, _, _) = params.into_parts()?;

    // A failing database should surface as a 500, not a truncated body.
    let total = EmployeeRepo::new(&state.pool)
        .count(&filter)
        .await
        .map_err(ApiError::export)?;
    tracing::info!(year = filter.year, rows = total, "starting CSV export");

    let (tx, rx) = mpsc::channel::<Chunk>(CHANNEL_DEPTH);
    let disposition = format!("attachment; filename={}", export_filename(filter.year));
    tokio::spawn(stream_rows(state.pool.clone(), filter, CHUNK_ROWS, tx));

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(rx),
    )
        .into_response())
}

async fn stream_rows(
    pool: PgPool,
    filter: EmployeeFilter,
    chunk_rows: usize,
    mut tx: mpsc::Sender<Chunk>,
) {
    let mut rows = EmployeeRepo::new(&pool).stream(&filter, Sort::by_name());

    let mut pending: Vec<Employee> = Vec::with_capacity(chunk_rows);
    let mut exported = 0usize;

    loop {
        match rows.try_next().await {
            Ok(Some(row)) => {
                pending.push(row);
                if pending.len() < chunk_rows {
                    continue;
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, exported, "export stream failed");
                let _ = tx.send(Err(io::Error::other(e))).await;
                return;
            }
        }
        if !send_chunk(&mut tx, &mut pending, &mut exported).await {
            return;
        }
    }

    if !pending.is_empty() && !send_chunk(&mut tx, &mut pending, &mut exported).await {
        return;
    }
    tracing::info!(year = filter.year, exported, "CSV export complete");
}

/// Encode and send `pending`; false when the export should stop.
async fn send_chunk(
    tx: &mut mpsc::Sender<Chunk>,
    pending: &mut Vec<Employee>,
    exported: &mut usize,
) -> bool {
    let chunk = match encode_chunk(pending, *exported == 0) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = %e, exported = *exported, "export encoding failed");
            let _ = tx.send(Err(io::Error::other(e))).await;
            return false;
        }
    };
    *exported += pending.len();
    pending.clear();

    if tx.send(Ok(Bytes::from(chunk))).await.is_err() {
        tracing::debug!(exported = *exported, "export client went away");
        return false;
    }
    true
}

/// Export routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/export", get(export_employees))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn employee(name: &str) -> Employee {
        Employee {
            id: 1,
            year: 2023,
            name: name.into(),
            department: Some("Boston Police Department".into()),
            title: None,
            regular: Decimal::new(8_500_000, 2),
            retro: Decimal::ZERO,
            other: Decimal::ZERO,
            overtime: Decimal::new(1_234_550, 2),
            injured: Decimal::ZERO,
            detail: Decimal::ZERO,
            quinn_education: Decimal::ZERO,
            total_gross: Decimal::new(9_734_550, 2),
            zip_code: Some("02131".into()),
        }
    }

    #[test]
    fn first_chunk_carries_header() {
        let bytes = encode_chunk(&[employee("Doe,Jane")], true).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,year,name,department,title,regular,retro,other,overtime,injured,detail,quinn_education,total_gross,zip_code"
        );
        assert_eq!(
            lines.next().unwrap(),
            "1,2023,\"Doe,Jane\",Boston Police Department,,85000.00,0.00,0.00,12345.50,0.00,0.00,0.00,97345.50,02131"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn later_chunks_have_no_header() {
        let bytes = encode_chunk(&[employee("Smith,John")], false).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("1,2023,"));
    }

    #[test]
    fn no_rows_no_bytes() {
        assert!(encode_chunk(&[], true).unwrap().is_empty());
    }

    #[test]
    fn filename_carries_year() {
        assert_eq!(export_filename(2022), "boston_payroll_2022.csv");
    }

    async fn collect_export(pool: &PgPool, year: i32, chunk_rows: usize) -> String {
        let (tx, rx) = mpsc::channel::<Chunk>(CHANNEL_DEPTH);
        tokio::spawn(stream_rows(pool.clone(), EmployeeFilter::year(year), chunk_rows, tx));

        let chunks: Vec<Bytes> = rx.try_collect().await.expect("export stream");
        let mut body = Vec::new();
        for chunk in chunks {
            body.extend_from_slice(&chunk);
        }
        String::from_utf8(body).expect("utf-8 body")
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn streamed_export_matches_listing_order() {
        const YEAR: i32 = 1941;
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = crate::create_pool(&url).await.expect("pool");
        crate::create_schema(&pool).await.expect("schema");

        let cleanup = || async {
            sqlx::query("DELETE FROM payroll_earnings WHERE year = $1")
                .bind(YEAR)
                .execute(&pool)
                .await
                .expect("cleanup");
        };
        cleanup().await;
        for name in ["Echo,Eve", "Alpha,Ann", "Delta,Dan", "Charlie,Cy", "Bravo,Bob"] {
            sqlx::query(
                "INSERT INTO payroll_earnings (year, name, department, title, regular, total_gross)
                 VALUES ($1, $2, 'Fire', 'Firefighter', 1000, 1000)",
            )
            .bind(YEAR)
            .bind(name)
            .execute(&pool)
            .await
            .expect("seed");
        }

        // Five rows in chunks of two: three chunks, one header.
        let body = collect_export(&pool, YEAR, 2).await;
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("id,year,name,"));
        assert_eq!(lines.iter().filter(|l| l.starts_with("id,")).count(), 1);

        let mut reader = csv::Reader::from_reader(body.as_bytes());
        let exported: Vec<String> = reader
            .records()
            .map(|r| r.expect("csv row")[2].to_string())
            .collect();

        let (listed, total) = EmployeeRepo::new(&pool)
            .list(&EmployeeFilter::year(YEAR), Sort::by_name(), crate::models::Page::new(100, 0))
            .await
            .expect("listing");
        let listed: Vec<String> = listed.into_iter().map(|e| e.name).collect();
        assert_eq!(total, 5);
        assert_eq!(exported, listed);
        assert_eq!(exported[0], "Alpha,Ann");
        assert!(lines[1].contains(",1000.00,0.00,"));

        // No matching rows: no header either.
        assert!(collect_export(&pool, 1849, 2).await.is_empty());

        cleanup().await;
    }
}
