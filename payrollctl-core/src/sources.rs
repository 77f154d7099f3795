//! Where the yearly source files come from.
//!
//! The city publishes one resource per year under a single dataset; the year
//! bounds accepted by the API follow the years listed here.

use crate::error::{PayrollError, Result};

/// Dataset that holds every yearly earnings report.
pub const DATASET_ID: &str = "418983dc-7cae-42bb-88e4-d56f5adcf869";

/// Default open-data portal.
pub const DEFAULT_BASE_URL: &str = "https://data.boston.gov";

/// Resource id per year, newest first.
pub const RESOURCE_IDS: [(i32, &str); 6] = [
    (2025, "ca45bfb5-7bc2-4756-a862-77014547faf8"),
    (2024, "579a4be3-9ca7-4183-bc95-7d67ee715b6d"),
    (2023, "6b3c5333-1dcb-4b3d-9cd7-6a03fb526da7"),
    (2022, "63ac638b-36c4-487d-9453-1d83eb5090d2"),
    (2021, "ec5aaf93-1509-4641-9310-28e62e028457"),
    (2020, "e2e2c23a-6fc7-4456-8751-5321d8aa869b"),
];

pub const MIN_YEAR: i32 = 2020;
pub const MAX_YEAR: i32 = 2025;
pub const DEFAULT_YEAR: i32 = 2025;

/// Resource id for `year`.
pub fn resource_id(year: i32) -> Result<&'static str> {
    RESOURCE_IDS
        .iter()
        .find(|(y, _)| *y == year)
        .map(|(_, id)| *id)
        .ok_or(PayrollError::UnknownYear { year })
}

/// Every year with a known resource, ascending.
pub fn years() -> Vec<i32> {
    let mut years: Vec<i32> = RESOURCE_IDS.iter().map(|(y, _)| *y).collect();
    years.sort_unstable();
    years
}

/// Download URL of one resource.
pub fn download_url(base_url: &str, resource_id: &str) -> String {
    format!(
        "{}/dataset/{}/resource/{}/download",
        base_url.trim_end_matches('/'),
        DATASET_ID,
        resource_id
    )
}

/// True when `year` is servable by the API.
pub fn year_in_range(year: i32) -> bool {
    (MIN_YEAR..=MAX_YEAR).contains(&year)
}
