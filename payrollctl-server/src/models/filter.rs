//! Request filters and the query-string shapes they are built from

use payrollctl_core::sources::{year_in_range, DEFAULT_YEAR, MAX_YEAR, MIN_YEAR};
use payrollctl_core::EarningsComponent;
use serde::Deserialize;

use super::pagination::Page;
use super::sort::{Sort, SortColumn, SortOrder};
use super::validation::ValidationError;

/// Matches the width of the `department` column
const MAX_DEPARTMENT_LEN: usize = 255;

/// Longest accepted search string
const MAX_SEARCH_LEN: usize = 255;

/// Which rows of the table a request looks at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeFilter {
    pub year: i32,
    pub department: Option<String>,
    /// Substring matched against name and title
    pub search: Option<String>,
    /// Only rows where this component is positive
    pub earnings_type: Option<EarningsComponent>,
}

impl EmployeeFilter {
    /// Filter on a single year with no other constraints.
    pub fn year(year: i32) -> Self {
        Self {
            year,
            department: None,
            search: None,
            earnings_type: None,
        }
    }

    pub fn with_department(mut self, department: Option<String>) -> Self {
        self.department = department;
        self
    }
}

/// Validate the year, defaulting to the newest year.
pub fn validate_year(year: Option<i32>) -> Result<i32, ValidationError> {
    let year = year.unwrap_or(DEFAULT_YEAR);
    if !year_in_range(year) {
        return Err(ValidationError::YearOutOfRange {
            year,
            min: MIN_YEAR,
            max: MAX_YEAR,
        });
    }
    Ok(year)
}

/// Trim optional text; empty means "no filter".
fn non_empty(
    value: Option<String>,
    field: &'static str,
    max: usize,
) -> Result<Option<String>, ValidationError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(Some(trimmed.to_string()))
}

/// Parse an earnings type, ignoring unknown values.
fn earnings_type(value: Option<&str>) -> Option<EarningsComponent> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;
    match value.parse() {
        Ok(component) => Some(component),
        Err(err) => {
            tracing::debug!(error = %err, "ignoring earnings_type filter");
            None
        }
    }
}

/// Query parameters for GET /api/employees and GET /api/export
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeeParams {
    pub year: Option<i32>,
    pub department: Option<String>,
    pub search: Option<String>,
    pub earnings_type: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl EmployeeParams {
    /// Validate filters; coerce sort and pagination to safe values.
    pub fn into_parts(self) -> Result<(EmployeeFilter, Sort, Page), ValidationError> {
        let sort = Sort::new(
            SortColumn::parse_or_default(self.sort_by.as_deref()),
            SortOrder::parse_or_default(self.sort_order.as_deref()),
        );
        let page = Page::from_params(self.limit, self.offset);
        let filter = EmployeeFilter {
            year: validate_year(self.year)?,
            department: non_empty(self.department, "department", MAX_DEPARTMENT_LEN)?,
            search: non_empty(self.search, "search", MAX_SEARCH_LEN)?,
            earnings_type: earnings_type(self.earnings_type.as_deref()),
        };
        Ok((filter, sort, page))
    }
}

/// Query parameters for the year/department scoped aggregates
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScopeParams {
    pub year: Option<i32>,
    pub department: Option<String>,
}

impl ScopeParams {
    pub fn into_filter(self) -> Result<EmployeeFilter, ValidationError> {
        let year = validate_year(self.year)?;
        let department = non_empty(self.department, "department", MAX_DEPARTMENT_LEN)?;
        Ok(EmployeeFilter::year(year).with_department(department))
    }
}
