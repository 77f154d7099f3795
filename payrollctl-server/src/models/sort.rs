//! Sort allowlist for the employee listing
//!
//! ORDER BY cannot be parameterized, so only these columns ever reach SQL.
//! Unknown input falls back to the defaults instead of failing the request.

/// Sortable columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    Name,
    Department,
    Title,
    #[default]
    TotalGross,
    Overtime,
    Regular,
}

impl SortColumn {
    const ALL: [SortColumn; 6] = [
        Self::Name,
        Self::Department,
        Self::Title,
        Self::TotalGross,
        Self::Overtime,
        Self::Regular,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Department => "department",
            Self::Title => "title",
            Self::TotalGross => "total_gross",
            Self::Overtime => "overtime",
            Self::Regular => "regular",
        }
    }

    /// Parse a column name, falling back to `total_gross`.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        let Some(value) = value.map(str::trim) else {
            return Self::default();
        };
        Self::ALL
            .into_iter()
            .find(|c| c.column().eq_ignore_ascii_case(value))
            .unwrap_or_else(|| {
                tracing::debug!(sort_by = value, "unknown sort column, using default");
                Self::default()
            })
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// Parse `asc`/`desc`, falling back to `desc`.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("asc") => Self::Asc,
            Some("desc") | None => Self::Desc,
            Some(other) => {
                tracing::debug!(sort_order = other, "unknown sort order, using default");
                Self::Desc
            }
        }
    }
}

/// Column plus direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sort {
    pub column: SortColumn,
    pub order: SortOrder,
}

impl Sort {
    pub fn new(column: SortColumn, order: SortOrder) -> Self {
        Self { column, order }
    }

    /// Alphabetical by name, as used by the CSV export.
    pub fn by_name() -> Self {
        Self::new(SortColumn::Name, SortOrder::Asc)
    }
}
