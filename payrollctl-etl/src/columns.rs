//! Header mapping across the yearly file layouts
//!
//! Every year's export spells its headers a little differently
//! (`TOTAL GROSS`, `TOTAL_ GROSS`, `TOTAL EARNINGS`, ...). Headers are
//! normalized first, then looked up in one table.

use payrollctl_core::EarningsComponent;

/// Target field of a source column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Name,
    Department,
    Title,
    Component(EarningsComponent),
    TotalGross,
    ZipCode,
}

/// Normalized spelling -> field
const KNOWN_HEADERS: &[(&str, Column)] = &[
    ("NAME", Column::Name),
    ("DEPARTMENT_NAME", Column::Department),
    ("DEPARTMENT", Column::Department),
    ("TITLE", Column::Title),
    ("REGULAR", Column::Component(EarningsComponent::Regular)),
    ("RETRO", Column::Component(EarningsComponent::Retro)),
    ("OTHER", Column::Component(EarningsComponent::Other)),
    ("OVERTIME", Column::Component(EarningsComponent::Overtime)),
    ("INJURED", Column::Component(EarningsComponent::Injured)),
    ("DETAIL", Column::Component(EarningsComponent::Detail)),
    ("QUINN", Column::Component(EarningsComponent::QuinnEducation)),
    ("QUINN_EDUCATION", Column::Component(EarningsComponent::QuinnEducation)),
    ("QUINN_EDUCATION_INCENTIVE", Column::Component(EarningsComponent::QuinnEducation)),
    ("TOTAL_GROSS", Column::TotalGross),
    ("TOTAL_EARNINGS", Column::TotalGross),
    ("POSTAL", Column::ZipCode),
    ("ZIP", Column::ZipCode),
    ("ZIP_CODE", Column::ZipCode),
];

/// Trim, upper-case, and collapse each run of non-alphanumerics into `_`.
pub fn normalize_header(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;
    for ch in raw.trim().trim_start_matches('\u{feff}').chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(ch.to_ascii_uppercase());
        } else {
            pending_sep = true;
        }
    }
    out
}

pub fn map_header(raw: &str) -> Option<Column> {
    let normalized = normalize_header(raw);
    KNOWN_HEADERS
        .iter()
        .find(|(spelling, _)| *spelling == normalized)
        .map(|(_, column)| *column)
}

/// Positions of the known columns in one file's header row
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    positions: Vec<(Column, usize)>,
    unmapped: Vec<String>,
}

impl ColumnMap {
    /// Map a header row. The first occurrence of a field wins.
    pub fn from_headers<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = Self::default();
        for (idx, header) in headers.into_iter().enumerate() {
            let header = header.as_ref();
            match map_header(header) {
                Some(column) if map.position(column).is_none() => {
                    map.positions.push((column, idx));
                }
                Some(_) => {}
                None if !header.trim().is_empty() => map.unmapped.push(header.trim().to_string()),
                None => {}
            }
        }
        map
    }

    pub fn position(&self, column: Column) -> Option<usize> {
        self.positions
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, idx)| *idx)
    }

    /// Headers that matched no known field
    pub fn unmapped(&self) -> &[String] {
        &self.unmapped
    }

    /// Fields absent from the file, by column name
    pub fn missing(&self) -> Vec<&'static str> {
        let mut wanted = vec![
            (Column::Name, "name"),
            (Column::Department, "department"),
            (Column::Title, "title"),
        ];
        wanted.extend(
            EarningsComponent::ALL
                .into_iter()
                .map(|c| (Column::Component(c), c.column())),
        );
        wanted.push((Column::TotalGross, "total_gross"));
        wanted.push((Column::ZipCode, "zip_code"));

        wanted
            .into_iter()
            .filter(|(column, _)| self.position(*column).is_none())
            .map(|(_, name)| name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_spacing_and_case() {
        assert_eq!(normalize_header("  Total Gross "), "TOTAL_GROSS");
        assert_eq!(normalize_header("TOTAL_ GROSS"), "TOTAL_GROSS");
        assert_eq!(normalize_header("QUINN / EDUCATION INCENTIVE"), "QUINN_EDUCATION_INCENTIVE");
        assert_eq!(normalize_header("\u{feff}NAME"), "NAME");
        assert_eq!(normalize_header("Department Name"), "DEPARTMENT_NAME");
    }

    #[test]
    fn maps_every_historical_spelling() {
        for header in ["TOTAL GROSS", "TOTAL_GROSS", "TOTAL_ GROSS", "TOTAL EARNINGS", "Total Gross"] {
            assert_eq!(map_header(header), Some(Column::TotalGross), "{header}");
        }
        for header in [
            "QUINN_EDUCATION",
            "QUINN / EDUCATION INCENTIVE",
            "QUINN_EDUCATION_INCENTIVE",
            "QUINN/EDUCATION INCENTIVE",
            "Quinn",
        ] {
            assert_eq!(
                map_header(header),
                Some(Column::Component(EarningsComponent::QuinnEducation)),
                "{header}"
            );
        }
        for header in ["POSTAL", "Zip", "ZIP"] {
            assert_eq!(map_header(header), Some(Column::ZipCode), "{header}");
        }
        assert_eq!(map_header("DEPARTMENT_NAME"), Some(Column::Department));
        assert_eq!(map_header("EMPLOYEE ID"), None);
    }

    #[test]
    fn column_map_positions_and_gaps() {
        let map = ColumnMap::from_headers([
            "NAME",
            "DEPARTMENT_NAME",
            "TITLE",
            "REGULAR",
            "OVERTIME",
            "TOTAL EARNINGS",
            "POSTAL",
            "EMPLOYEE ID",
        ]);
        assert_eq!(map.position(Column::Name), Some(0));
        assert_eq!(map.position(Column::TotalGross), Some(5));
        assert_eq!(map.unmapped(), ["EMPLOYEE ID"]);

        let missing = map.missing();
        assert!(missing.contains(&"retro"));
        assert!(missing.contains(&"quinn_education"));
        assert!(!missing.contains(&"overtime"));
    }

    #[test]
    fn first_duplicate_header_wins() {
        let map = ColumnMap::from_headers(["NAME", "DEPARTMENT", "DEPARTMENT_NAME"]);
        assert_eq!(map.position(Column::Department), Some(1));
    }
}
