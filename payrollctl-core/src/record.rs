//! The single entity of the dataset: one employee's earnings for one year.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PayrollError;

/// Columns written by the loaders and archives, in table order.
pub const RECORD_COLUMNS: [&str; 13] = [
    "year",
    "name",
    "department",
    "title",
    "regular",
    "retro",
    "other",
    "overtime",
    "injured",
    "detail",
    "quinn_education",
    "total_gross",
    "zip_code",
];

/// One earnings component of a payroll record.
///
/// The set is closed: component names double as SQL column names, so only
/// these variants may ever be interpolated into a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EarningsComponent {
    Regular,
    Retro,
    Other,
    Overtime,
    Injured,
    Detail,
    QuinnEducation,
}

impl EarningsComponent {
    pub const ALL: [EarningsComponent; 7] = [
        Self::Regular,
        Self::Retro,
        Self::Other,
        Self::Overtime,
        Self::Injured,
        Self::Detail,
        Self::QuinnEducation,
    ];

    /// Column name in `payroll_earnings`.
    pub fn column(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Retro => "retro",
            Self::Other => "other",
            Self::Overtime => "overtime",
            Self::Injured => "injured",
            Self::Detail => "detail",
            Self::QuinnEducation => "quinn_education",
        }
    }
}

impl fmt::Display for EarningsComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for EarningsComponent {
    type Err = PayrollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.column().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| PayrollError::unknown_component(s))
    }
}

/// Uniqueness key of a record: (year, name, department, title).
pub type RecordKey = (i32, String, String, String);

/// A cleaned earnings record ready for insertion or archiving.
///
/// Text fields are trimmed and use the empty string for "absent" so that the
/// unique key never contains NULL.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct EarningsRecord {
    pub year: i32,
    pub name: String,
    pub department: String,
    pub title: String,
    #[serde(serialize_with = "crate::money::serialize")]
    pub regular: Decimal,
    #[serde(serialize_with = "crate::money::serialize")]
    pub retro: Decimal,
    #[serde(serialize_with = "crate::money::serialize")]
    pub other: Decimal,
    #[serde(serialize_with = "crate::money::serialize")]
    pub overtime: Decimal,
    #[serde(serialize_with = "crate::money::serialize")]
    pub injured: Decimal,
    #[serde(serialize_with = "crate::money::serialize")]
    pub detail: Decimal,
    #[serde(serialize_with = "crate::money::serialize")]
    pub quinn_education: Decimal,
    #[serde(serialize_with = "crate::money::serialize")]
    pub total_gross: Decimal,
    pub zip_code: String,
}

impl EarningsRecord {
    pub fn key(&self) -> RecordKey {
        (
            self.year,
            self.name.clone(),
            self.department.clone(),
            self.title.clone(),
        )
    }

    pub fn component(&self, component: EarningsComponent) -> Decimal {
        match component {
            EarningsComponent::Regular => self.regular,
            EarningsComponent::Retro => self.retro,
            EarningsComponent::Other => self.other,
            EarningsComponent::Overtime => self.overtime,
            EarningsComponent::Injured => self.injured,
            EarningsComponent::Detail => self.detail,
            EarningsComponent::QuinnEducation => self.quinn_education,
        }
    }

    pub fn component_mut(&mut self, component: EarningsComponent) -> &mut Decimal {
        match component {
            EarningsComponent::Regular => &mut self.regular,
            EarningsComponent::Retro => &mut self.retro,
            EarningsComponent::Other => &mut self.other,
            EarningsComponent::Overtime => &mut self.overtime,
            EarningsComponent::Injured => &mut self.injured,
            EarningsComponent::Detail => &mut self.detail,
            EarningsComponent::QuinnEducation => &mut self.quinn_education,
        }
    }

    /// Sum of the seven components. Source files carry their own total, which
    /// is what gets stored; the parser counts records where the two differ.
    pub fn components_sum(&self) -> Decimal {
        EarningsComponent::ALL
            .into_iter()
            .map(|c| self.component(c))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn component_parses_case_insensitively() {
        assert_eq!(
            "Overtime".parse::<EarningsComponent>().unwrap(),
            EarningsComponent::Overtime
        );
        assert_eq!(
            " quinn_education ".parse::<EarningsComponent>().unwrap(),
            EarningsComponent::QuinnEducation
        );
        assert!("total_gross".parse::<EarningsComponent>().is_err());
        assert!("overtime; drop table".parse::<EarningsComponent>().is_err());
    }

    #[test]
    fn columns_follow_record_layout() {
        for component in EarningsComponent::ALL {
            assert!(RECORD_COLUMNS.contains(&component.column()));
        }
    }

    #[test]
    fn component_accessors_agree() {
        let mut record = EarningsRecord {
            year: 2024,
            name: "Doe,Jane".into(),
            ..Default::default()
        };
        *record.component_mut(EarningsComponent::Overtime) = Decimal::new(150_000, 2);
        *record.component_mut(EarningsComponent::Regular) = Decimal::new(5_000_000, 2);

        assert_eq!(record.overtime, Decimal::new(150_000, 2));
        assert_eq!(record.component(EarningsComponent::Regular), Decimal::new(5_000_000, 2));
        assert_eq!(record.components_sum(), Decimal::new(5_150_000, 2));
    }

    #[test]
    fn key_uses_identity_columns() {
        let record = EarningsRecord {
            year: 2023,
            name: "Doe,John".into(),
            department: "Boston Police Department".into(),
            title: "Police Officer".into(),
            ..Default::default()
        };
        assert_eq!(
            record.key(),
            (
                2023,
                "Doe,John".to_string(),
                "Boston Police Department".to_string(),
                "Police Officer".to_string()
            )
        );
    }
}
