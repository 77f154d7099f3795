//! Earnings composition: per-component sums and their shares

use std::collections::BTreeMap;

use payrollctl_core::EarningsComponent;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

/// Summed components for one year (and optionally one department)
#[derive(Debug, Clone, Default, PartialEq, Serialize, sqlx::FromRow)]
pub struct ComponentTotals {
    #[serde(serialize_with = "payrollctl_core::money::serialize")]
    pub regular: Decimal,
    #[serde(serialize_with = "payrollctl_core::money::serialize")]
    pub overtime: Decimal,
    #[serde(serialize_with = "payrollctl_core::money::serialize")]
    pub detail: Decimal,
    #[serde(serialize_with = "payrollctl_core::money::serialize")]
    pub retro: Decimal,
    #[serde(serialize_with = "payrollctl_core::money::serialize")]
    pub other: Decimal,
    #[serde(serialize_with = "payrollctl_core::money::serialize")]
    pub injured: Decimal,
    #[serde(serialize_with = "payrollctl_core::money::serialize")]
    pub quinn_education: Decimal,
}

impl ComponentTotals {
    pub fn get(&self, component: EarningsComponent) -> Decimal {
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

    pub fn total(&self) -> Decimal {
        EarningsComponent::ALL.into_iter().map(|c| self.get(c)).sum()
    }
}

/// Percentage of the overall total per component, one decimal place.
///
/// Empty when the total is zero or negative.
pub fn percentages(totals: &ComponentTotals) -> BTreeMap<&'static str, f64> {
    let total = totals.total();
    if total <= Decimal::ZERO {
        return BTreeMap::new();
    }

    EarningsComponent::ALL
        .into_iter()
        .map(|component| {
            let share = (totals.get(component) / total * Decimal::ONE_HUNDRED).round_dp(1);
            (component.column(), share.to_f64().unwrap_or(0.0))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dollars(n: i64) -> Decimal {
        Decimal::new(n * 100, 2)
    }

    #[test]
    fn shares_of_total() {
        let totals = ComponentTotals {
            regular: dollars(750),
            overtime: dollars(200),
            detail: dollars(50),
            ..Default::default()
        };
        let pct = percentages(&totals);

        assert_eq!(pct.len(), 7);
        assert_eq!(pct["regular"], 75.0);
        assert_eq!(pct["overtime"], 20.0);
        assert_eq!(pct["detail"], 5.0);
        assert_eq!(pct["injured"], 0.0);
        let sum: f64 = pct.values().sum();
        assert!((sum - 100.0).abs() < 0.5);
    }

    #[test]
    fn rounds_to_one_decimal() {
        let totals = ComponentTotals {
            regular: dollars(2),
            overtime: dollars(1),
            ..Default::default()
        };
        let pct = percentages(&totals);
        assert_eq!(pct["regular"], 66.7);
        assert_eq!(pct["overtime"], 33.3);
    }

    #[test]
    fn zero_total_has_no_percentages() {
        assert!(percentages(&ComponentTotals::default()).is_empty());
    }

    #[test]
    fn corrections_can_be_negative() {
        let totals = ComponentTotals {
            regular: dollars(1100),
            retro: dollars(-100),
            ..Default::default()
        };
        assert_eq!(totals.total(), dollars(1000));
        let pct = percentages(&totals);
        assert_eq!(pct["regular"], 110.0);
        assert_eq!(pct["retro"], -10.0);
    }
}
