//! Money values on the wire: decimal strings with exactly two places
//!
//! `rust_decimal` keeps the scale it was given, so `COALESCE(x, 0)` and empty
//! aggregates would otherwise come out as `"0"`.
//!
//! ```ignore
//! #[serde(serialize_with = "payrollctl_core::money::serialize")]
//! pub total_gross: Decimal,
//! ```

use rust_decimal::Decimal;
use serde::Serializer;

/// Decimal places of every stored amount
pub const SCALE: u32 = 2;

/// `value` with exactly two decimal places (rounded half away from zero).
pub fn to_cents(value: Decimal) -> Decimal {
    let mut scaled = value.round_dp(SCALE);
    scaled.rescale(SCALE);
    if scaled.is_zero() {
        scaled.set_sign_positive(true);
    }
    scaled
}

pub fn serialize<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&to_cents(*value))
}

/// `serialize` for optional amounts; `None` stays null.
pub mod option {
    use rust_decimal::Decimal;
    use serde::Serializer;

    pub fn serialize<S>(value: &Option<Decimal>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => serializer.collect_str(&super::to_cents(*value)),
            None => serializer.serialize_none(),
        }
    }
}
