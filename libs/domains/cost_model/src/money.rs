use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use ts_rs::TS;
use utoipa::ToSchema;

/// Currency code. Carried over from `domain_pricing::models::Currency` rather
/// than redeclared, because both crates need to agree on the set of
/// supported currencies when a `ResourceCost` is built from a `PriceRecord`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
    TS,
)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
}

/// Exact decimal money value.
///
/// Float arithmetic is forbidden anywhere cost is computed or compared.
/// `domain_pricing::models::Money` (integer cents + `decimal_places`) cannot
/// represent configurable decimal precision once a resolved price has more
/// than two fractional digits (many AWS SKUs price per-request at five or
/// six decimal places), so this type uses `rust_decimal::Decimal` directly
/// and rounds to the configured precision only at presentation time. This is
/// the one deliberate deviation from the teacher's `Money` type — see
/// DESIGN.md.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Money {
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub currency: Currency,
}

impl Money {
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    /// Round to `precision` fractional digits using the configured rounding
    /// strategy (banker's rounding, `rust_decimal`'s default), for display
    /// and for the policy gate's threshold comparisons.
    pub fn rounded(&self, precision: u32) -> Decimal {
        self.amount.round_dp(precision)
    }

    /// Componentwise add, returning `None` on currency mismatch so the
    /// aggregation step in the cost engine can surface a clear error instead
    /// of silently summing unlike currencies.
    pub fn checked_add(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        Some(Money::new(self.amount + other.amount, self.currency))
    }
}

impl PartialOrd for Money {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.currency != other.currency {
            return None;
        }
        self.amount.partial_cmp(&other.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn checked_add_rejects_currency_mismatch() {
        let usd = Money::new(dec!(1.00), Currency::Usd);
        let eur = Money::new(dec!(1.00), Currency::Eur);
        assert!(usd.checked_add(&eur).is_none());
    }

    #[test]
    fn checked_add_sums_same_currency() {
        let a = Money::new(dec!(1.50), Currency::Usd);
        let b = Money::new(dec!(2.25), Currency::Usd);
        let sum = a.checked_add(&b).unwrap();
        assert_eq!(sum.amount, dec!(3.75));
    }
}
