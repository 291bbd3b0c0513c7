//! Unit alias table and compatibility check, grounded on
//! `cost-aggregation-engine/app/calculation/cost_calculator.py`'s
//! `validate_unit_compatibility` canonical-category table, generalized to
//! the full `Unit` enumeration of spec §3 (`HOUR`, `GB_MONTH`, `GB`,
//! `REQUEST`, `LCU_HOUR`, `CONNECTION_HOUR`).

/// Normalizes a unit string for comparison: lowercased, dashes and
/// underscores stripped.
fn fold(unit: &str) -> String {
    unit.to_lowercase().replace(['-', '_', ' '], "")
}

/// The canonical category a folded unit string belongs to, or `None` if it
/// matches no known alias (an unrecognized unit is never "compatible" with
/// anything but itself).
fn category(folded: &str) -> Option<&'static str> {
    const TABLE: &[(&str, &[&str])] = &[
        ("hour", &["hour", "hours", "hrs", "hr", "h"]),
        ("gbmonth", &["gbmonth", "gbmo"]),
        ("gb", &["gb", "gigabyte", "gigabytes"]),
        ("request", &["request", "requests", "req"]),
        ("lcuhour", &["lcuhour", "lcuhr"]),
        ("connectionhour", &["connectionhour", "connhr"]),
    ];
    TABLE
        .iter()
        .find(|(_, variants)| variants.contains(&folded))
        .map(|(canonical, _)| *canonical)
}

/// True when `usage_unit` and `pricing_unit` denote the same billing
/// dimension once normalized (`hours` ~ `Hrs` ~ `Hour`). A mismatch is not
/// fatal to the caller — per spec §4.8 step 2 it logs a warning and
/// proceeds with the raw multiplication regardless.
pub fn compatible(usage_unit: &str, pricing_unit: &str) -> bool {
    let usage_folded = fold(usage_unit);
    let pricing_folded = fold(pricing_unit);
    if usage_folded == pricing_folded {
        return true;
    }
    match (category(&usage_folded), category(&pricing_folded)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hour_aliases_are_compatible() {
        assert!(compatible("hours", "Hrs"));
        assert!(compatible("Hour", "h"));
        assert!(compatible("HOURS", "hour"));
    }

    #[test]
    fn gb_month_aliases_are_compatible() {
        assert!(compatible("gb-month", "GB_Month"));
        assert!(compatible("GBMo", "gb_month"));
    }

    #[test]
    fn unrelated_units_are_incompatible() {
        assert!(!compatible("hours", "GB-Month"));
        assert!(!compatible("request", "lcu-hour"));
    }

    #[test]
    fn unrecognized_units_are_incompatible_unless_identical() {
        assert!(compatible("widgets", "widgets"));
        assert!(!compatible("widgets", "widget"));
    }
}
