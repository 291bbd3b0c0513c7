use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::attribute::AttributeMap;
use crate::confidence::Confidence;

/// A Normalized Resource Graph node: one declared (or, after enrichment,
/// implicit/derived) resource instance, keyed by the full indexed address.
///
/// `dependencies` is preserved exactly as declared, cycles included — a
/// cycle is never broken and never blocks stage progression; downstream
/// consumers treat it as informational only.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct NrgNode {
    pub resource_id: String,
    pub address: String,
    pub resource_type: String,
    pub provider: String,
    pub region: Option<String>,
    pub attributes: AttributeMap,
    pub unknown_attributes: Vec<String>,
    pub quantity: u32,
    pub module_path: Vec<String>,
    pub dependencies: Vec<String>,
    pub confidence: Confidence,
}

impl NrgNode {
    /// HIGH when known/(known+unknown) >= 0.9, MEDIUM >= 0.5, else LOW. A
    /// node with no attributes at all and no unknowns is HIGH (nothing to
    /// be unsure about).
    pub fn confidence_from_counts(known: usize, unknown: usize) -> Confidence {
        let total = known + unknown;
        if total == 0 {
            return Confidence::High;
        }
        let ratio = known as f64 / total as f64;
        if ratio >= 0.9 {
            Confidence::High
        } else if ratio >= 0.5 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

/// Aggregate metadata produced alongside an NRG by the plan interpreter.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct InterpretationMetadata {
    pub plan_hash: String,
    pub total_resources: usize,
    pub by_type: BTreeMap<String, usize>,
    pub unknown_count: usize,
    pub max_module_depth: usize,
    #[ts(as = "String")]
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct NormalizedResourceGraph {
    pub nodes: Vec<NrgNode>,
    pub metadata: InterpretationMetadata,
    /// Dependencies referencing an address that did not resolve to any
    /// node, recorded rather than treated as a failure.
    pub unresolved_dependencies: Vec<UnresolvedDependency>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct UnresolvedDependency {
    pub from_resource_id: String,
    pub unresolved_address: String,
}

/// How an ERG node came to exist.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema, TS,
)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Provenance {
    /// Present in the planned-change document.
    Declared,
    /// Synthesized by an adapter for a billable sub-resource never
    /// declared directly (a root volume, an implicit network interface).
    Implicit,
    /// Computed from other enriched attributes rather than looked up or
    /// declared outright.
    Derived,
}

/// An Enriched Resource Graph node: an `NrgNode` plus provider-derived
/// attributes. Implicit nodes always carry `parent_resource_id` pointing at
/// a `DECLARED` node — enforced by the metadata resolver that builds these,
/// not by this type.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct ErgNode {
    #[serde(flatten)]
    pub nrg: NrgNode,
    pub enriched_attributes: AttributeMap,
    pub provenance: Provenance,
    pub parent_resource_id: Option<String>,
    pub aws_account_id: Option<String>,
    pub availability_zone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct EnrichmentMetadata {
    pub total: usize,
    pub declared: usize,
    pub implicit: usize,
    pub enriched_count: usize,
    pub failed_count: usize,
    pub cache_hit_rate: f64,
    pub api_calls: usize,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct EnrichedResourceGraph {
    pub nodes: Vec<ErgNode>,
    pub metadata: EnrichmentMetadata,
}

/// A `(min, expected, max)` triple in a shared unit, with monotonicity
/// (`max >= expected >= min`) enforced by `normalized()` rather than by
/// construction, since callers legitimately build scenarios out of order
/// (e.g. usage profile YAML) and must be able to detect the violation to
/// log a warning before repairing it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct Scenario {
    #[schema(value_type = String)]
    #[ts(type = "string")]
    pub min: Decimal,
    #[schema(value_type = String)]
    #[ts(type = "string")]
    pub expected: Decimal,
    #[schema(value_type = String)]
    #[ts(type = "string")]
    pub max: Decimal,
}

impl Scenario {
    pub fn new(min: Decimal, expected: Decimal, max: Decimal) -> Self {
        Self { min, expected, max }
    }

    pub fn deterministic(value: Decimal) -> Self {
        Self {
            min: value,
            expected: value,
            max: value,
        }
    }

    pub fn is_monotonic(&self) -> bool {
        self.max >= self.expected && self.expected >= self.min
    }

    pub fn is_deterministic(&self) -> bool {
        self.min == self.expected && self.expected == self.max
    }

    /// Sort the three values ascending and reassign as `(min, expected,
    /// max)`, the documented repair for a monotonicity violation.
    pub fn normalized(&self) -> Self {
        if self.is_monotonic() {
            return *self;
        }
        let mut values = [self.min, self.expected, self.max];
        values.sort();
        Self {
            min: values[0],
            expected: values[1],
            max: values[2],
        }
    }

    pub fn componentwise_add(&self, other: &Scenario) -> Scenario {
        Scenario {
            min: self.min + other.min,
            expected: self.expected + other.expected,
            max: self.max + other.max,
        }
    }

    pub fn zero() -> Self {
        Self::deterministic(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct UsageAnnotation {
    pub resource_id: String,
    pub unit: Option<String>,
    pub scenario: Scenario,
    pub assumption: Option<String>,
    pub overrides_applied: Vec<String>,
    pub confidence: Confidence,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct UsageAnnotatedResourceGraph {
    pub nodes: Vec<ErgNode>,
    pub annotations: Vec<UsageAnnotation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, TS)]
#[serde(rename_all = "lowercase")]
pub enum OverrideTier {
    Resource,
    Service,
    Global,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct UsageOverride {
    pub tier: OverrideTier,
    pub resource_id: Option<String>,
    pub service: Option<String>,
    pub resource_type: Option<String>,
    #[schema(value_type = String)]
    #[ts(type = "string")]
    pub value: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn monotonic_scenario_is_unchanged_by_normalize() {
        let s = Scenario::new(dec!(1), dec!(2), dec!(3));
        assert_eq!(s.normalized(), s);
    }

    #[test]
    fn out_of_order_scenario_is_sorted() {
        let s = Scenario::new(dec!(5), dec!(1), dec!(3));
        let fixed = s.normalized();
        assert_eq!(fixed, Scenario::new(dec!(1), dec!(3), dec!(5)));
        assert!(fixed.is_monotonic());
    }

    #[test]
    fn deterministic_scenario_has_equal_components() {
        let s = Scenario::deterministic(dec!(42));
        assert!(s.is_deterministic());
    }

    #[test]
    fn componentwise_add_sums_each_position() {
        let a = Scenario::new(dec!(1), dec!(2), dec!(3));
        let b = Scenario::new(dec!(10), dec!(20), dec!(30));
        assert_eq!(a.componentwise_add(&b), Scenario::new(dec!(11), dec!(22), dec!(33)));
    }

    #[test]
    fn confidence_from_counts_thresholds() {
        assert_eq!(NrgNode::confidence_from_counts(9, 1), Confidence::High);
        assert_eq!(NrgNode::confidence_from_counts(5, 5), Confidence::Medium);
        assert_eq!(NrgNode::confidence_from_counts(1, 9), Confidence::Low);
    }
}
