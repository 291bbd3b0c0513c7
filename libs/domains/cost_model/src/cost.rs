use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use strum::{Display, EnumString};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::confidence::Confidence;
use crate::graph::Scenario;
use crate::money::Currency;

/// A scenario plus its derived spread metrics, shared by `ResourceCost` and
/// `AggregatedCost`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct ScenarioDiff {
    #[schema(value_type = String)]
    #[ts(type = "string")]
    pub expected_minus_min: Decimal,
    #[schema(value_type = String)]
    #[ts(type = "string")]
    pub max_minus_expected: Decimal,
    #[schema(value_type = String)]
    #[ts(type = "string")]
    pub max_minus_min: Decimal,
    /// `(expected - min) / min * 100`, `None` when `min` is zero.
    #[schema(value_type = Option<String>)]
    #[ts(type = "string | null")]
    pub expected_minus_min_pct: Option<Decimal>,
    /// `(max - expected) / expected * 100`, `None` when `expected` is zero.
    #[schema(value_type = Option<String>)]
    #[ts(type = "string | null")]
    pub max_minus_expected_pct: Option<Decimal>,
    /// `(max - min) / expected`, `None` when `expected` is zero.
    #[schema(value_type = Option<String>)]
    #[ts(type = "string | null")]
    pub max_minus_min_ratio: Option<Decimal>,
}

impl ScenarioDiff {
    pub fn from_scenario(scenario: &Scenario) -> Self {
        let expected_minus_min = scenario.expected - scenario.min;
        let max_minus_expected = scenario.max - scenario.expected;
        let max_minus_min = scenario.max - scenario.min;
        let hundred = Decimal::from(100);
        Self {
            expected_minus_min,
            max_minus_expected,
            max_minus_min,
            expected_minus_min_pct: if scenario.min.is_zero() {
                None
            } else {
                Some(expected_minus_min / scenario.min * hundred)
            },
            max_minus_expected_pct: if scenario.expected.is_zero() {
                None
            } else {
                Some(max_minus_expected / scenario.expected * hundred)
            },
            max_minus_min_ratio: if scenario.expected.is_zero() {
                None
            } else {
                Some(max_minus_min / scenario.expected)
            },
        }
    }
}

/// One usage dimension's contribution to a resource's cost, carried for
/// traceability (`cost_s = usage_s * unit_price`, per scenario member).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct CostDimension {
    pub dimension: String,
    pub unit: String,
    pub sku: String,
    #[schema(value_type = String)]
    #[ts(type = "string")]
    pub unit_price: Decimal,
    pub scenario: Scenario,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct ResourceCost {
    pub resource_id: String,
    pub dimensions: Vec<CostDimension>,
    pub scenario: Scenario,
    pub currency: Currency,
    pub diff: ScenarioDiff,
    pub confidence: Confidence,
    /// Which upstream stages contributed a sub-HIGH confidence, for
    /// diagnosing why a resource's overall confidence is not HIGH.
    pub confidence_sources: Vec<String>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema, TS,
)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GroupBy {
    Service,
    Region,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct AggregatedCost {
    pub group_by: GroupBy,
    pub group_value: String,
    pub scenario: Scenario,
    pub currency: Currency,
    pub diff: ScenarioDiff,
    pub resource_count: usize,
    pub confidence: Confidence,
}

impl AggregatedCost {
    /// Sum member resource scenarios componentwise and take the minimum
    /// confidence across members — the two aggregation invariants.
    pub fn aggregate<'a>(
        group_by: GroupBy,
        group_value: String,
        currency: Currency,
        members: impl IntoIterator<Item = &'a ResourceCost>,
    ) -> Self {
        let mut scenario = Scenario::zero();
        let mut confidences = Vec::new();
        let mut resource_count = 0usize;
        for member in members {
            scenario = scenario.componentwise_add(&member.scenario);
            confidences.push(member.confidence);
            resource_count += 1;
        }
        Self {
            group_by,
            group_value,
            diff: ScenarioDiff::from_scenario(&scenario),
            scenario,
            currency,
            resource_count,
            confidence: Confidence::min_of(confidences),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct TotalCost {
    pub scenario: Scenario,
    pub currency: Currency,
    pub diff: ScenarioDiff,
}

/// The Final Cost Model produced by the cost engine.
///
/// `determinism_hash` is a SHA-256 over the canonical JSON of
/// `sorted_by_resource_id[{resource_id, min, expected, max}]`, truncated to
/// 16 hex characters; it must be byte-identical across two independent runs
/// over identical input.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct Fcm {
    pub resource_costs: Vec<ResourceCost>,
    pub aggregated_by_service: Vec<AggregatedCost>,
    pub aggregated_by_region: Vec<AggregatedCost>,
    pub total: TotalCost,
    pub overall_confidence: Confidence,
    pub determinism_hash: String,
}

impl Fcm {
    /// Computes the stable hash described on [`Fcm::determinism_hash`].
    /// Decimal values are serialized via their `to_string` (not `f64`) so
    /// the hash is exact across platforms.
    pub fn compute_determinism_hash(resource_costs: &[ResourceCost]) -> String {
        use sha2::{Digest, Sha256};

        let mut sorted: Vec<&ResourceCost> = resource_costs.iter().collect();
        sorted.sort_by(|a, b| a.resource_id.cmp(&b.resource_id));

        let canonical: Vec<Json> = sorted
            .iter()
            .map(|rc| {
                serde_json::json!({
                    "resource_id": rc.resource_id,
                    "min": rc.scenario.min.to_string(),
                    "expected": rc.scenario.expected.to_string(),
                    "max": rc.scenario.max.to_string(),
                })
            })
            .collect();

        let canonical_json =
            serde_json::to_string(&canonical).expect("Vec<Json> serialization cannot fail");
        let digest = Sha256::digest(canonical_json.as_bytes());
        let hex = format!("{digest:x}");
        hex[..16].to_string()
    }
}

/// Write-once persisted cost result. `created_at` and `id` are assigned by
/// the result store at `create` time and never change afterward; the
/// repository enforces immutability, this type just carries the shape.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct ImmutableCostResult {
    #[ts(as = "String")]
    pub id: Uuid,
    #[ts(as = "String")]
    pub job_id: Uuid,
    pub pricing_snapshot: Json,
    pub usage_profile: String,
    pub fcm: Fcm,
    pub confidence: Confidence,
    pub created_by: Option<String>,
    #[ts(as = "String")]
    pub correlation_id: Uuid,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
    TS,
)]
#[ts(export)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "audit_action")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AuditAction {
    #[sea_orm(string_value = "persist")]
    Persist,
    #[sea_orm(string_value = "compare")]
    Compare,
    #[sea_orm(string_value = "policy_eval")]
    PolicyEval,
    #[sea_orm(string_value = "gate")]
    Gate,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct AuditLogEntry {
    #[ts(as = "String")]
    pub id: Uuid,
    pub action: AuditAction,
    pub actor: Option<String>,
    #[ts(as = "Option<String>")]
    pub correlation_id: Option<Uuid>,
    pub input_data: Option<Json>,
    pub outcome: Option<Json>,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
}

/// One threshold check inside a policy gate evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct PolicyViolation {
    pub rule: String,
    pub message: String,
    #[schema(value_type = Option<String>)]
    #[ts(type = "string | null")]
    pub observed: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    #[ts(type = "string | null")]
    pub threshold: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, TS)]
#[serde(rename_all = "UPPERCASE")]
pub enum GateOutcome {
    Pass,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct GateResult {
    pub outcome: GateOutcome,
    pub violations: Vec<PolicyViolation>,
    pub exit_code: u8,
}

impl GateResult {
    pub fn from_violations(violations: Vec<PolicyViolation>) -> Self {
        let outcome = if violations.is_empty() {
            GateOutcome::Pass
        } else {
            GateOutcome::Fail
        };
        let exit_code = if violations.is_empty() { 0 } else { 1 };
        Self {
            outcome,
            violations,
            exit_code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn resource(id: &str, min: Decimal, expected: Decimal, max: Decimal, confidence: Confidence) -> ResourceCost {
        let scenario = Scenario::new(min, expected, max);
        ResourceCost {
            resource_id: id.to_string(),
            dimensions: vec![],
            diff: ScenarioDiff::from_scenario(&scenario),
            scenario,
            currency: Currency::Usd,
            confidence,
            confidence_sources: vec![],
        }
    }

    #[test]
    fn aggregate_sums_componentwise_and_takes_min_confidence() {
        let a = resource("r1", dec!(1), dec!(2), dec!(3), Confidence::High);
        let b = resource("r2", dec!(10), dec!(20), dec!(30), Confidence::Medium);
        let agg = AggregatedCost::aggregate(GroupBy::Service, "ec2".to_string(), Currency::Usd, [&a, &b]);
        assert_eq!(agg.scenario, Scenario::new(dec!(11), dec!(22), dec!(33)));
        assert_eq!(agg.confidence, Confidence::Medium);
        assert_eq!(agg.resource_count, 2);
    }

    #[test]
    fn determinism_hash_is_stable_across_input_order() {
        let a = resource("r2", dec!(1), dec!(2), dec!(3), Confidence::High);
        let b = resource("r1", dec!(10), dec!(20), dec!(30), Confidence::High);
        let hash_ab = Fcm::compute_determinism_hash(&[a.clone(), b.clone()]);
        let hash_ba = Fcm::compute_determinism_hash(&[b, a]);
        assert_eq!(hash_ab, hash_ba);
        assert_eq!(hash_ab.len(), 16);
    }

    #[test]
    fn determinism_hash_changes_with_values() {
        let a = resource("r1", dec!(1), dec!(2), dec!(3), Confidence::High);
        let mut b = a.clone();
        b.scenario.expected = dec!(99);
        assert_ne!(
            Fcm::compute_determinism_hash(&[a.clone()]),
            Fcm::compute_determinism_hash(&[b])
        );
    }

    #[test]
    fn scenario_diff_handles_zero_denominators() {
        let zero = Scenario::zero();
        let diff = ScenarioDiff::from_scenario(&zero);
        assert_eq!(diff.expected_minus_min_pct, None);
        assert_eq!(diff.max_minus_expected_pct, None);
        assert_eq!(diff.max_minus_min_ratio, None);
    }

    #[test]
    fn gate_result_pass_has_exit_code_zero() {
        let result = GateResult::from_violations(vec![]);
        assert_eq!(result.outcome, GateOutcome::Pass);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn gate_result_fail_has_exit_code_one() {
        let result = GateResult::from_violations(vec![PolicyViolation {
            rule: "max_cost".to_string(),
            message: "exceeds threshold".to_string(),
            observed: Some(dec!(500)),
            threshold: Some(dec!(100)),
        }]);
        assert_eq!(result.outcome, GateOutcome::Fail);
        assert_eq!(result.exit_code, 1);
    }
}
