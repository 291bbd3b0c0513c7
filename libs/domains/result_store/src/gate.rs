//! Policy gate evaluation (spec §4.10's "threshold by absolute cost, minimum
//! confidence, maximum delta vs a baseline result"). No concrete evaluation
//! algorithm exists in `original_source` — `results-governance-service/app/
//! schemas/policy.py` only defines the request/response shapes — so the
//! three rules below are derived directly from that prose description and
//! the `GateResult`/`PolicyViolation`/`GateOutcome` vocabulary already
//! defined in `domain_cost_model::cost`.

use domain_cost_model::{Confidence, GateResult, ImmutableCostResult, PolicyViolation};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;

/// The three configurable thresholds a gate evaluation checks. Any field
/// left `None` skips that rule entirely.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct GatePolicy {
    pub max_absolute_cost: Option<Decimal>,
    pub min_confidence: Option<Confidence>,
    pub max_delta_pct: Option<Decimal>,
}

/// Evaluates `candidate` against `policy`, optionally comparing it to
/// `baseline` for the delta rule. Order of violations is threshold,
/// confidence, delta — stable so two identical inputs always produce the
/// same `violations` ordering (part of the pipeline's determinism
/// guarantee).
pub fn evaluate(
    candidate: &ImmutableCostResult,
    baseline: Option<&ImmutableCostResult>,
    policy: &GatePolicy,
) -> GateResult {
    let mut violations = Vec::new();
    let observed_cost = candidate.fcm.total.scenario.expected;

    if let Some(max_cost) = policy.max_absolute_cost {
        if observed_cost > max_cost {
            violations.push(PolicyViolation {
                rule: "max_absolute_cost".to_string(),
                message: format!("expected cost {observed_cost} exceeds threshold {max_cost}"),
                observed: Some(observed_cost),
                threshold: Some(max_cost),
            });
        }
    }

    if let Some(min_confidence) = policy.min_confidence {
        if candidate.confidence < min_confidence {
            violations.push(PolicyViolation {
                rule: "min_confidence".to_string(),
                message: format!(
                    "overall confidence {} is below required {min_confidence}",
                    candidate.confidence
                ),
                observed: None,
                threshold: None,
            });
        }
    }

    if let (Some(max_delta_pct), Some(baseline)) = (policy.max_delta_pct, baseline) {
        let baseline_cost = baseline.fcm.total.scenario.expected;
        if !baseline_cost.is_zero() {
            let delta_pct = (observed_cost - baseline_cost) / baseline_cost * Decimal::from(100);
            if delta_pct.abs() > max_delta_pct {
                violations.push(PolicyViolation {
                    rule: "max_delta_pct".to_string(),
                    message: format!(
                        "cost changed {delta_pct}% relative to baseline, exceeding {max_delta_pct}%"
                    ),
                    observed: Some(delta_pct),
                    threshold: Some(max_delta_pct),
                });
            }
        }
    }

    GateResult::from_violations(violations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain_cost_model::{Fcm, ScenarioDiff, TotalCost};
    use domain_cost_model::{Currency, Scenario};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn result_with_cost(expected: Decimal, confidence: Confidence) -> ImmutableCostResult {
        let scenario = Scenario::deterministic(expected);
        ImmutableCostResult {
            id: Uuid::now_v7(),
            job_id: Uuid::now_v7(),
            pricing_snapshot: serde_json::json!({}),
            usage_profile: "prod".to_string(),
            fcm: Fcm {
                resource_costs: vec![],
                aggregated_by_service: vec![],
                aggregated_by_region: vec![],
                total: TotalCost {
                    diff: ScenarioDiff::from_scenario(&scenario),
                    scenario,
                    currency: Currency::Usd,
                },
                overall_confidence: confidence,
                determinism_hash: "deadbeefdeadbeef".to_string(),
            },
            confidence,
            created_by: None,
            correlation_id: Uuid::now_v7(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn passes_when_no_thresholds_configured() {
        let candidate = result_with_cost(dec!(1000), Confidence::Low);
        let result = evaluate(&candidate, None, &GatePolicy::default());
        assert!(result.violations.is_empty());
    }

    #[test]
    fn fails_absolute_cost_threshold() {
        let candidate = result_with_cost(dec!(1000), Confidence::High);
        let policy = GatePolicy {
            max_absolute_cost: Some(dec!(500)),
            ..Default::default()
        };
        let result = evaluate(&candidate, None, &policy);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].rule, "max_absolute_cost");
    }

    #[test]
    fn fails_minimum_confidence() {
        let candidate = result_with_cost(dec!(10), Confidence::Low);
        let policy = GatePolicy {
            min_confidence: Some(Confidence::High),
            ..Default::default()
        };
        let result = evaluate(&candidate, None, &policy);
        assert_eq!(result.violations[0].rule, "min_confidence");
    }

    #[test]
    fn fails_delta_vs_baseline() {
        let baseline = result_with_cost(dec!(100), Confidence::High);
        let candidate = result_with_cost(dec!(200), Confidence::High);
        let policy = GatePolicy {
            max_delta_pct: Some(dec!(50)),
            ..Default::default()
        };
        let result = evaluate(&candidate, Some(&baseline), &policy);
        assert_eq!(result.violations[0].rule, "max_delta_pct");
    }

    #[test]
    fn delta_rule_skipped_without_baseline() {
        let candidate = result_with_cost(dec!(200), Confidence::High);
        let policy = GatePolicy {
            max_delta_pct: Some(dec!(1)),
            ..Default::default()
        };
        let result = evaluate(&candidate, None, &policy);
        assert!(result.violations.is_empty());
    }
}
