//! Deterministic cost computation, grounded on
//! `cost-aggregation-engine/app/cost_service.py`'s `_calculate_resource_cost`/
//! `_find_pricing_for_resource`/`_find_usage_for_resource` linear-scan-by-id
//! pattern and `_calculate_total_cost`/`_calculate_determinism_hash`.
//!
//! The original comments "for simplicity, assume one dimension (can be
//! extended)" — and since `UsageAnnotation` here already carries exactly one
//! `Scenario` per resource (not a list), this engine follows suit: each
//! resource contributes at most one `CostDimension`, built from its first
//! matching pricing record.

use domain_cost_model::{
    Confidence, Currency, ErgNode, Fcm, ResourceCost, Scenario, ScenarioDiff, TotalCost,
    CostDimension, UsageAnnotation,
};

use crate::aggregate::{by_region, by_service};
use crate::models::PriceRecordInput;
use crate::units;

/// Stateless; a cost computation depends only on its inputs. Kept as a
/// struct (rather than a free function) to match the `PricingResolver`/
/// `UsageModeler` call convention the rest of the pipeline uses.
pub struct CostEngine;

impl CostEngine {
    pub fn new() -> Self {
        Self
    }

    /// Computes the Final Cost Model for one enriched, usage-annotated
    /// resource graph plus the pricing records already matched to it.
    pub fn compute(
        &self,
        resources: &[ErgNode],
        pricing_records: &[PriceRecordInput],
        usage_records: &[UsageAnnotation],
        currency: Currency,
        precision: u32,
    ) -> Fcm {
        let resource_costs: Vec<ResourceCost> = resources
            .iter()
            .map(|resource| {
                self.cost_one_resource(resource, pricing_records, usage_records, currency, precision)
            })
            .collect();

        let total_scenario = resource_costs
            .iter()
            .fold(Scenario::zero(), |acc, rc| acc.componentwise_add(&rc.scenario));

        let overall_confidence =
            Confidence::min_of(resource_costs.iter().map(|rc| rc.confidence).collect::<Vec<_>>());

        let determinism_hash = Fcm::compute_determinism_hash(&resource_costs);

        Fcm {
            aggregated_by_service: by_service(&resource_costs, resources, currency),
            aggregated_by_region: by_region(&resource_costs, resources, currency),
            total: TotalCost {
                diff: ScenarioDiff::from_scenario(&total_scenario),
                scenario: total_scenario,
                currency,
            },
            resource_costs,
            overall_confidence,
            determinism_hash,
        }
    }

    fn cost_one_resource(
        &self,
        resource: &ErgNode,
        pricing_records: &[PriceRecordInput],
        usage_records: &[UsageAnnotation],
        currency: Currency,
        precision: u32,
    ) -> ResourceCost {
        let resource_id = &resource.nrg.resource_id;
        let price = pricing_records.iter().find(|p| &p.resource_id == resource_id);
        let usage = usage_records.iter().find(|u| &u.resource_id == resource_id);

        let mut confidence_sources = Vec::new();
        confidence_sources.push(format!("resource:{}", resource.nrg.confidence));

        let (dimensions, scenario) = match (price, usage) {
            (Some(price), Some(usage)) => {
                confidence_sources.push(format!("pricing:{}", price.confidence));
                confidence_sources.push(format!("usage:{}", usage.confidence));

                if let Some(usage_unit) = &usage.unit {
                    if !units::compatible(usage_unit, &price.unit) {
                        tracing::warn!(
                            resource_id = %resource_id,
                            usage_unit = %usage_unit,
                            pricing_unit = %price.unit,
                            "usage and pricing units do not match a known alias, costing anyway"
                        );
                    }
                }

                let mut scenario = Scenario::new(
                    usage.scenario.min * price.unit_price,
                    usage.scenario.expected * price.unit_price,
                    usage.scenario.max * price.unit_price,
                );
                if !scenario.is_monotonic() {
                    tracing::warn!(resource_id = %resource_id, "resource cost scenario violated monotonicity, repairing");
                    scenario = scenario.normalized();
                }
                scenario = Scenario::new(
                    scenario.min.round_dp(precision),
                    scenario.expected.round_dp(precision),
                    scenario.max.round_dp(precision),
                );

                let dimension = CostDimension {
                    dimension: usage.unit.clone().unwrap_or_else(|| "usage".to_string()),
                    unit: usage.unit.clone().unwrap_or_default(),
                    sku: price.sku.clone(),
                    unit_price: price.unit_price,
                    scenario,
                };
                (vec![dimension], scenario)
            }
            _ => {
                if price.is_none() {
                    confidence_sources.push("pricing:missing".to_string());
                }
                if usage.is_none() {
                    confidence_sources.push("usage:missing".to_string());
                }
                (vec![], Scenario::zero())
            }
        };

        let confidence = Confidence::min_of(vec![
            resource.nrg.confidence,
            price.map(|p| p.confidence).unwrap_or(Confidence::Low),
            usage.map(|u| u.confidence).unwrap_or(Confidence::Low),
        ]);

        ResourceCost {
            resource_id: resource_id.clone(),
            dimensions,
            diff: ScenarioDiff::from_scenario(&scenario),
            scenario,
            currency,
            confidence,
            confidence_sources,
        }
    }
}

impl Default for CostEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_cost_model::{NrgNode, Provenance};
    use rust_decimal_macros::dec;

    fn node(resource_id: &str, resource_type: &str, region: Option<&str>) -> ErgNode {
        ErgNode {
            nrg: NrgNode {
                resource_id: resource_id.to_string(),
                address: resource_id.to_string(),
                resource_type: resource_type.to_string(),
                provider: "aws".to_string(),
                region: region.map(|r| r.to_string()),
                attributes: Default::default(),
                unknown_attributes: Vec::new(),
                quantity: 1,
                module_path: Vec::new(),
                dependencies: Vec::new(),
                confidence: Confidence::High,
            },
            enriched_attributes: Default::default(),
            provenance: Provenance::Declared,
            parent_resource_id: None,
            aws_account_id: None,
            availability_zone: None,
        }
    }

    fn price(resource_id: &str, unit_price: rust_decimal::Decimal) -> PriceRecordInput {
        PriceRecordInput {
            resource_id: resource_id.to_string(),
            dimension: "compute".to_string(),
            unit: "hours".to_string(),
            unit_price,
            sku: "SKU123".to_string(),
            currency: Currency::Usd,
            confidence: Confidence::High,
        }
    }

    fn usage(resource_id: &str, scenario: Scenario) -> UsageAnnotation {
        UsageAnnotation {
            resource_id: resource_id.to_string(),
            unit: Some("hours".to_string()),
            scenario,
            assumption: None,
            overrides_applied: Vec::new(),
            confidence: Confidence::High,
            note: None,
        }
    }

    #[test]
    fn matched_resource_multiplies_usage_by_unit_price() {
        let engine = CostEngine::new();
        let resources = vec![node("r1", "ec2_instance", Some("us-east-1"))];
        let prices = vec![price("r1", dec!(0.10))];
        let usages = vec![usage("r1", Scenario::new(dec!(160), dec!(730), dec!(730)))];

        let fcm = engine.compute(&resources, &prices, &usages, Currency::Usd, 2);
        let rc = &fcm.resource_costs[0];
        assert_eq!(rc.scenario, Scenario::new(dec!(16.00), dec!(73.00), dec!(73.00)));
        assert_eq!(rc.confidence, Confidence::High);
        assert_eq!(rc.dimensions.len(), 1);
    }

    #[test]
    fn unmatched_resource_is_zero_cost_low_confidence() {
        let engine = CostEngine::new();
        let resources = vec![node("r1", "s3_bucket", None)];
        let fcm = engine.compute(&resources, &[], &[], Currency::Usd, 2);
        let rc = &fcm.resource_costs[0];
        assert_eq!(rc.scenario, Scenario::zero());
        assert_eq!(rc.confidence, Confidence::Low);
        assert!(rc.dimensions.is_empty());
    }

    #[test]
    fn total_sums_all_resources_componentwise() {
        let engine = CostEngine::new();
        let resources = vec![
            node("r1", "ec2_instance", Some("us-east-1")),
            node("r2", "ec2_instance", Some("us-west-2")),
        ];
        let prices = vec![price("r1", dec!(1)), price("r2", dec!(2))];
        let usages = vec![
            usage("r1", Scenario::new(dec!(10), dec!(10), dec!(10))),
            usage("r2", Scenario::new(dec!(5), dec!(5), dec!(5))),
        ];
        let fcm = engine.compute(&resources, &prices, &usages, Currency::Usd, 2);
        assert_eq!(fcm.total.scenario, Scenario::new(dec!(20.00), dec!(20.00), dec!(20.00)));
    }

    #[test]
    fn determinism_hash_is_stable_across_input_order() {
        let engine = CostEngine::new();
        let resources_a = vec![node("r1", "ec2_instance", None), node("r2", "ec2_instance", None)];
        let resources_b = vec![node("r2", "ec2_instance", None), node("r1", "ec2_instance", None)];
        let fcm_a = engine.compute(&resources_a, &[], &[], Currency::Usd, 2);
        let fcm_b = engine.compute(&resources_b, &[], &[], Currency::Usd, 2);
        assert_eq!(fcm_a.determinism_hash, fcm_b.determinism_hash);
    }

    #[test]
    fn mismatched_scenario_is_repaired_to_monotonic() {
        let engine = CostEngine::new();
        let resources = vec![node("r1", "ec2_instance", None)];
        let prices = vec![price("r1", dec!(1))];
        let usages = vec![usage("r1", Scenario::new(dec!(10), dec!(1), dec!(5)))];
        let fcm = engine.compute(&resources, &prices, &usages, Currency::Usd, 2);
        assert!(fcm.resource_costs[0].scenario.is_monotonic());
    }
}
