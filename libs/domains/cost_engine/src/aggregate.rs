//! Groups resource costs into `AggregatedCost` buckets, grounded on
//! `cost-aggregation-engine/app/cost_service.py`'s `_aggregate_by_service`/
//! `_aggregate_by_region` (both a group-by over `resource_costs` feeding
//! `AggregatedCost::aggregate`, already implemented in `domain_cost_model`).
//!
//! The original groups by a `ResourceCost.service` field carried directly on
//! each resource. This data model has no such field on `NrgNode`/`ErgNode` —
//! `resource_type` (e.g. `ec2_instance`, `s3_bucket`) is the closest
//! equivalent available and stands in as the "service" grouping key; see
//! DESIGN.md.

use std::collections::BTreeMap;

use domain_cost_model::{AggregatedCost, Currency, ErgNode, GroupBy, ResourceCost};

fn resource_by_id<'a>(resources: &'a [ErgNode], resource_id: &str) -> Option<&'a ErgNode> {
    resources.iter().find(|r| r.nrg.resource_id == resource_id)
}

pub fn by_service(
    resource_costs: &[ResourceCost],
    resources: &[ErgNode],
    currency: Currency,
) -> Vec<AggregatedCost> {
    let mut groups: BTreeMap<String, Vec<&ResourceCost>> = BTreeMap::new();
    for rc in resource_costs {
        let key = resource_by_id(resources, &rc.resource_id)
            .map(|r| r.nrg.resource_type.clone())
            .unwrap_or_else(|| "unknown".to_string());
        groups.entry(key).or_default().push(rc);
    }
    groups
        .into_iter()
        .map(|(group_value, members)| {
            AggregatedCost::aggregate(GroupBy::Service, group_value, currency, members)
        })
        .collect()
}

pub fn by_region(
    resource_costs: &[ResourceCost],
    resources: &[ErgNode],
    currency: Currency,
) -> Vec<AggregatedCost> {
    let mut groups: BTreeMap<String, Vec<&ResourceCost>> = BTreeMap::new();
    for rc in resource_costs {
        let key = resource_by_id(resources, &rc.resource_id)
            .and_then(|r| r.nrg.region.clone())
            .unwrap_or_else(|| "unknown".to_string());
        groups.entry(key).or_default().push(rc);
    }
    groups
        .into_iter()
        .map(|(group_value, members)| {
            AggregatedCost::aggregate(GroupBy::Region, group_value, currency, members)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_cost_model::{Confidence, NrgNode, Provenance, Scenario, ScenarioDiff};
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

    fn resource_cost(resource_id: &str, value: rust_decimal::Decimal) -> ResourceCost {
        let scenario = Scenario::deterministic(value);
        ResourceCost {
            resource_id: resource_id.to_string(),
            dimensions: vec![],
            diff: ScenarioDiff::from_scenario(&scenario),
            scenario,
            currency: Currency::Usd,
            confidence: Confidence::High,
            confidence_sources: vec![],
        }
    }

    #[test]
    fn groups_by_resource_type_as_service_proxy() {
        let resources = vec![
            node("r1", "ec2_instance", Some("us-east-1")),
            node("r2", "ec2_instance", Some("us-east-1")),
            node("r3", "s3_bucket", Some("us-west-2")),
        ];
        let costs = vec![
            resource_cost("r1", dec!(10)),
            resource_cost("r2", dec!(20)),
            resource_cost("r3", dec!(5)),
        ];
        let aggregated = by_service(&costs, &resources, Currency::Usd);
        assert_eq!(aggregated.len(), 2);
        let ec2 = aggregated.iter().find(|a| a.group_value == "ec2_instance").unwrap();
        assert_eq!(ec2.resource_count, 2);
        assert_eq!(ec2.scenario.expected, dec!(30));
    }

    #[test]
    fn groups_by_region_defaulting_to_unknown() {
        let resources = vec![node("r1", "ec2_instance", None)];
        let costs = vec![resource_cost("r1", dec!(10))];
        let aggregated = by_region(&costs, &resources, Currency::Usd);
        assert_eq!(aggregated.len(), 1);
        assert_eq!(aggregated[0].group_value, "unknown");
    }
}
