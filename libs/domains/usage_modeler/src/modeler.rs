//! Applies a usage profile (plus overrides) to an enriched resource graph,
//! grounded on `usage-modeling-engine/app/usage/usage_service.py`'s
//! `apply_usage`/`_apply_usage_to_resource` per-resource loop.

use domain_cost_model::{
    Confidence, ErgNode, Scenario, UsageAnnotatedResourceGraph, UsageAnnotation, UsageOverride,
};

use crate::error::ModelerResult;
use crate::overrides::resolve as resolve_override;
use crate::profile::{ProfileStore, UsageProfile};

pub struct UsageModeler<'a> {
    profiles: &'a ProfileStore,
}

impl<'a> UsageModeler<'a> {
    pub fn new(profiles: &'a ProfileStore) -> Self {
        Self { profiles }
    }

    pub fn apply(
        &self,
        nodes: Vec<ErgNode>,
        profile_name: &str,
        overrides: &[UsageOverride],
    ) -> ModelerResult<UsageAnnotatedResourceGraph> {
        let profile = self.profiles.get(profile_name)?;
        let annotations = nodes.iter().map(|node| self.annotate(node, profile, overrides)).collect();
        Ok(UsageAnnotatedResourceGraph { nodes, annotations })
    }

    fn annotate(&self, node: &ErgNode, profile: &UsageProfile, overrides: &[UsageOverride]) -> UsageAnnotation {
        let Some(spec) = profile.lookup(&node.nrg.provider, &node.nrg.resource_type) else {
            return UsageAnnotation {
                resource_id: node.nrg.resource_id.clone(),
                unit: None,
                scenario: Scenario::zero(),
                assumption: None,
                overrides_applied: Vec::new(),
                confidence: Confidence::Low,
                note: Some(format!(
                    "no usage profile entry for {}/{}",
                    node.nrg.provider, node.nrg.resource_type
                )),
            };
        };

        let mut scenario = Scenario::new(spec.min, spec.expected, spec.max);
        let mut overrides_applied = Vec::new();
        let mut note = None;

        if let Some(matched) = resolve_override(overrides, &node.nrg) {
            scenario = Scenario::deterministic(matched.value);
            overrides_applied.push(format!("{:?}:{}", matched.tier, matched.value));
        }

        if !scenario.is_monotonic() {
            tracing::warn!(resource_id = %node.nrg.resource_id, "usage scenario violated monotonicity, repairing");
            scenario = scenario.normalized();
            note = Some("scenario values were reordered to restore min <= expected <= max".to_string());
        }

        let confidence = if !overrides_applied.is_empty() || scenario.is_deterministic() {
            Confidence::High
        } else {
            Confidence::Medium
        };

        UsageAnnotation {
            resource_id: node.nrg.resource_id.clone(),
            unit: Some(spec.unit.clone()),
            scenario,
            assumption: spec.assumption.clone(),
            overrides_applied,
            confidence,
            note,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_cost_model::{OverrideTier, Provenance};
    use rust_decimal_macros::dec;

    fn erg_node(resource_id: &str, resource_type: &str) -> ErgNode {
        ErgNode {
            nrg: domain_cost_model::NrgNode {
                resource_id: resource_id.to_string(),
                address: resource_id.to_string(),
                resource_type: resource_type.to_string(),
                provider: "aws".to_string(),
                region: Some("us-east-1".to_string()),
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

    fn profile_with_ec2() -> ProfileStore {
        let mut store = ProfileStore::new();
        let mut scenarios = std::collections::BTreeMap::new();
        scenarios.insert(
            crate::profile::scenario_key("aws", "ec2_instance"),
            crate::profile::ScenarioSpec {
                min: dec!(160),
                expected: dec!(730),
                max: dec!(730),
                unit: "hours".to_string(),
                assumption: Some("24x7 uptime assumed".to_string()),
            },
        );
        store.insert(
            "prod",
            crate::profile::UsageProfile {
                version: "1".to_string(),
                name: "prod".to_string(),
                description: "production".to_string(),
                scenarios,
            },
        );
        store
    }

    #[test]
    fn unmatched_resource_gets_low_confidence_empty_annotation() {
        let store = profile_with_ec2();
        let modeler = UsageModeler::new(&store);
        let uarg = modeler.apply(vec![erg_node("r1", "s3_bucket")], "prod", &[]).unwrap();
        assert_eq!(uarg.annotations[0].confidence, Confidence::Low);
        assert!(uarg.annotations[0].note.is_some());
    }

    #[test]
    fn matched_resource_without_override_is_medium_confidence() {
        let store = profile_with_ec2();
        let modeler = UsageModeler::new(&store);
        let uarg = modeler.apply(vec![erg_node("r1", "ec2_instance")], "prod", &[]).unwrap();
        assert_eq!(uarg.annotations[0].confidence, Confidence::Medium);
        assert_eq!(uarg.annotations[0].scenario.min, dec!(160));
    }

    #[test]
    fn override_forces_deterministic_scenario_and_high_confidence() {
        let store = profile_with_ec2();
        let modeler = UsageModeler::new(&store);
        let overrides = vec![UsageOverride {
            tier: OverrideTier::Resource,
            resource_id: Some("r1".to_string()),
            service: None,
            resource_type: None,
            value: dec!(500),
        }];
        let uarg = modeler
            .apply(vec![erg_node("r1", "ec2_instance")], "prod", &overrides)
            .unwrap();
        let annotation = &uarg.annotations[0];
        assert_eq!(annotation.confidence, Confidence::High);
        assert!(annotation.scenario.is_deterministic());
        assert_eq!(annotation.scenario.expected, dec!(500));
        assert_eq!(annotation.overrides_applied.len(), 1);
    }
}
