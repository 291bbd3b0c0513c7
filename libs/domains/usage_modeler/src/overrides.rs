//! Override precedence: resource-level beats service-level beats global,
//! grounded on `usage-modeling-engine`'s `OverrideHandler` (per-resource
//! override lookup ahead of the profile default).

use domain_cost_model::{NrgNode, OverrideTier, UsageOverride};

/// Picks the highest-precedence override that applies to `node`, if any.
/// Within a tier, the first matching override in `overrides` wins, which
/// makes precedence fully deterministic for a fixed override list.
pub fn resolve<'a>(overrides: &'a [UsageOverride], node: &NrgNode) -> Option<&'a UsageOverride> {
    resolve_tier(overrides, node, OverrideTier::Resource)
        .or_else(|| resolve_tier(overrides, node, OverrideTier::Service))
        .or_else(|| resolve_tier(overrides, node, OverrideTier::Global))
}

fn resolve_tier<'a>(
    overrides: &'a [UsageOverride],
    node: &NrgNode,
    tier: OverrideTier,
) -> Option<&'a UsageOverride> {
    overrides.iter().find(|o| {
        if o.tier != tier {
            return false;
        }
        match tier {
            OverrideTier::Resource => o.resource_id.as_deref() == Some(node.resource_id.as_str()),
            OverrideTier::Service => o.service.as_deref() == Some(node.provider.as_str()),
            OverrideTier::Global => {
                o.resource_type.is_none() || o.resource_type.as_deref() == Some(node.resource_type.as_str())
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_cost_model::Confidence;
    use rust_decimal_macros::dec;

    fn node() -> NrgNode {
        NrgNode {
            resource_id: "r1".to_string(),
            address: "aws_instance.web".to_string(),
            resource_type: "aws_instance".to_string(),
            provider: "aws".to_string(),
            region: Some("us-east-1".to_string()),
            attributes: Default::default(),
            unknown_attributes: Vec::new(),
            quantity: 1,
            module_path: Vec::new(),
            dependencies: Vec::new(),
            confidence: Confidence::High,
        }
    }

    fn override_at(tier: OverrideTier, resource_id: Option<&str>, service: Option<&str>) -> UsageOverride {
        UsageOverride {
            tier,
            resource_id: resource_id.map(str::to_string),
            service: service.map(str::to_string),
            resource_type: None,
            value: dec!(100),
        }
    }

    #[test]
    fn resource_level_override_wins_over_service_level() {
        let overrides = vec![
            override_at(OverrideTier::Service, None, Some("aws")),
            override_at(OverrideTier::Resource, Some("r1"), None),
        ];
        let resolved = resolve(&overrides, &node()).unwrap();
        assert_eq!(resolved.tier, OverrideTier::Resource);
    }

    #[test]
    fn falls_back_to_global_when_nothing_more_specific_matches() {
        let overrides = vec![UsageOverride {
            tier: OverrideTier::Global,
            resource_id: None,
            service: None,
            resource_type: None,
            value: dec!(50),
        }];
        let resolved = resolve(&overrides, &node()).unwrap();
        assert_eq!(resolved.tier, OverrideTier::Global);
    }

    #[test]
    fn no_match_returns_none() {
        let overrides = vec![override_at(OverrideTier::Resource, Some("other"), None)];
        assert!(resolve(&overrides, &node()).is_none());
    }
}
