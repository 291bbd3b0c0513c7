//! Attribute scoring and confidence rule, grounded on
//! `pricing-engine/app/pricing/sku_matcher.py`'s `SKUMatcher.match_prices`/
//! `_calculate_match_score`, generalized from AWS-specific `usage_type`
//! checks to the confidence rule spelled out in spec §4.6 step 5.

use std::collections::BTreeMap;

use domain_cost_model::Confidence;
use domain_pricing::models::PriceEntry;

pub struct MatchOutcome {
    pub matched: Vec<PriceEntry>,
    pub confidence: Confidence,
}

/// Scores each candidate against `request_attributes` (case-folded,
/// trimmed equality) and applies the confidence rule: HIGH requires exactly
/// one perfect match with a non-empty usage type and unit; multiple perfect
/// matches or any partial match is MEDIUM; no attribute match falls back to
/// every type-matched candidate at LOW.
pub fn match_candidates(
    candidates: Vec<PriceEntry>,
    request_attributes: &BTreeMap<String, String>,
) -> MatchOutcome {
    if request_attributes.is_empty() {
        return MatchOutcome {
            matched: candidates,
            confidence: Confidence::Low,
        };
    }

    let mut exact = Vec::new();
    let mut partial = Vec::new();
    for candidate in &candidates {
        match score(&candidate.attributes, request_attributes) {
            s if s == 1.0 => exact.push(candidate.clone()),
            s if s > 0.5 => partial.push(candidate.clone()),
            _ => {}
        }
    }

    if exact.len() == 1 {
        let entry = &exact[0];
        let has_usage_type = entry.instance_type.as_ref().is_some_and(|s| !s.is_empty());
        let has_unit = true; // PricingUnit is a required, non-empty enum.
        let confidence = if has_usage_type && has_unit {
            Confidence::High
        } else {
            Confidence::Medium
        };
        return MatchOutcome {
            matched: exact,
            confidence,
        };
    }
    if !exact.is_empty() {
        return MatchOutcome {
            matched: exact,
            confidence: Confidence::Medium,
        };
    }
    if !partial.is_empty() {
        return MatchOutcome {
            matched: partial,
            confidence: Confidence::Medium,
        };
    }

    MatchOutcome {
        matched: candidates,
        confidence: Confidence::Low,
    }
}

fn score(entry_attributes: &BTreeMap<String, String>, request_attributes: &BTreeMap<String, String>) -> f64 {
    if request_attributes.is_empty() {
        return 0.0;
    }
    let matched = request_attributes
        .iter()
        .filter(|(key, value)| {
            entry_attributes
                .get(*key)
                .is_some_and(|candidate| candidate.trim().eq_ignore_ascii_case(value.trim()))
        })
        .count();
    matched as f64 / request_attributes.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain_pricing::models::{CloudProvider, Currency, Money, PricingUnit, ResourceType};

    fn entry(attrs: &[(&str, &str)], instance_type: Option<&str>) -> PriceEntry {
        PriceEntry {
            id: uuid::Uuid::now_v7(),
            provider: CloudProvider::Aws,
            resource_type: ResourceType::Compute,
            sku: "SKU".to_string(),
            service_name: "Amazon EC2".to_string(),
            product_family: "Compute Instance".to_string(),
            instance_type: instance_type.map(str::to_string),
            region: "US East (N. Virginia)".to_string(),
            unit_price: Money::new(100, Currency::Usd),
            pricing_unit: PricingUnit::Hour,
            description: String::new(),
            attributes: attrs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            effective_date: Utc::now(),
            expiration_date: None,
            collected_at: Utc::now(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn single_perfect_match_with_usage_type_is_high_confidence() {
        let candidates = vec![entry(&[("vcpu", "2")], Some("t3.micro"))];
        let request = BTreeMap::from([("vcpu".to_string(), "2".to_string())]);
        let outcome = match_candidates(candidates, &request);
        assert_eq!(outcome.confidence, Confidence::High);
        assert_eq!(outcome.matched.len(), 1);
    }

    #[test]
    fn single_perfect_match_without_usage_type_is_medium_confidence() {
        let candidates = vec![entry(&[("vcpu", "2")], None)];
        let request = BTreeMap::from([("vcpu".to_string(), "2".to_string())]);
        let outcome = match_candidates(candidates, &request);
        assert_eq!(outcome.confidence, Confidence::Medium);
    }

    #[test]
    fn multiple_perfect_matches_are_medium_confidence() {
        let candidates = vec![
            entry(&[("vcpu", "2")], Some("t3.micro")),
            entry(&[("vcpu", "2")], Some("t3a.micro")),
        ];
        let request = BTreeMap::from([("vcpu".to_string(), "2".to_string())]);
        let outcome = match_candidates(candidates, &request);
        assert_eq!(outcome.confidence, Confidence::Medium);
        assert_eq!(outcome.matched.len(), 2);
    }

    #[test]
    fn no_attribute_match_falls_back_to_low_confidence_with_all_candidates() {
        let candidates = vec![entry(&[("vcpu", "4")], Some("t3.micro"))];
        let request = BTreeMap::from([("vcpu".to_string(), "2".to_string())]);
        let outcome = match_candidates(candidates, &request);
        assert_eq!(outcome.confidence, Confidence::Low);
        assert_eq!(outcome.matched.len(), 1);
    }

    #[test]
    fn no_request_attributes_is_low_confidence() {
        let candidates = vec![entry(&[], Some("t3.micro"))];
        let outcome = match_candidates(candidates, &BTreeMap::new());
        assert_eq!(outcome.confidence, Confidence::Low);
    }
}
