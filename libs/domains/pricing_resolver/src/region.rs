//! Region-code to catalog-region-name normalization, grounded on
//! `pricing-engine/app/utils/region_mapper.py`'s static `REGION_MAP`.

use crate::error::{ResolverError, ResolverResult};

const REGION_MAP: &[(&str, &str)] = &[
    ("us-east-1", "US East (N. Virginia)"),
    ("us-east-2", "US East (Ohio)"),
    ("us-west-1", "US West (N. California)"),
    ("us-west-2", "US West (Oregon)"),
    ("eu-west-1", "EU (Ireland)"),
    ("eu-west-2", "EU (London)"),
    ("eu-west-3", "EU (Paris)"),
    ("eu-central-1", "EU (Frankfurt)"),
    ("eu-north-1", "EU (Stockholm)"),
    ("eu-south-1", "EU (Milan)"),
    ("ap-south-1", "Asia Pacific (Mumbai)"),
    ("ap-northeast-1", "Asia Pacific (Tokyo)"),
    ("ap-northeast-2", "Asia Pacific (Seoul)"),
    ("ap-northeast-3", "Asia Pacific (Osaka)"),
    ("ap-southeast-1", "Asia Pacific (Singapore)"),
    ("ap-southeast-2", "Asia Pacific (Sydney)"),
    ("ap-east-1", "Asia Pacific (Hong Kong)"),
    ("ca-central-1", "Canada (Central)"),
    ("sa-east-1", "South America (Sao Paulo)"),
    ("me-south-1", "Middle East (Bahrain)"),
    ("af-south-1", "Africa (Cape Town)"),
];

/// Normalizes an AWS-style region code to its catalog region name,
/// rejecting anything not in the supported set per spec §4.6 step 1.
pub fn normalize_region(region_code: &str) -> ResolverResult<&'static str> {
    REGION_MAP
        .iter()
        .find(|(code, _)| *code == region_code)
        .map(|(_, name)| *name)
        .ok_or_else(|| ResolverError::UnknownRegion(region_code.to_string()))
}

pub fn is_supported_region(region_code: &str) -> bool {
    REGION_MAP.iter().any(|(code, _)| *code == region_code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_known_region() {
        assert_eq!(normalize_region("us-east-1").unwrap(), "US East (N. Virginia)");
    }

    #[test]
    fn rejects_unknown_region() {
        assert!(normalize_region("xx-bogus-1").is_err());
    }
}
