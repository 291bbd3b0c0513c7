use sha2::{Digest, Sha256};

/// Deterministic cache key builder.
///
/// Keys are assembled as `domain:account:region:resource_type:selector[:attr_hash]`.
/// `attr_hash` is a stable digest over the attribute pairs sorted by key, so
/// the same logical lookup always produces the same key regardless of the
/// order attributes were collected in.
#[derive(Debug, Clone)]
pub struct CacheKeyBuilder {
    domain: String,
    account: String,
    region: String,
    resource_type: String,
    selector: String,
    attributes: Vec<(String, String)>,
}

impl CacheKeyBuilder {
    pub fn new(
        domain: impl Into<String>,
        account: impl Into<String>,
        region: impl Into<String>,
        resource_type: impl Into<String>,
        selector: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            account: account.into(),
            region: region.into(),
            resource_type: resource_type.into(),
            selector: selector.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn build(&self) -> String {
        let base = format!(
            "{}:{}:{}:{}:{}",
            self.domain, self.account, self.region, self.resource_type, self.selector
        );
        if self.attributes.is_empty() {
            return base;
        }
        format!("{base}:{}", Self::attr_hash(&self.attributes))
    }

    fn attr_hash(attributes: &[(String, String)]) -> String {
        let mut sorted = attributes.to_vec();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));
        let mut hasher = Sha256::new();
        for (k, v) in &sorted {
            hasher.update(k.as_bytes());
            hasher.update(b"=");
            hasher.update(v.as_bytes());
            hasher.update(b";");
        }
        let digest = hasher.finalize();
        format!("{digest:x}")[..16].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_order_does_not_change_the_key() {
        let a = CacheKeyBuilder::new("metadata", "acct1", "us-east-1", "ec2_instance", "t3.micro")
            .with_attribute("os", "linux")
            .with_attribute("tenancy", "default")
            .build();
        let b = CacheKeyBuilder::new("metadata", "acct1", "us-east-1", "ec2_instance", "t3.micro")
            .with_attribute("tenancy", "default")
            .with_attribute("os", "linux")
            .build();
        assert_eq!(a, b);
    }

    #[test]
    fn different_attributes_produce_different_keys() {
        let a = CacheKeyBuilder::new("metadata", "acct1", "us-east-1", "ec2_instance", "t3.micro")
            .with_attribute("os", "linux")
            .build();
        let b = CacheKeyBuilder::new("metadata", "acct1", "us-east-1", "ec2_instance", "t3.micro")
            .with_attribute("os", "windows")
            .build();
        assert_ne!(a, b);
    }

    #[test]
    fn no_attributes_omits_the_hash_segment() {
        let key = CacheKeyBuilder::new("pricing", "acct1", "us-east-1", "ec2_instance", "t3.micro")
            .build();
        assert_eq!(key, "pricing:acct1:us-east-1:ec2_instance:t3.micro");
    }
}
