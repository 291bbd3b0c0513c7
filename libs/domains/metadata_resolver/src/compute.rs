use async_trait::async_trait;
use core_cache::{Cache, CacheKeyBuilder, TTL_METADATA_SECONDS};
use domain_cost_model::{AttributeMap, Confidence, ErgNode, NrgNode, Provenance};
use tracing::warn;

use crate::adapter::{AdapterOutcome, ServiceAdapter};
use crate::common::{cached_attribute_lookup, implicit_resource_id};
use crate::describe::DescribeClient;

/// Enriches compute instances with instance-type/image metadata, and
/// synthesizes the billable sub-resources a compute instance implies:
/// a root volume (unless one is declared), a network interface, a public
/// address if requested, and one implicit volume per additional declared
/// block device.
pub struct ComputeAdapter {
    pub region: String,
    pub account: String,
}

#[async_trait]
impl ServiceAdapter for ComputeAdapter {
    fn handles(&self, resource_type: &str) -> bool {
        matches!(resource_type, "aws_instance" | "compute_instance")
    }

    async fn enrich(
        &self,
        node: &NrgNode,
        client: &dyn DescribeClient,
        cache: &dyn Cache,
    ) -> AdapterOutcome {
        let mut api_calls = 0usize;
        let mut cache_hits = 0usize;
        let mut degraded = false;
        let mut enriched_attributes = AttributeMap::new();

        if let Some(instance_type) = node
            .attributes
            .get("instance_type")
            .and_then(|v| v.as_str())
        {
            let key = CacheKeyBuilder::new(
                "metadata",
                &self.account,
                &self.region,
                "instance_type",
                instance_type,
            )
            .build();
            match cached_attribute_lookup(cache, &key, TTL_METADATA_SECONDS, async {
                client.describe_instance_type(instance_type).await
            })
            .await
            {
                Ok((attrs, hit)) => {
                    if hit {
                        cache_hits += 1;
                    } else {
                        api_calls += 1;
                    }
                    enriched_attributes.extend(attrs);
                }
                Err(err) => {
                    warn!(resource_id = %node.resource_id, error = %err, "instance type describe failed");
                    degraded = true;
                }
            }
        }

        if let Some(image_id) = node.attributes.get("ami").and_then(|v| v.as_str()) {
            let key =
                CacheKeyBuilder::new("metadata", &self.account, &self.region, "image", image_id)
                    .build();
            match cached_attribute_lookup(cache, &key, TTL_METADATA_SECONDS, async {
                client.describe_image(image_id).await
            })
            .await
            {
                Ok((attrs, hit)) => {
                    if hit {
                        cache_hits += 1;
                    } else {
                        api_calls += 1;
                    }
                    enriched_attributes.extend(attrs);
                }
                Err(err) => {
                    warn!(resource_id = %node.resource_id, error = %err, "image describe failed");
                    degraded = true;
                }
            }
        }

        let confidence = if degraded {
            Confidence::min(node.confidence, Confidence::Low)
        } else {
            node.confidence
        };

        let mut declared = ErgNode {
            nrg: node.clone(),
            enriched_attributes,
            provenance: Provenance::Declared,
            parent_resource_id: None,
            aws_account_id: Some(self.account.clone()),
            availability_zone: node
                .attributes
                .get("availability_zone")
                .and_then(|v| v.as_str())
                .map(str::to_string),
        };
        declared.nrg.confidence = confidence;

        let mut implicit = Vec::new();

        let has_root_block_device = node.attributes.contains_key("root_block_device");
        if !has_root_block_device {
            implicit.push(implicit_volume_node(node, 0, &self.account, confidence));
        }

        if let Some(devices) = node
            .attributes
            .get("ebs_block_device")
            .and_then(|v| v.as_list())
        {
            for (idx, _device) in devices.iter().enumerate() {
                implicit.push(implicit_volume_node(node, idx + 1, &self.account, confidence));
            }
        }

        implicit.push(implicit_network_interface_node(node, &self.account, confidence));

        let wants_public_ip = node
            .attributes
            .get("associate_public_ip_address")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if wants_public_ip {
            implicit.push(implicit_public_address_node(node, &self.account, confidence));
        }

        AdapterOutcome {
            declared,
            implicit,
            api_calls,
            cache_hits,
            degraded,
        }
    }
}

fn implicit_volume_node(parent: &NrgNode, index: usize, account: &str, confidence: Confidence) -> ErgNode {
    synth_implicit(parent, "volume", index, "aws_ebs_volume", account, confidence)
}

fn implicit_network_interface_node(parent: &NrgNode, account: &str, confidence: Confidence) -> ErgNode {
    synth_implicit(parent, "network_interface", 0, "aws_network_interface", account, confidence)
}

fn implicit_public_address_node(parent: &NrgNode, account: &str, confidence: Confidence) -> ErgNode {
    synth_implicit(parent, "public_address", 0, "aws_eip", account, confidence)
}

fn synth_implicit(
    parent: &NrgNode,
    kind: &str,
    index: usize,
    resource_type: &str,
    account: &str,
    confidence: Confidence,
) -> ErgNode {
    let resource_id = implicit_resource_id(&parent.resource_id, kind, index);
    let nrg = NrgNode {
        resource_id: resource_id.clone(),
        address: format!("{}.__implicit.{kind}[{index}]", parent.address),
        resource_type: resource_type.to_string(),
        provider: parent.provider.clone(),
        region: parent.region.clone(),
        attributes: AttributeMap::new(),
        unknown_attributes: Vec::new(),
        quantity: 1,
        module_path: parent.module_path.clone(),
        dependencies: vec![parent.resource_id.clone()],
        confidence,
    };
    ErgNode {
        nrg,
        enriched_attributes: AttributeMap::new(),
        provenance: Provenance::Implicit,
        parent_resource_id: Some(parent.resource_id.clone()),
        aws_account_id: Some(account.to_string()),
        availability_zone: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::describe::MockDescribeClient;
    use core_cache::InMemoryCache;

    fn node_with(attrs: serde_json::Value) -> NrgNode {
        let attributes = match domain_cost_model::AttributeValue::from(attrs) {
            domain_cost_model::AttributeValue::Map(m) => m,
            _ => Default::default(),
        };
        NrgNode {
            resource_id: "r1".to_string(),
            address: "aws_instance.web".to_string(),
            resource_type: "aws_instance".to_string(),
            provider: "aws".to_string(),
            region: Some("us-east-1".to_string()),
            attributes,
            unknown_attributes: vec![],
            quantity: 1,
            module_path: vec![],
            dependencies: vec![],
            confidence: Confidence::High,
        }
    }

    #[tokio::test]
    async fn synthesizes_root_volume_and_nic_when_no_block_device_declared() {
        let node = node_with(serde_json::json!({"instance_type": "t3.micro"}));
        let mut client = MockDescribeClient::new();
        client
            .expect_describe_instance_type()
            .returning(|_| Box::pin(async { Ok(AttributeMap::new()) }));
        let cache = InMemoryCache::new("test", 100);
        let adapter = ComputeAdapter {
            region: "us-east-1".to_string(),
            account: "acct1".to_string(),
        };

        let outcome = adapter.enrich(&node, &client, &cache).await;
        assert!(outcome
            .implicit
            .iter()
            .any(|n| n.nrg.resource_type == "aws_ebs_volume"));
        assert!(outcome
            .implicit
            .iter()
            .any(|n| n.nrg.resource_type == "aws_network_interface"));
        assert!(!outcome.implicit.iter().any(|n| n.nrg.resource_type == "aws_eip"));
    }

    #[tokio::test]
    async fn public_ip_request_synthesizes_an_eip_node() {
        let node = node_with(serde_json::json!({"associate_public_ip_address": true}));
        let client = MockDescribeClient::new();
        let cache = InMemoryCache::new("test", 100);
        let adapter = ComputeAdapter {
            region: "us-east-1".to_string(),
            account: "acct1".to_string(),
        };
        let outcome = adapter.enrich(&node, &client, &cache).await;
        assert!(outcome.implicit.iter().any(|n| n.nrg.resource_type == "aws_eip"));
    }

    #[tokio::test]
    async fn describe_failure_downgrades_confidence_but_does_not_fail() {
        let node = node_with(serde_json::json!({"instance_type": "t3.micro"}));
        let mut client = MockDescribeClient::new();
        client.expect_describe_instance_type().returning(|_| {
            Box::pin(async { Err(domain_cost_model::PipelineError::UpstreamUnavailable("boom".into())) })
        });
        let cache = InMemoryCache::new("test", 100);
        let adapter = ComputeAdapter {
            region: "us-east-1".to_string(),
            account: "acct1".to_string(),
        };
        let outcome = adapter.enrich(&node, &client, &cache).await;
        assert!(outcome.degraded);
        assert_eq!(outcome.declared.nrg.confidence, Confidence::Low);
    }

    #[test]
    fn implicit_node_parent_points_to_declared_node() {
        let parent = node_with(serde_json::json!({}));
        let erg = synth_implicit(&parent, "volume", 0, "aws_ebs_volume", "acct1", parent.confidence);
        assert_eq!(erg.parent_resource_id, Some(parent.resource_id));
        assert_eq!(erg.provenance, Provenance::Implicit);
    }
}
