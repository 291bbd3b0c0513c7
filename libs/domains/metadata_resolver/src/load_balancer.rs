use async_trait::async_trait;
use core_cache::Cache;
use domain_cost_model::{AttributeMap, Confidence, ErgNode, NrgNode, Provenance};
use tracing::warn;

use crate::adapter::{AdapterOutcome, ServiceAdapter};
use crate::common::implicit_resource_id;
use crate::describe::DescribeClient;

/// Enriches load balancers and synthesizes one listener node per discovered
/// listener plus a single capacity-unit tracker node, since both are billed
/// independently of the load balancer resource itself.
pub struct LoadBalancerAdapter {
    pub account: String,
}

#[async_trait]
impl ServiceAdapter for LoadBalancerAdapter {
    fn handles(&self, resource_type: &str) -> bool {
        matches!(
            resource_type,
            "aws_lb" | "aws_alb" | "aws_elb" | "load_balancer"
        )
    }

    async fn enrich(
        &self,
        node: &NrgNode,
        client: &dyn DescribeClient,
        _cache: &dyn Cache,
    ) -> AdapterOutcome {
        let mut api_calls = 0usize;
        let mut degraded = false;

        let listeners = match client.list_load_balancer_listeners(&node.address).await {
            Ok(listeners) => {
                api_calls += 1;
                listeners
            }
            Err(err) => {
                warn!(resource_id = %node.resource_id, error = %err, "listener discovery failed");
                degraded = true;
                Vec::new()
            }
        };

        let confidence = if degraded {
            Confidence::min(node.confidence, Confidence::Low)
        } else {
            node.confidence
        };

        let mut declared = ErgNode {
            nrg: node.clone(),
            enriched_attributes: AttributeMap::new(),
            provenance: Provenance::Declared,
            parent_resource_id: None,
            aws_account_id: Some(self.account.clone()),
            availability_zone: None,
        };
        declared.nrg.confidence = confidence;

        let mut implicit: Vec<ErgNode> = listeners
            .into_iter()
            .enumerate()
            .map(|(idx, attrs)| {
                synth_implicit(node, "listener", idx, "aws_lb_listener", &self.account, attrs, confidence)
            })
            .collect();

        implicit.push(synth_implicit(
            node,
            "capacity_unit",
            0,
            "aws_lb_capacity_unit",
            &self.account,
            AttributeMap::new(),
            confidence,
        ));

        AdapterOutcome {
            declared,
            implicit,
            api_calls,
            cache_hits: 0,
            degraded,
        }
    }
}

fn synth_implicit(
    parent: &NrgNode,
    kind: &str,
    index: usize,
    resource_type: &str,
    account: &str,
    attributes: AttributeMap,
    confidence: Confidence,
) -> ErgNode {
    let resource_id = implicit_resource_id(&parent.resource_id, kind, index);
    let nrg = NrgNode {
        resource_id,
        address: format!("{}.__implicit.{kind}[{index}]", parent.address),
        resource_type: resource_type.to_string(),
        provider: parent.provider.clone(),
        region: parent.region.clone(),
        attributes,
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

    fn lb_node() -> NrgNode {
        NrgNode {
            resource_id: "lb1".to_string(),
            address: "aws_lb.main".to_string(),
            resource_type: "aws_lb".to_string(),
            provider: "aws".to_string(),
            region: Some("us-east-1".to_string()),
            attributes: AttributeMap::new(),
            unknown_attributes: vec![],
            quantity: 1,
            module_path: vec![],
            dependencies: vec![],
            confidence: Confidence::High,
        }
    }

    #[tokio::test]
    async fn one_listener_node_per_discovered_listener() {
        let node = lb_node();
        let mut client = MockDescribeClient::new();
        client.expect_list_load_balancer_listeners().returning(|_| {
            Box::pin(async {
                Ok(vec![AttributeMap::new(), AttributeMap::new(), AttributeMap::new()])
            })
        });
        let cache = InMemoryCache::new("test", 10);
        let adapter = LoadBalancerAdapter {
            account: "acct1".to_string(),
        };
        let outcome = adapter.enrich(&node, &client, &cache).await;
        let listener_count = outcome
            .implicit
            .iter()
            .filter(|n| n.nrg.resource_type == "aws_lb_listener")
            .count();
        assert_eq!(listener_count, 3);
        assert!(outcome
            .implicit
            .iter()
            .any(|n| n.nrg.resource_type == "aws_lb_capacity_unit"));
    }

    #[tokio::test]
    async fn listener_discovery_failure_downgrades_confidence_without_failing() {
        let node = lb_node();
        let mut client = MockDescribeClient::new();
        client
            .expect_list_load_balancer_listeners()
            .returning(|_| {
                Box::pin(async {
                    Err(domain_cost_model::PipelineError::UpstreamUnavailable("boom".into()))
                })
            });
        let cache = InMemoryCache::new("test", 10);
        let adapter = LoadBalancerAdapter {
            account: "acct1".to_string(),
        };
        let outcome = adapter.enrich(&node, &client, &cache).await;
        assert!(outcome.degraded);
        assert_eq!(outcome.declared.nrg.confidence, Confidence::Low);
        assert!(outcome
            .implicit
            .iter()
            .any(|n| n.nrg.resource_type == "aws_lb_capacity_unit"));
    }
}
