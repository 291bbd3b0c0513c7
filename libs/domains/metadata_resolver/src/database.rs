use async_trait::async_trait;
use core_cache::Cache;
use domain_cost_model::{AttributeMap, Confidence, ErgNode, NrgNode, Provenance};
use tracing::warn;

use crate::adapter::{AdapterOutcome, ServiceAdapter};
use crate::common::implicit_resource_id;
use crate::describe::DescribeClient;

/// Enriches managed database instances and synthesizes the sub-resources a
/// database implies: a storage node always, a backup-storage node when
/// retention is configured, a multi-AZ replica node when multi-AZ is
/// enabled, and one snapshot node per discovered snapshot.
pub struct DatabaseAdapter {
    pub account: String,
}

#[async_trait]
impl ServiceAdapter for DatabaseAdapter {
    fn handles(&self, resource_type: &str) -> bool {
        matches!(resource_type, "aws_db_instance" | "db_instance")
    }

    async fn enrich(
        &self,
        node: &NrgNode,
        client: &dyn DescribeClient,
        _cache: &dyn Cache,
    ) -> AdapterOutcome {
        let mut api_calls = 0usize;
        let mut degraded = false;

        let snapshots = match client.list_db_snapshots(&node.address).await {
            Ok(snapshots) => {
                api_calls += 1;
                snapshots
            }
            Err(err) => {
                warn!(resource_id = %node.resource_id, error = %err, "snapshot discovery failed");
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
            availability_zone: node
                .attributes
                .get("availability_zone")
                .and_then(|v| v.as_str())
                .map(str::to_string),
        };
        declared.nrg.confidence = confidence;

        let mut implicit = Vec::new();

        implicit.push(synth_node(
            node,
            "storage",
            0,
            "aws_db_storage",
            &self.account,
            confidence,
        ));

        let retention_days = node
            .attributes
            .get("backup_retention_period")
            .and_then(|v| v.as_i64())
            .unwrap_or(0);
        if retention_days > 0 {
            implicit.push(synth_node(
                node,
                "backup_storage",
                0,
                "aws_db_backup_storage",
                &self.account,
                confidence,
            ));
        }

        let is_multi_az = node
            .attributes
            .get("multi_az")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if is_multi_az {
            implicit.push(synth_node(
                node,
                "replica",
                0,
                "aws_db_replica",
                &self.account,
                confidence,
            ));
        }

        for (idx, _snapshot) in snapshots.iter().enumerate() {
            implicit.push(synth_node(
                node,
                "snapshot",
                idx,
                "aws_db_snapshot",
                &self.account,
                confidence,
            ));
        }

        AdapterOutcome {
            declared,
            implicit,
            api_calls,
            cache_hits: 0,
            degraded,
        }
    }
}

fn synth_node(
    parent: &NrgNode,
    kind: &str,
    index: usize,
    resource_type: &str,
    account: &str,
    confidence: Confidence,
) -> ErgNode {
    let resource_id = implicit_resource_id(&parent.resource_id, kind, index);
    let nrg = NrgNode {
        resource_id,
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

    fn db_node(attrs: serde_json::Value) -> NrgNode {
        let attributes = match domain_cost_model::AttributeValue::from(attrs) {
            domain_cost_model::AttributeValue::Map(m) => m,
            _ => Default::default(),
        };
        NrgNode {
            resource_id: "db1".to_string(),
            address: "aws_db_instance.primary".to_string(),
            resource_type: "aws_db_instance".to_string(),
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

    fn no_snapshot_client() -> MockDescribeClient {
        let mut client = MockDescribeClient::new();
        client
            .expect_list_db_snapshots()
            .returning(|_| Box::pin(async { Ok(Vec::new()) }));
        client
    }

    #[tokio::test]
    async fn storage_node_always_present() {
        let node = db_node(serde_json::json!({}));
        let client = no_snapshot_client();
        let cache = InMemoryCache::new("test", 10);
        let adapter = DatabaseAdapter {
            account: "acct1".to_string(),
        };
        let outcome = adapter.enrich(&node, &client, &cache).await;
        assert!(outcome
            .implicit
            .iter()
            .any(|n| n.nrg.resource_type == "aws_db_storage"));
        assert!(!outcome
            .implicit
            .iter()
            .any(|n| n.nrg.resource_type == "aws_db_backup_storage"));
    }

    #[tokio::test]
    async fn retention_and_multi_az_add_backup_and_replica_nodes() {
        let node = db_node(serde_json::json!({"backup_retention_period": 7, "multi_az": true}));
        let client = no_snapshot_client();
        let cache = InMemoryCache::new("test", 10);
        let adapter = DatabaseAdapter {
            account: "acct1".to_string(),
        };
        let outcome = adapter.enrich(&node, &client, &cache).await;
        assert!(outcome
            .implicit
            .iter()
            .any(|n| n.nrg.resource_type == "aws_db_backup_storage"));
        assert!(outcome
            .implicit
            .iter()
            .any(|n| n.nrg.resource_type == "aws_db_replica"));
    }

    #[tokio::test]
    async fn one_snapshot_node_per_discovered_snapshot() {
        let node = db_node(serde_json::json!({}));
        let mut client = MockDescribeClient::new();
        client.expect_list_db_snapshots().returning(|_| {
            Box::pin(async { Ok(vec![AttributeMap::new(), AttributeMap::new()]) })
        });
        let cache = InMemoryCache::new("test", 10);
        let adapter = DatabaseAdapter {
            account: "acct1".to_string(),
        };
        let outcome = adapter.enrich(&node, &client, &cache).await;
        let snapshot_count = outcome
            .implicit
            .iter()
            .filter(|n| n.nrg.resource_type == "aws_db_snapshot")
            .count();
        assert_eq!(snapshot_count, 2);
    }

    #[tokio::test]
    async fn snapshot_discovery_failure_downgrades_confidence_without_failing() {
        let node = db_node(serde_json::json!({}));
        let mut client = MockDescribeClient::new();
        client.expect_list_db_snapshots().returning(|_| {
            Box::pin(async { Err(domain_cost_model::PipelineError::UpstreamUnavailable("boom".into())) })
        });
        let cache = InMemoryCache::new("test", 10);
        let adapter = DatabaseAdapter {
            account: "acct1".to_string(),
        };
        let outcome = adapter.enrich(&node, &client, &cache).await;
        assert!(outcome.degraded);
        assert_eq!(outcome.declared.nrg.confidence, Confidence::Low);
        assert!(outcome
            .implicit
            .iter()
            .any(|n| n.nrg.resource_type == "aws_db_storage"));
    }
}
