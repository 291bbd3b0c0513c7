use std::time::Instant;

use core_cache::Cache;
use domain_cost_model::{
    AttributeMap, EnrichedResourceGraph, EnrichmentMetadata, ErgNode, NormalizedResourceGraph,
    Provenance,
};
use futures::stream::{self, StreamExt};

use crate::adapter::ServiceAdapter;
use crate::describe::DescribeClient;

/// Default bound on describe-* calls in flight at once, absent an explicit
/// `with_concurrency`. Mirrors the per-adapter semaphore bound the original
/// enrichment orchestrator applied to its describe-API fan-out.
const DEFAULT_ADAPTER_CONCURRENCY: usize = 8;

enum DispatchOutcome {
    Adapter(crate::adapter::AdapterOutcome),
    Passthrough(ErgNode),
}

/// Dispatches each node of a normalized resource graph to the first adapter
/// that claims its resource type, falling back to a pass-through DECLARED
/// node (no enrichment, no synthesis) for types no adapter handles.
///
/// Node dispatch runs with up to `adapter_concurrency` describe lookups in
/// flight at once, bounding load on the provider's describe endpoints for
/// graphs with many nodes.
pub struct MetadataResolver {
    adapters: Vec<Box<dyn ServiceAdapter>>,
    adapter_concurrency: usize,
}

impl MetadataResolver {
    pub fn new(adapters: Vec<Box<dyn ServiceAdapter>>) -> Self {
        Self {
            adapters,
            adapter_concurrency: DEFAULT_ADAPTER_CONCURRENCY,
        }
    }

    pub fn with_concurrency(adapters: Vec<Box<dyn ServiceAdapter>>, adapter_concurrency: usize) -> Self {
        Self {
            adapters,
            adapter_concurrency: adapter_concurrency.max(1),
        }
    }

    pub async fn enrich(
        &self,
        nrg: &NormalizedResourceGraph,
        client: &dyn DescribeClient,
        cache: &dyn Cache,
    ) -> EnrichedResourceGraph {
        let started = Instant::now();

        let outcomes: Vec<DispatchOutcome> = stream::iter(nrg.nodes.iter())
            .map(|node| async move {
                match self.adapters.iter().find(|a| a.handles(&node.resource_type)) {
                    Some(adapter) => DispatchOutcome::Adapter(adapter.enrich(node, client, cache).await),
                    None => DispatchOutcome::Passthrough(passthrough(node)),
                }
            })
            .buffered(self.adapter_concurrency)
            .collect()
            .await;

        let mut nodes = Vec::with_capacity(nrg.nodes.len());
        let mut implicit_count = 0usize;
        let mut enriched_count = 0usize;
        let mut failed_count = 0usize;
        let mut total_api_calls = 0usize;
        let mut total_cache_hits = 0usize;
        let mut total_lookups = 0usize;

        for outcome in outcomes {
            match outcome {
                DispatchOutcome::Adapter(outcome) => {
                    total_api_calls += outcome.api_calls;
                    total_cache_hits += outcome.cache_hits;
                    total_lookups += outcome.api_calls + outcome.cache_hits;
                    if outcome.degraded {
                        failed_count += 1;
                    } else if !outcome.declared.enriched_attributes.is_empty() {
                        enriched_count += 1;
                    }
                    implicit_count += outcome.implicit.len();
                    nodes.push(outcome.declared);
                    nodes.extend(outcome.implicit);
                }
                DispatchOutcome::Passthrough(node) => nodes.push(node),
            }
        }

        let cache_hit_rate = if total_lookups == 0 {
            0.0
        } else {
            total_cache_hits as f64 / total_lookups as f64
        };

        let declared_count = nodes
            .iter()
            .filter(|n| n.provenance == Provenance::Declared)
            .count();

        let metadata = EnrichmentMetadata {
            total: nodes.len(),
            declared: declared_count,
            implicit: implicit_count,
            enriched_count,
            failed_count,
            cache_hit_rate,
            api_calls: total_api_calls,
            duration_ms: started.elapsed().as_millis() as u64,
        };

        EnrichedResourceGraph { nodes, metadata }
    }
}

fn passthrough(node: &domain_cost_model::NrgNode) -> ErgNode {
    ErgNode {
        nrg: node.clone(),
        enriched_attributes: AttributeMap::new(),
        provenance: Provenance::Declared,
        parent_resource_id: None,
        aws_account_id: None,
        availability_zone: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::ComputeAdapter;
    use crate::describe::MockDescribeClient;
    use core_cache::InMemoryCache;
    use domain_cost_model::{Confidence, InterpretationMetadata};
    use std::collections::BTreeMap;

    fn nrg_with(nodes: Vec<domain_cost_model::NrgNode>) -> NormalizedResourceGraph {
        NormalizedResourceGraph {
            nodes,
            metadata: InterpretationMetadata {
                plan_hash: "h".to_string(),
                total_resources: 1,
                by_type: BTreeMap::new(),
                unknown_count: 0,
                max_module_depth: 0,
                timestamp: chrono::Utc::now(),
            },
            unresolved_dependencies: vec![],
        }
    }

    fn unhandled_node() -> domain_cost_model::NrgNode {
        domain_cost_model::NrgNode {
            resource_id: "r1".to_string(),
            address: "aws_s3_bucket.logs".to_string(),
            resource_type: "aws_s3_bucket".to_string(),
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
    async fn unhandled_resource_type_passes_through_unenriched() {
        let nrg = nrg_with(vec![unhandled_node()]);
        let resolver = MetadataResolver::new(vec![]);
        let client = MockDescribeClient::new();
        let cache = InMemoryCache::new("test", 10);
        let erg = resolver.enrich(&nrg, &client, &cache).await;
        assert_eq!(erg.nodes.len(), 1);
        assert_eq!(erg.metadata.implicit, 0);
        assert_eq!(erg.metadata.declared, 1);
    }

    #[tokio::test]
    async fn compute_node_produces_implicit_siblings() {
        let mut node = unhandled_node();
        node.resource_type = "aws_instance".to_string();
        node.address = "aws_instance.web".to_string();
        let nrg = nrg_with(vec![node]);
        let resolver = MetadataResolver::new(vec![Box::new(ComputeAdapter {
            region: "us-east-1".to_string(),
            account: "acct1".to_string(),
        })]);
        let mut client = MockDescribeClient::new();
        client
            .expect_describe_instance_type()
            .returning(|_| Box::pin(async { Ok(AttributeMap::new()) }));
        let cache = InMemoryCache::new("test", 10);
        let erg = resolver.enrich(&nrg, &client, &cache).await;
        assert!(erg.metadata.implicit > 0);
        assert_eq!(erg.metadata.total, 1 + erg.metadata.implicit);
    }
}
