use async_trait::async_trait;
use core_cache::Cache;
use domain_cost_model::{ErgNode, NrgNode};

use crate::describe::DescribeClient;

/// One adapter's contribution: the enriched form of the declared node it
/// was given, plus any implicit sub-resources it synthesized.
pub struct AdapterOutcome {
    pub declared: ErgNode,
    pub implicit: Vec<ErgNode>,
    /// Number of describe-* calls this adapter issued (cache misses only;
    /// used to populate `EnrichmentMetadata::api_calls`).
    pub api_calls: usize,
    /// Number of cache lookups that were satisfied locally.
    pub cache_hits: usize,
    /// Whether a describe call failed and the node's confidence was
    /// downgraded as a result (stage still succeeds; the node survives
    /// with whatever attributes are known).
    pub degraded: bool,
}

/// Declares the resource types it handles, enriches declared nodes via
/// cached describe operations, and synthesizes implicit billable
/// sub-resources. Enrichment failures never propagate past this trait's
/// boundary: implementations catch describe errors, downgrade confidence,
/// and still return a usable `AdapterOutcome`.
#[async_trait]
pub trait ServiceAdapter: Send + Sync {
    fn handles(&self, resource_type: &str) -> bool;

    async fn enrich(
        &self,
        node: &NrgNode,
        client: &dyn DescribeClient,
        cache: &dyn Cache,
    ) -> AdapterOutcome;
}
