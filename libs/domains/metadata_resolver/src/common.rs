use std::future::Future;

use core_cache::Cache;
use domain_cost_model::{AttributeMap, AttributeValue, PipelineError};
use sha2::{Digest, Sha256};

/// Read-through cache wrapper around a single describe call. A cache miss
/// (including a degraded-to-absence read on a backend failure, per the
/// cache abstraction's contract) invokes `fetch` and writes the result
/// through before returning it.
pub async fn cached_attribute_lookup<F>(
    cache: &dyn Cache,
    key: &str,
    ttl_seconds: u64,
    fetch: F,
) -> Result<(AttributeMap, bool), PipelineError>
where
    F: Future<Output = Result<AttributeMap, PipelineError>>,
{
    if let Some(bytes) = cache
        .get(key)
        .await
        .map_err(|e| PipelineError::Internal(e.to_string()))?
    {
        if let Ok(value) = serde_json::from_slice::<serde_json::Value>(&bytes) {
            if let Some(map) = AttributeValue::from(value).as_map() {
                return Ok((map.clone(), true));
            }
        }
    }

    let attrs = fetch.await?;
    let json = serde_json::to_vec(&attrs)
        .map_err(|e| PipelineError::Internal(format!("failed to serialize cache entry: {e}")))?;
    cache
        .set(key, json, ttl_seconds)
        .await
        .map_err(|e| PipelineError::Internal(e.to_string()))?;
    Ok((attrs, false))
}

/// Deterministic id for a synthesized implicit node: a stable hash of the
/// parent's resource id, the kind of sub-resource, and its index among
/// siblings of that kind.
pub fn implicit_resource_id(parent_resource_id: &str, kind: &str, index: usize) -> String {
    let digest = Sha256::digest(format!("{parent_resource_id}:{kind}:{index}").as_bytes());
    format!("{digest:x}")
}
