//! `StagePipeline` implementation wiring the orchestrator's four stages to
//! the other stage services over HTTP. The interpreter, metadata resolver,
//! pricing resolver, usage modeler, and cost engine are pure/stateless
//! request-response services (see their own crates); this module is the
//! only place that carries a plan/NRG/ERG artifact from one stage call to
//! the next, because `Job` itself only persists the plan/result
//! references spec §3 names.
//!
//! Intermediate artifacts are cached in Redis keyed by `job_id`, not
//! persisted durably: they are pipeline scratch state, not part of the
//! immutable result spec §3 defines, and are naturally superseded the next
//! time a job reaches that stage (jobs never replay a stage once past it).

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use core_cache::{Cache, RedisCache};
use domain_cost_engine::{AggregateRequest, AggregateResponse, PriceRecordInput};
use domain_cost_model::{
    EnrichedResourceGraph, ErgNode, Job, NormalizedResourceGraph, PipelineError,
};
use domain_orchestrator::StagePipeline;
use domain_pricing_resolver::{LookupRequest, LookupResponse};
use domain_result_store::StoreRequest;
use domain_usage_modeler::handlers::ApplyRequest;
use redis::aio::ConnectionManager;
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

const ARTIFACT_TTL_SECONDS: u64 = 24 * 60 * 60;

pub struct HttpStagePipeline {
    http: reqwest::Client,
    plan_executor_url: String,
    cost_pipeline_api_url: String,
    uploads_root: String,
    artifacts: RedisCache,
}

impl HttpStagePipeline {
    pub fn new(
        plan_executor_url: String,
        cost_pipeline_api_url: String,
        uploads_root: String,
        redis: ConnectionManager,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            plan_executor_url,
            cost_pipeline_api_url,
            uploads_root,
            artifacts: RedisCache::new("pipeline-artifact", redis),
        }
    }

    async fn put_artifact<T: Serialize>(&self, job_id: Uuid, kind: &str, value: &T) -> Result<(), PipelineError> {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| PipelineError::Internal(format!("serialize {kind}: {e}")))?;
        self.artifacts
            .set(&artifact_key(job_id, kind), bytes, ARTIFACT_TTL_SECONDS)
            .await
            .map_err(|e| PipelineError::Internal(format!("cache write {kind}: {e}")))
    }

    async fn get_artifact<T: DeserializeOwned>(&self, job_id: Uuid, kind: &str) -> Result<T, PipelineError> {
        let bytes = self
            .artifacts
            .get(&artifact_key(job_id, kind))
            .await
            .map_err(|e| PipelineError::Internal(format!("cache read {kind}: {e}")))?
            .ok_or_else(|| {
                PipelineError::Internal(format!("missing {kind} artifact for job {job_id}"))
            })?;
        serde_json::from_slice(&bytes)
            .map_err(|e| PipelineError::Internal(format!("deserialize {kind}: {e}")))
    }
}

fn artifact_key(job_id: Uuid, kind: &str) -> String {
    format!("job:{job_id}:{kind}")
}

/// Reads every regular file under `uploads_root/<upload_reference>` into an
/// inline `IacSource`, the stand-in for the out-of-scope upload gateway
/// (spec §1 lists upload handling as an external collaborator). Paths are
/// recorded relative to the bundle root, mirroring `Workspace::copy_files`'s
/// own relative-path convention.
fn load_iac_source(
    uploads_root: &str,
    upload_reference: &str,
) -> Result<domain_plan_executor_models::IacSource, PipelineError> {
    let bundle_root = Path::new(uploads_root).join(upload_reference);
    if !bundle_root.is_dir() {
        return Err(PipelineError::NotFound(format!(
            "upload bundle not found: {upload_reference}"
        )));
    }

    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(&bundle_root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        let relative = entry
            .path()
            .strip_prefix(&bundle_root)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace('\\', "/");
        let contents = std::fs::read_to_string(entry.path())
            .map_err(|e| PipelineError::Internal(format!("reading {relative}: {e}")))?;
        files.push(domain_plan_executor_models::IacFile {
            path: relative,
            contents,
        });
    }

    Ok(domain_plan_executor_models::IacSource { files })
}

#[async_trait]
impl StagePipeline for HttpStagePipeline {
    async fn plan(&self, job: &Job) -> Result<String, PipelineError> {
        let iac_source = load_iac_source(&self.uploads_root, &job.upload_reference)?;

        let request = domain_plan_executor_models::ExecuteRequest {
            job_id: job.id,
            iac_source,
            variables: Default::default(),
            credential_reference: None,
        };

        let status: domain_plan_executor_models::ExecutionStatusView = self
            .http
            .post(format!("{}/api/execute", self.plan_executor_url))
            .json(&request)
            .send()
            .await
            .map_err(upstream)?
            .json()
            .await
            .map_err(upstream)?;

        let execution_id = status.execution_id;
        let terminal = poll_until_terminal(&self.http, &self.plan_executor_url, execution_id).await?;

        if !matches!(terminal.status, domain_plan_executor_models::ExecutionStatus::Completed) {
            return Err(PipelineError::SubprocessFailure(
                terminal
                    .error_message
                    .unwrap_or_else(|| format!("execution ended in {:?}", terminal.status)),
            ));
        }

        let result: domain_plan_executor_models::ExecutionResultView = self
            .http
            .get(format!(
                "{}/api/result/{execution_id}",
                self.plan_executor_url
            ))
            .send()
            .await
            .map_err(upstream)?
            .json()
            .await
            .map_err(upstream)?;

        let plan_document = result
            .plan_document
            .ok_or_else(|| PipelineError::SubprocessFailure("no plan document produced".into()))?;

        self.put_artifact(job.id, "plan_document", &plan_document).await?;
        Ok(execution_id.to_string())
    }

    async fn parse(&self, job: &Job) -> Result<String, PipelineError> {
        let plan_document: serde_json::Value = self.get_artifact(job.id, "plan_document").await?;

        let nrg: NormalizedResourceGraph = self
            .http
            .post(format!("{}/api/interpret", self.cost_pipeline_api_url))
            .json(&plan_document)
            .send()
            .await
            .map_err(upstream)?
            .json()
            .await
            .map_err(upstream)?;

        let plan_hash = nrg.metadata.plan_hash.clone();
        self.put_artifact(job.id, "nrg", &nrg).await?;
        Ok(plan_hash)
    }

    async fn enrich(&self, job: &Job) -> Result<String, PipelineError> {
        let nrg: NormalizedResourceGraph = self.get_artifact(job.id, "nrg").await?;

        let erg: EnrichedResourceGraph = self
            .http
            .post(format!("{}/api/enrich", self.cost_pipeline_api_url))
            .json(&nrg)
            .send()
            .await
            .map_err(upstream)?
            .json()
            .await
            .map_err(upstream)?;

        let summary = format!(
            "{} resources ({} implicit)",
            erg.metadata.total, erg.metadata.implicit
        );
        self.put_artifact(job.id, "erg", &erg).await?;
        Ok(summary)
    }

    async fn cost(&self, job: &Job) -> Result<String, PipelineError> {
        let erg: EnrichedResourceGraph = self.get_artifact(job.id, "erg").await?;

        let pricing_records = self.lookup_prices(&job.region, &erg.nodes).await?;

        let apply_request = ApplyRequest {
            nodes: erg.nodes.clone(),
            profile_name: job.usage_profile.clone(),
            overrides: Vec::new(),
        };
        let uarg: domain_cost_model::UsageAnnotatedResourceGraph = self
            .http
            .post(format!("{}/api/apply", self.cost_pipeline_api_url))
            .json(&apply_request)
            .send()
            .await
            .map_err(upstream)?
            .json()
            .await
            .map_err(upstream)?;

        let aggregate_request = AggregateRequest {
            resources: erg.nodes,
            pricing_records,
            usage_records: uarg.annotations,
            currency: domain_cost_model::Currency::Usd,
            precision: 2,
        };
        let aggregate: AggregateResponse = self
            .http
            .post(format!("{}/api/aggregate", self.cost_pipeline_api_url))
            .json(&aggregate_request)
            .send()
            .await
            .map_err(upstream)?
            .json()
            .await
            .map_err(upstream)?;

        let confidence = aggregate.fcm.overall_confidence;
        let store_request = StoreRequest {
            job_id: job.id,
            pricing_snapshot: serde_json::to_value(&aggregate.fcm.resource_costs)
                .unwrap_or(serde_json::Value::Null),
            usage_profile: job.usage_profile.clone(),
            fcm: aggregate.fcm,
            confidence,
            created_by: None,
            correlation_id: job.correlation_id,
        };

        let stored: domain_cost_model::ImmutableCostResult = self
            .http
            .post(format!("{}/api/results/store", self.cost_pipeline_api_url))
            .json(&store_request)
            .send()
            .await
            .map_err(upstream)?
            .json()
            .await
            .map_err(upstream)?;

        Ok(stored.id.to_string())
    }
}

impl HttpStagePipeline {
    /// One `/lookup` call per resource; unmatched resources get no pricing
    /// record and the cost engine falls back to its own zero-scenario
    /// handling for them (spec §4.8 step 1, "match by resource_id").
    async fn lookup_prices(
        &self,
        region: &str,
        nodes: &[ErgNode],
    ) -> Result<Vec<PriceRecordInput>, PipelineError> {
        let mut records = Vec::new();
        for node in nodes {
            let attributes: std::collections::BTreeMap<String, String> = node
                .nrg
                .attributes
                .iter()
                .chain(node.enriched_attributes.iter())
                .filter_map(|(k, v)| v.display_scalar().map(|s| (k.clone(), s)))
                .collect();

            let request = LookupRequest {
                service: node.nrg.provider.clone(),
                region: region.to_string(),
                resource_type: node.nrg.resource_type.clone(),
                attributes,
            };

            let response = self
                .http
                .post(format!("{}/api/lookup", self.cost_pipeline_api_url))
                .json(&request)
                .send()
                .await
                .map_err(upstream)?;

            if response.status() == reqwest::StatusCode::NOT_FOUND {
                continue;
            }

            let lookup: LookupResponse = response.json().await.map_err(upstream)?;
            if let Some(price) = lookup.prices.into_iter().next() {
                records.push(PriceRecordInput {
                    resource_id: node.nrg.resource_id.clone(),
                    dimension: price.unit.clone(),
                    unit: price.unit,
                    unit_price: price.unit_price,
                    sku: price.sku,
                    currency: price.currency,
                    confidence: lookup.confidence,
                });
            }
        }
        Ok(records)
    }
}

async fn poll_until_terminal(
    http: &reqwest::Client,
    plan_executor_url: &str,
    execution_id: Uuid,
) -> Result<domain_plan_executor_models::ExecutionStatusView, PipelineError> {
    loop {
        let status: domain_plan_executor_models::ExecutionStatusView = http
            .get(format!("{plan_executor_url}/api/status/{execution_id}"))
            .send()
            .await
            .map_err(upstream)?
            .json()
            .await
            .map_err(upstream)?;

        if status.status.is_terminal() {
            return Ok(status);
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
}

fn upstream(err: reqwest::Error) -> PipelineError {
    PipelineError::UpstreamUnavailable(err.to_string())
}

mod domain_plan_executor_models {
    pub use domain_plan_executor::{
        ExecuteRequest, ExecutionResultView, ExecutionStatus, ExecutionStatusView, IacFile,
        IacSource,
    };
}
