//! Stage/job metrics for the cost estimation pipeline (orchestrator,
//! plan executor, pricing and metadata caches). Mirrors `pricing.rs`'s
//! counter/histogram/gauge recorder pattern.

use metrics::{counter, gauge, histogram};

pub struct CostPipelineMetrics;

impl CostPipelineMetrics {
    /// Record a stage execution finishing, successfully or not.
    pub fn record_stage_completed(stage: &str, success: bool, duration_ms: u64) {
        counter!(
            "cost_pipeline_stage_executions_total",
            "stage" => stage.to_string(),
            "status" => if success { "success" } else { "failed" }
        )
        .increment(1);

        histogram!("cost_pipeline_stage_duration_seconds", "stage" => stage.to_string())
            .record(duration_ms as f64 / 1000.0);
    }

    /// Record a stage retry attempt.
    pub fn record_stage_retry(stage: &str, attempt_number: i32) {
        counter!("cost_pipeline_stage_retries_total", "stage" => stage.to_string()).increment(1);
        tracing::warn!(stage = stage, attempt_number = attempt_number, "stage retry");
    }

    /// Record a job reaching a terminal state.
    pub fn record_job_terminal(state: &str) {
        counter!("cost_pipeline_jobs_total", "state" => state.to_string()).increment(1);
    }

    /// Set the number of jobs currently non-terminal, observed by the
    /// orchestrator's poller each sweep.
    pub fn set_active_jobs(count: usize) {
        gauge!("cost_pipeline_active_jobs").set(count as f64);
    }

    /// Record a cache lookup outcome for a read-through cache (region,
    /// instance-type, catalog document, per-resource describe).
    pub fn record_cache_lookup(cache: &str, hit: bool) {
        counter!(
            "cost_pipeline_cache_lookups_total",
            "cache" => cache.to_string(),
            "outcome" => if hit { "hit" } else { "miss" }
        )
        .increment(1);
    }

    /// Record a distributed lock acquisition attempt.
    pub fn record_lock_acquire(acquired: bool) {
        counter!(
            "cost_pipeline_lock_acquisitions_total",
            "outcome" => if acquired { "acquired" } else { "contended" }
        )
        .increment(1);
    }
}
