//! Background sweep that drives non-terminal jobs forward without waiting
//! for an external caller to re-poke them. `Orchestrator::advance` already
//! does all of the locking/retry/transition work; this loop just finds the
//! jobs that need a nudge and calls it once per tick, one stage per job per
//! tick — a job that needs four more stages gets four more ticks, the same
//! cadence a caller hammering `POST /jobs/{id}/advance` would produce.

use std::sync::Arc;
use std::time::Duration;

use domain_orchestrator::Orchestrator;
use observability::CostPipelineMetrics;
use tracing::{error, warn};

pub async fn run(orchestrator: Arc<Orchestrator>, batch_size: u64, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;

        let active = match orchestrator.list_active_jobs(batch_size).await {
            Ok(jobs) => jobs,
            Err(err) => {
                error!(error = %err, "poller failed to list active jobs");
                continue;
            }
        };

        CostPipelineMetrics::set_active_jobs(active.len());

        for job in active {
            let job_id = job.id;
            if let Err(err) = orchestrator.advance(job_id).await {
                warn!(job_id = %job_id, error = %err, "poller advance failed");
            }
        }
    }
}
