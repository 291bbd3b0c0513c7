//! Async submit/poll/result/cancel worker per spec §4.3, grounded on
//! `terraform-executor/app/executor.py`'s `TerraformExecutor.execute`
//! pipeline (init → validate → plan → show), translated from a blocking
//! `subprocess.run` worker into a `tokio::process::Command` pipeline with
//! per-stage timeouts plus a top-level wall-clock alarm.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::process::Command;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::credentials::CredentialBroker;
use crate::error::{ExecutorError, ExecutorResult};
use crate::models::{
    ExecuteRequest, ExecutionRecord, ExecutionResultView, ExecutionStatus, ExecutionStatusView,
};
use crate::validation::validate_files;
use crate::workspace::Workspace;

/// Configuration enumerated in spec §6: `{max_execution_time,
/// max_workspace_size_mb, allowed_providers[], block_local_exec,
/// block_external_data}`, plus the per-stage timeout applied to each of
/// init/validate/plan/show individually.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub workspace_root: PathBuf,
    pub stage_timeout: Duration,
    pub max_execution_time: Duration,
    pub max_workspace_size_bytes: u64,
    pub allowed_providers: Vec<String>,
}

pub struct PlanExecutor {
    config: ExecutorConfig,
    broker: Arc<dyn CredentialBroker>,
    executions: RwLock<HashMap<Uuid, Arc<Mutex<ExecutionRecord>>>>,
}

impl PlanExecutor {
    pub fn new(config: ExecutorConfig, broker: Arc<dyn CredentialBroker>) -> Self {
        Self {
            config,
            broker,
            executions: RwLock::new(HashMap::new()),
        }
    }

    /// Enqueues an execution and immediately returns its id; the pipeline
    /// runs on a spawned task so `submit` never blocks the caller.
    pub async fn submit(self: &Arc<Self>, request: ExecuteRequest) -> ExecutionStatusView {
        let execution_id = Uuid::now_v7();
        let record = Arc::new(Mutex::new(ExecutionRecord::pending(execution_id, request.job_id)));
        self.executions.write().await.insert(execution_id, record.clone());

        let worker = self.clone();
        tokio::spawn(async move {
            worker.run(execution_id, record, request).await;
        });

        ExecutionStatusView {
            execution_id,
            status: ExecutionStatus::Pending,
            started_at: None,
            completed_at: None,
            duration_ms: None,
            error_message: None,
        }
    }

    pub async fn status(&self, execution_id: Uuid) -> ExecutorResult<ExecutionStatusView> {
        let record = self.get_record(execution_id).await?;
        let record = record.lock().await;
        Ok(ExecutionStatusView {
            execution_id,
            status: record.status,
            started_at: record.started_at,
            completed_at: record.completed_at,
            duration_ms: record.duration_ms,
            error_message: record.error_message.clone(),
        })
    }

    pub async fn result(&self, execution_id: Uuid) -> ExecutorResult<ExecutionResultView> {
        let record = self.get_record(execution_id).await?;
        let record = record.lock().await;
        if !record.status.is_terminal() {
            return Err(ExecutorError::Conflict(format!(
                "execution {execution_id} has not reached a terminal state"
            )));
        }
        Ok(ExecutionResultView {
            status: record.status,
            plan_document: record.plan_document.clone(),
            error_message: record.error_message.clone(),
        })
    }

    /// Marks the execution `KILLED`; the running task observes this on its
    /// next check and terminates without completing further stages.
    pub async fn cancel(&self, execution_id: Uuid) -> ExecutorResult<()> {
        let record = self.get_record(execution_id).await?;
        let mut record = record.lock().await;
        if record.status.is_terminal() {
            return Ok(());
        }
        record.cancelled = true;
        Ok(())
    }

    async fn get_record(&self, execution_id: Uuid) -> ExecutorResult<Arc<Mutex<ExecutionRecord>>> {
        self.executions
            .read()
            .await
            .get(&execution_id)
            .cloned()
            .ok_or_else(|| ExecutorError::NotFound(format!("execution {execution_id}")))
    }

    async fn run(&self, execution_id: Uuid, record: Arc<Mutex<ExecutionRecord>>, request: ExecuteRequest) {
        {
            let mut record = record.lock().await;
            record.status = ExecutionStatus::Running;
            record.started_at = Some(Utc::now());
        }

        // The workspace is created outside the timeout and destroyed
        // unconditionally after it resolves, so a wall-clock-ceiling hit
        // that drops the in-flight pipeline future partway through a stage
        // still leaves no workspace directory behind (spec §4.3 item 8).
        let workspace = match Workspace::create(&self.config.workspace_root, execution_id).await {
            Ok(workspace) => workspace,
            Err(err) => {
                let mut record = record.lock().await;
                record.completed_at = Some(Utc::now());
                record.duration_ms = record
                    .started_at
                    .map(|started| (Utc::now() - started).num_milliseconds());
                record.status = ExecutionStatus::Failed;
                record.error_message = Some(err.to_string());
                return;
            }
        };

        let outcome = tokio::time::timeout(
            self.config.max_execution_time,
            self.run_pipeline_in_workspace(&workspace, &request),
        )
        .await;

        workspace.destroy().await;

        let mut record = record.lock().await;
        record.completed_at = Some(Utc::now());
        record.duration_ms = record
            .started_at
            .map(|started| (Utc::now() - started).num_milliseconds());

        if record.cancelled {
            record.status = ExecutionStatus::Killed;
            record.error_message = Some("execution cancelled".to_string());
            return;
        }

        match outcome {
            Err(_elapsed) => {
                record.status = ExecutionStatus::Timeout;
                record.error_message = Some(format!(
                    "execution exceeded wall-clock ceiling of {}s",
                    self.config.max_execution_time.as_secs()
                ));
            }
            Ok(Ok(plan_document)) => {
                record.status = ExecutionStatus::Completed;
                record.plan_document = Some(plan_document);
            }
            Ok(Err(err)) => {
                record.status = ExecutionStatus::Failed;
                record.error_message = Some(err.to_string());
            }
        }
    }

    async fn run_pipeline_in_workspace(
        &self,
        workspace: &Workspace,
        request: &ExecuteRequest,
    ) -> ExecutorResult<serde_json::Value> {
        let files: Vec<(String, Vec<u8>)> = request
            .iac_source
            .files
            .iter()
            .map(|f| (f.path.clone(), f.contents.clone().into_bytes()))
            .collect();
        workspace.copy_files(&files).await?;

        let size = workspace.total_size_bytes().await?;
        if size > self.config.max_workspace_size_bytes {
            return Err(ExecutorError::ValidationFailure(format!(
                "workspace size {size} exceeds ceiling of {}",
                self.config.max_workspace_size_bytes
            )));
        }

        let tf_contents: ExecutorResult<Vec<(String, String)>> = workspace
            .tf_file_paths_sync()?
            .into_iter()
            .map(|path| {
                let text = std::fs::read_to_string(&path)?;
                Ok((path.display().to_string(), text))
            })
            .collect();
        validate_files(&tf_contents?, &self.config.allowed_providers)?;

        let session = self.broker.resolve(request.credential_reference.as_deref()).await?;

        self.run_stage(workspace, &session.env, &["init", "-backend=false", "-no-color"])
            .await?;
        self.run_stage(workspace, &session.env, &["validate", "-no-color"])
            .await?;
        self.run_stage(workspace, &session.env, &["plan", "-out=tfplan", "-no-color"])
            .await?;
        let show_output = self
            .run_stage_capturing(workspace, &session.env, &["show", "-json", "tfplan"])
            .await?;

        serde_json::from_str(&show_output)
            .map_err(|err| ExecutorError::SubprocessFailure(format!("malformed plan JSON: {err}")))
    }

    async fn run_stage(
        &self,
        workspace: &Workspace,
        env: &crate::credentials::SubprocessEnv,
        args: &[&str],
    ) -> ExecutorResult<()> {
        self.run_stage_capturing(workspace, env, args).await.map(|_| ())
    }

    async fn run_stage_capturing(
        &self,
        workspace: &Workspace,
        env: &crate::credentials::SubprocessEnv,
        args: &[&str],
    ) -> ExecutorResult<String> {
        let mut command = Command::new("terraform");
        command.args(args).current_dir(&workspace.path).kill_on_drop(true);
        for (key, value) in env.iter() {
            command.env(key, value);
        }

        let output = tokio::time::timeout(self.config.stage_timeout, command.output())
            .await
            .map_err(|_| ExecutorError::Timeout(format!("terraform {} timed out", args.join(" "))))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExecutorError::SubprocessFailure(format!(
                "terraform {} exited with {}: {}",
                args.join(" "),
                output.status,
                stderr
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
