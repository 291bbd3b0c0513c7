//! Orchestrator Domain
//!
//! Durable per-job state machine driving a cost-estimation job through
//! `PLANNING -> PARSING -> ENRICHING -> COSTING -> COMPLETED`, enforcing
//! per-stage timeout/retry policy, a distributed leader-lock, and
//! idempotent submission.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────┐
//! │ Orchestrator  │  ← state machine driver, one stage per `advance` call
//! └──────┬────────┘
//!        │
//! ┌──────▼────────┐    ┌──────────┐
//! │ Stage (lock,  │    │  Lock    │  ← Redis SET NX PX + Lua release
//! │ timeout/retry)│    └──────────┘
//! └──────┬────────┘
//!        │
//! ┌──────▼────────┐
//! │  Repository   │  ← Jobs + StageExecutions (trait + Postgres impl)
//! └──────┬────────┘
//!        │
//! ┌──────▼────────┐
//! │    Entity     │  ← sea-orm models
//! └───────────────┘
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod lock;
pub mod models;
pub mod orchestrator;
pub mod postgres;
pub mod repository;
pub mod stage;
pub mod state_machine;

pub use error::{OrchestratorError, OrchestratorResult};
pub use handlers::ApiDoc;
pub use lock::JobLock;
pub use models::{CloseStageExecution, CreateJobRow, JobTransition, OpenStageExecution};
pub use orchestrator::{Orchestrator, StagePipeline, LOCK_TTL_MS};
pub use postgres::{PgJobRepository, PgStageExecutionRepository};
pub use repository::{JobRepository, StageExecutionRepository};
