//! Sandboxed plan executor worker (spec component C3): isolated workspace,
//! static IaC validation, short-lived credential brokering, and the
//! init/validate/plan/show subprocess pipeline behind an async
//! submit/status/result/cancel contract.

pub mod credentials;
pub mod error;
pub mod executor;
pub mod handlers;
pub mod models;
pub mod validation;
pub mod workspace;

pub use credentials::{AssumeRoleBroker, CredentialBroker, CredentialSession, SubprocessEnv};
pub use error::{ExecutorError, ExecutorResult};
pub use executor::{ExecutorConfig, PlanExecutor};
pub use handlers::ApiDoc;
pub use models::{
    ExecuteRequest, ExecutionResultView, ExecutionStatus, ExecutionStatusView, IacFile, IacSource,
};
