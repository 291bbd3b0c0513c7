//! Shared vocabulary for the cost-estimation pipeline: the types every
//! stage crate (plan interpreter, metadata resolver, pricing resolver,
//! usage modeler, cost engine, orchestrator, result store) passes between
//! each other, plus the one error type they all raise.

pub mod attribute;
pub mod confidence;
pub mod cost;
pub mod error;
pub mod graph;
pub mod job;
pub mod money;

pub use attribute::{AttributeMap, AttributeValue};
pub use confidence::Confidence;
pub use cost::{
    AggregatedCost, AuditAction, AuditLogEntry, CostDimension, Fcm, GateOutcome, GateResult,
    GroupBy, ImmutableCostResult, PolicyViolation, ResourceCost, ScenarioDiff, TotalCost,
};
pub use error::PipelineError;
pub use graph::{
    EnrichedResourceGraph, EnrichmentMetadata, ErgNode, InterpretationMetadata,
    NormalizedResourceGraph, NrgNode, OverrideTier, Provenance, Scenario,
    UsageAnnotatedResourceGraph, UsageAnnotation, UsageOverride, UnresolvedDependency,
};
pub use job::{CreateJob, Job, JobState, StageExecution, StageName, StagePolicy, StageStatus};
pub use money::{Currency, Money};
