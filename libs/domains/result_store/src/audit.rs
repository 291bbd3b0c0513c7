//! Construction helpers for audit log entries, grounded on
//! `results-governance-service/app/persistence/audit_repository.py`'s
//! `log_action` call sites in the result/internal routers (every `create`,
//! `compare`, and gate evaluation writes exactly one entry).

use domain_cost_model::AuditAction;
use serde_json::Value as Json;
use uuid::Uuid;

use crate::entity::audit_log::NewAuditLogEntry;

pub fn persisted(actor: Option<String>, correlation_id: Uuid, job_id: Uuid) -> NewAuditLogEntry {
    NewAuditLogEntry {
        action: AuditAction::Persist,
        actor,
        correlation_id: Some(correlation_id),
        input_data: Some(serde_json::json!({ "job_id": job_id })),
        outcome: None,
    }
}

pub fn compared(actor: Option<String>, correlation_id: Uuid, result_id: Uuid, baseline_id: Uuid) -> NewAuditLogEntry {
    NewAuditLogEntry {
        action: AuditAction::Compare,
        actor,
        correlation_id: Some(correlation_id),
        input_data: Some(serde_json::json!({ "result_id": result_id, "baseline_id": baseline_id })),
        outcome: None,
    }
}

pub fn gate_evaluated(
    actor: Option<String>,
    correlation_id: Uuid,
    result_id: Uuid,
    outcome: Json,
) -> NewAuditLogEntry {
    NewAuditLogEntry {
        action: AuditAction::Gate,
        actor,
        correlation_id: Some(correlation_id),
        input_data: Some(serde_json::json!({ "result_id": result_id })),
        outcome: Some(outcome),
    }
}
