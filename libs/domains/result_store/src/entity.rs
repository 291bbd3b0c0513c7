//! Hand-written sea-orm entities for `cost_results` and `audit_log`, matching
//! `libs/migration`'s `m20260112_*`/`m20260113_*` tables exactly. No
//! `core_proc_macros::SeaOrmResource` derive, following `domain_orchestrator::entity`.

pub mod cost_results {
    use std::str::FromStr;

    use domain_cost_model::{Confidence, Fcm, ImmutableCostResult};
    use sea_orm::entity::prelude::*;
    use sea_orm::ActiveValue::Set;
    use serde_json::Value as Json;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "cost_results")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        #[sea_orm(unique)]
        pub job_id: Uuid,
        pub pricing_snapshot: Json,
        pub usage_profile: String,
        pub fcm: Json,
        pub confidence: String,
        pub created_by: Option<String>,
        pub correlation_id: Uuid,
        pub created_at: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    /// `confidence`/`fcm` are stored as plain string/json rather than
    /// replayed through `serde_json::Value` error paths here — a row that
    /// fails to parse is a data-corruption bug, not a normal error path, so
    /// this panics rather than threading a parse error through every caller.
    impl From<Model> for ImmutableCostResult {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                job_id: model.job_id,
                pricing_snapshot: model.pricing_snapshot,
                usage_profile: model.usage_profile,
                fcm: serde_json::from_value(model.fcm)
                    .expect("stored fcm column is not valid Fcm json"),
                confidence: Confidence::from_str(&model.confidence)
                    .expect("stored confidence column is not a valid Confidence"),
                created_by: model.created_by,
                correlation_id: model.correlation_id,
                created_at: model.created_at.into(),
            }
        }
    }

    pub struct NewCostResult {
        pub job_id: Uuid,
        pub pricing_snapshot: Json,
        pub usage_profile: String,
        pub fcm: Fcm,
        pub confidence: Confidence,
        pub created_by: Option<String>,
        pub correlation_id: Uuid,
    }

    impl From<NewCostResult> for ActiveModel {
        fn from(input: NewCostResult) -> Self {
            ActiveModel {
                id: Set(Uuid::now_v7()),
                job_id: Set(input.job_id),
                pricing_snapshot: Set(input.pricing_snapshot),
                usage_profile: Set(input.usage_profile),
                fcm: Set(serde_json::to_value(&input.fcm).expect("Fcm always serializes")),
                confidence: Set(input.confidence.to_string()),
                created_by: Set(input.created_by),
                correlation_id: Set(input.correlation_id),
                created_at: Set(chrono::Utc::now().into()),
            }
        }
    }
}

pub mod audit_log {
    use domain_cost_model::{AuditAction, AuditLogEntry};
    use sea_orm::entity::prelude::*;
    use sea_orm::ActiveValue::Set;
    use serde_json::Value as Json;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "audit_log")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub action: AuditAction,
        pub actor: Option<String>,
        pub correlation_id: Option<Uuid>,
        pub input_data: Option<Json>,
        pub outcome: Option<Json>,
        pub timestamp: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for AuditLogEntry {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                action: model.action,
                actor: model.actor,
                correlation_id: model.correlation_id,
                input_data: model.input_data,
                outcome: model.outcome,
                timestamp: model.timestamp.into(),
            }
        }
    }

    pub struct NewAuditLogEntry {
        pub action: AuditAction,
        pub actor: Option<String>,
        pub correlation_id: Option<Uuid>,
        pub input_data: Option<Json>,
        pub outcome: Option<Json>,
    }

    impl From<NewAuditLogEntry> for ActiveModel {
        fn from(input: NewAuditLogEntry) -> Self {
            ActiveModel {
                id: Set(Uuid::now_v7()),
                action: Set(input.action),
                actor: Set(input.actor),
                correlation_id: Set(input.correlation_id),
                input_data: Set(input.input_data),
                outcome: Set(input.outcome),
                timestamp: Set(chrono::Utc::now().into()),
            }
        }
    }
}
