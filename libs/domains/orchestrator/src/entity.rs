//! Hand-written sea-orm entities for `jobs` and `stage_executions`.
//!
//! No `core_proc_macros::SeaOrmResource` derive here — see DESIGN.md for why
//! this crate writes its `From` conversions by hand instead.

pub mod jobs {
    use domain_cost_model::{Job, JobState};
    use sea_orm::entity::prelude::*;
    use sea_orm::ActiveValue::Set;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "jobs")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub upload_reference: String,
        pub region: String,
        pub usage_profile: String,
        pub idempotency_key: Option<String>,
        pub correlation_id: Uuid,
        pub current_state: JobState,
        pub previous_state: Option<JobState>,
        pub retry_count: i32,
        pub error_message: Option<String>,
        pub plan_reference: Option<String>,
        pub result_reference: Option<String>,
        pub started_at: Option<DateTimeWithTimeZone>,
        pub completed_at: Option<DateTimeWithTimeZone>,
        pub created_at: DateTimeWithTimeZone,
        pub updated_at: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::stage_executions::Entity")]
        StageExecutions,
    }

    impl Related<super::stage_executions::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::StageExecutions.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for Job {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                upload_reference: model.upload_reference,
                region: model.region,
                usage_profile: model.usage_profile,
                idempotency_key: model.idempotency_key,
                correlation_id: model.correlation_id,
                current_state: model.current_state,
                previous_state: model.previous_state,
                retry_count: model.retry_count,
                error_message: model.error_message,
                plan_reference: model.plan_reference,
                result_reference: model.result_reference,
                started_at: model.started_at.map(Into::into),
                completed_at: model.completed_at.map(Into::into),
                created_at: model.created_at.into(),
                updated_at: model.updated_at.into(),
            }
        }
    }

    impl From<crate::models::CreateJobRow> for ActiveModel {
        fn from(input: crate::models::CreateJobRow) -> Self {
            let now = chrono::Utc::now();
            ActiveModel {
                id: Set(Uuid::now_v7()),
                upload_reference: Set(input.upload_reference),
                region: Set(input.region),
                usage_profile: Set(input.usage_profile),
                idempotency_key: Set(input.idempotency_key),
                correlation_id: Set(input.correlation_id),
                current_state: Set(JobState::Uploaded),
                previous_state: Set(None),
                retry_count: Set(0),
                error_message: Set(None),
                plan_reference: Set(None),
                result_reference: Set(None),
                started_at: Set(None),
                completed_at: Set(None),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            }
        }
    }
}

pub mod stage_executions {
    use domain_cost_model::{StageExecution, StageName, StageStatus};
    use sea_orm::entity::prelude::*;
    use sea_orm::ActiveValue::Set;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "stage_executions")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub job_id: Uuid,
        pub stage_name: StageName,
        pub attempt_number: i32,
        pub status: StageStatus,
        pub input_digest: String,
        pub output_digest: Option<String>,
        pub error_message: Option<String>,
        pub duration_ms: Option<i64>,
        pub started_at: DateTimeWithTimeZone,
        pub completed_at: Option<DateTimeWithTimeZone>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::jobs::Entity",
            from = "Column::JobId",
            to = "super::jobs::Column::Id"
        )]
        Job,
    }

    impl Related<super::jobs::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Job.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for StageExecution {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                job_id: model.job_id,
                stage_name: model.stage_name,
                attempt_number: model.attempt_number,
                status: model.status,
                input_digest: model.input_digest,
                output_digest: model.output_digest,
                error_message: model.error_message,
                duration_ms: model.duration_ms,
                started_at: model.started_at.into(),
                completed_at: model.completed_at.map(Into::into),
            }
        }
    }

    impl From<crate::models::OpenStageExecution> for ActiveModel {
        fn from(input: crate::models::OpenStageExecution) -> Self {
            ActiveModel {
                id: Set(Uuid::now_v7()),
                job_id: Set(input.job_id),
                stage_name: Set(input.stage_name),
                attempt_number: Set(input.attempt_number),
                status: Set(StageStatus::Running),
                input_digest: Set(input.input_digest),
                output_digest: Set(None),
                error_message: Set(None),
                duration_ms: Set(None),
                started_at: Set(chrono::Utc::now().into()),
                completed_at: Set(None),
            }
        }
    }
}
