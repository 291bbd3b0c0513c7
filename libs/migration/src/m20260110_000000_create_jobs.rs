use sea_orm_migration::sea_query::extension::postgres::Type;
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(JobState::Enum)
                    .values([
                        JobState::Uploaded,
                        JobState::Planning,
                        JobState::Parsing,
                        JobState::Enriching,
                        JobState::Costing,
                        JobState::Completed,
                        JobState::Failed,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_type(
                Type::create()
                    .as_enum(StageName::Enum)
                    .values([
                        StageName::Planning,
                        StageName::Parsing,
                        StageName::Enriching,
                        StageName::Costing,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_type(
                Type::create()
                    .as_enum(StageStatus::Enum)
                    .values([StageStatus::Running, StageStatus::Success, StageStatus::Failed])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Jobs::Table)
                    .if_not_exists()
                    .col(pk_uuid(Jobs::Id))
                    .col(string(Jobs::UploadReference))
                    .col(string_len(Jobs::Region, 100))
                    .col(string(Jobs::UsageProfile))
                    .col(string_len_null(Jobs::IdempotencyKey, 255))
                    .col(uuid(Jobs::CorrelationId))
                    .col(
                        ColumnDef::new(Jobs::CurrentState)
                            .enumeration(
                                JobState::Enum,
                                [
                                    JobState::Uploaded,
                                    JobState::Planning,
                                    JobState::Parsing,
                                    JobState::Enriching,
                                    JobState::Costing,
                                    JobState::Completed,
                                    JobState::Failed,
                                ],
                            )
                            .not_null()
                            .default("uploaded"),
                    )
                    .col(
                        ColumnDef::new(Jobs::PreviousState)
                            .enumeration(
                                JobState::Enum,
                                [
                                    JobState::Uploaded,
                                    JobState::Planning,
                                    JobState::Parsing,
                                    JobState::Enriching,
                                    JobState::Costing,
                                    JobState::Completed,
                                    JobState::Failed,
                                ],
                            )
                            .null(),
                    )
                    .col(integer(Jobs::RetryCount).default(0))
                    .col(text_null(Jobs::ErrorMessage))
                    .col(string_len_null(Jobs::PlanReference, 255))
                    .col(string_len_null(Jobs::ResultReference, 255))
                    .col(timestamp_with_time_zone_null(Jobs::StartedAt))
                    .col(timestamp_with_time_zone_null(Jobs::CompletedAt))
                    .col(
                        timestamp_with_time_zone(Jobs::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Jobs::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Idempotency is scoped to non-deleted jobs; jobs are never deleted by users,
        // so a plain unique index over the key is sufficient.
        manager
            .create_index(
                Index::create()
                    .name("idx_jobs_idempotency_key")
                    .table(Jobs::Table)
                    .col(Jobs::IdempotencyKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_jobs_current_state")
                    .table(Jobs::Table)
                    .col(Jobs::CurrentState)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_jobs_correlation_id")
                    .table(Jobs::Table)
                    .col(Jobs::CorrelationId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_jobs_created_at")
                    .table(Jobs::Table)
                    .col(Jobs::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TRIGGER jobs_touch_updated_at
                    BEFORE UPDATE ON jobs
                    FOR EACH ROW
                    EXECUTE FUNCTION util.touch_updated_at()
                "#,
            )
            .await?;

        // Stage executions are an append-only history: one row per attempt, never
        // updated in place once completed_at is set.
        manager
            .create_table(
                Table::create()
                    .table(StageExecutions::Table)
                    .if_not_exists()
                    .col(pk_uuid(StageExecutions::Id))
                    .col(uuid(StageExecutions::JobId))
                    .col(
                        ColumnDef::new(StageExecutions::StageName)
                            .enumeration(
                                StageName::Enum,
                                [
                                    StageName::Planning,
                                    StageName::Parsing,
                                    StageName::Enriching,
                                    StageName::Costing,
                                ],
                            )
                            .not_null(),
                    )
                    .col(integer(StageExecutions::AttemptNumber).default(1))
                    .col(
                        ColumnDef::new(StageExecutions::Status)
                            .enumeration(
                                StageStatus::Enum,
                                [
                                    StageStatus::Running,
                                    StageStatus::Success,
                                    StageStatus::Failed,
                                ],
                            )
                            .not_null()
                            .default("running"),
                    )
                    .col(string(StageExecutions::InputDigest))
                    .col(string_len_null(StageExecutions::OutputDigest, 255))
                    .col(text_null(StageExecutions::ErrorMessage))
                    .col(big_integer_null(StageExecutions::DurationMs))
                    .col(
                        timestamp_with_time_zone(StageExecutions::StartedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(timestamp_with_time_zone_null(StageExecutions::CompletedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_stage_executions_job_id")
                            .from(StageExecutions::Table, StageExecutions::JobId)
                            .to(Jobs::Table, Jobs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_stage_executions_job_id")
                    .table(StageExecutions::Table)
                    .col(StageExecutions::JobId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_stage_executions_job_stage")
                    .table(StageExecutions::Table)
                    .col(StageExecutions::JobId)
                    .col(StageExecutions::StageName)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StageExecutions::Table).to_owned())
            .await?;

        manager
            .get_connection()
            .execute_unprepared("DROP TRIGGER IF EXISTS jobs_touch_updated_at ON jobs")
            .await?;

        manager
            .drop_table(Table::drop().table(Jobs::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(StageStatus::Enum).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(StageName::Enum).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(JobState::Enum).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Jobs {
    Table,
    Id,
    UploadReference,
    Region,
    UsageProfile,
    IdempotencyKey,
    CorrelationId,
    CurrentState,
    PreviousState,
    RetryCount,
    ErrorMessage,
    PlanReference,
    ResultReference,
    StartedAt,
    CompletedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum StageExecutions {
    Table,
    Id,
    JobId,
    StageName,
    AttemptNumber,
    Status,
    InputDigest,
    OutputDigest,
    ErrorMessage,
    DurationMs,
    StartedAt,
    CompletedAt,
}

#[derive(DeriveIden)]
enum JobState {
    #[sea_orm(iden = "job_state")]
    Enum,
    #[sea_orm(iden = "uploaded")]
    Uploaded,
    #[sea_orm(iden = "planning")]
    Planning,
    #[sea_orm(iden = "parsing")]
    Parsing,
    #[sea_orm(iden = "enriching")]
    Enriching,
    #[sea_orm(iden = "costing")]
    Costing,
    #[sea_orm(iden = "completed")]
    Completed,
    #[sea_orm(iden = "failed")]
    Failed,
}

#[derive(DeriveIden)]
enum StageName {
    #[sea_orm(iden = "stage_name")]
    Enum,
    #[sea_orm(iden = "planning")]
    Planning,
    #[sea_orm(iden = "parsing")]
    Parsing,
    #[sea_orm(iden = "enriching")]
    Enriching,
    #[sea_orm(iden = "costing")]
    Costing,
}

#[derive(DeriveIden)]
enum StageStatus {
    #[sea_orm(iden = "stage_status")]
    Enum,
    #[sea_orm(iden = "running")]
    Running,
    #[sea_orm(iden = "success")]
    Success,
    #[sea_orm(iden = "failed")]
    Failed,
}
