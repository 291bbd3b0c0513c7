use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Cost results are write-once: no updated_at, no touch trigger, no update path
        // in the repository layer. `job_id` is unique so a second `create` for the same
        // job is a conflict, never an overwrite.
        manager
            .create_table(
                Table::create()
                    .table(CostResults::Table)
                    .if_not_exists()
                    .col(pk_uuid(CostResults::Id))
                    .col(uuid(CostResults::JobId))
                    .col(json_binary(CostResults::PricingSnapshot).not_null())
                    .col(string(CostResults::UsageProfile))
                    .col(json_binary(CostResults::Fcm).not_null())
                    .col(string_len(CostResults::Confidence, 16))
                    .col(string_len_null(CostResults::CreatedBy, 255))
                    .col(uuid(CostResults::CorrelationId))
                    .col(
                        timestamp_with_time_zone(CostResults::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cost_results_job_id")
                            .from(CostResults::Table, CostResults::JobId)
                            .to(Jobs::Table, Jobs::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cost_results_job_id")
                    .table(CostResults::Table)
                    .col(CostResults::JobId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cost_results_correlation_id")
                    .table(CostResults::Table)
                    .col(CostResults::CorrelationId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CostResults::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum CostResults {
    Table,
    Id,
    JobId,
    PricingSnapshot,
    UsageProfile,
    Fcm,
    Confidence,
    CreatedBy,
    CorrelationId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Jobs {
    Table,
    Id,
}
