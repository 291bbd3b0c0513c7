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
                    .as_enum(AuditAction::Enum)
                    .values([
                        AuditAction::Persist,
                        AuditAction::Compare,
                        AuditAction::PolicyEval,
                        AuditAction::Gate,
                    ])
                    .to_owned(),
            )
            .await?;

        // Append-only: no update path is exposed by the repository, and there is no
        // updated_at column to touch.
        manager
            .create_table(
                Table::create()
                    .table(AuditLog::Table)
                    .if_not_exists()
                    .col(pk_uuid(AuditLog::Id))
                    .col(
                        ColumnDef::new(AuditLog::Action)
                            .enumeration(
                                AuditAction::Enum,
                                [
                                    AuditAction::Persist,
                                    AuditAction::Compare,
                                    AuditAction::PolicyEval,
                                    AuditAction::Gate,
                                ],
                            )
                            .not_null(),
                    )
                    .col(string_len_null(AuditLog::Actor, 255))
                    .col(uuid_null(AuditLog::CorrelationId))
                    .col(json_binary_null(AuditLog::InputData))
                    .col(json_binary_null(AuditLog::Outcome))
                    .col(
                        timestamp_with_time_zone(AuditLog::Timestamp)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_audit_log_correlation_id")
                    .table(AuditLog::Table)
                    .col(AuditLog::CorrelationId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_audit_log_action")
                    .table(AuditLog::Table)
                    .col(AuditLog::Action)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuditLog::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(AuditAction::Enum).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum AuditLog {
    Table,
    Id,
    Action,
    Actor,
    CorrelationId,
    InputData,
    Outcome,
    Timestamp,
}

#[derive(DeriveIden)]
enum AuditAction {
    #[sea_orm(iden = "audit_action")]
    Enum,
    #[sea_orm(iden = "persist")]
    Persist,
    #[sea_orm(iden = "compare")]
    Compare,
    #[sea_orm(iden = "policy_eval")]
    PolicyEval,
    #[sea_orm(iden = "gate")]
    Gate,
}
