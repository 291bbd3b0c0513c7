use async_trait::async_trait;
use domain_cost_model::{AuditAction, AuditLogEntry, ImmutableCostResult};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

use crate::entity::audit_log::{ActiveModel as AuditActiveModel, Column as AuditColumn, Entity as AuditEntity, NewAuditLogEntry};
use crate::entity::cost_results::{
    ActiveModel as CostResultActiveModel, Column as CostResultColumn, Entity as CostResultEntity, NewCostResult,
};
use crate::error::StoreError;
use crate::repository::{AuditRepository, ResultRepository};

#[derive(Clone)]
pub struct PgResultRepository {
    db: DatabaseConnection,
}

impl PgResultRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ResultRepository for PgResultRepository {
    async fn create(
        &self,
        input: NewCostResult,
    ) -> crate::error::StoreResult<ImmutableCostResult> {
        let existing = CostResultEntity::find()
            .filter(CostResultColumn::JobId.eq(input.job_id))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(StoreError::AlreadyExists(input.job_id));
        }

        let model: CostResultActiveModel = input.into();
        let result = model.insert(&self.db).await?.into();
        Ok(result)
    }

    async fn get_by_id(&self, id: Uuid) -> crate::error::StoreResult<Option<ImmutableCostResult>> {
        let result = CostResultEntity::find_by_id(id).one(&self.db).await?.map(Into::into);
        Ok(result)
    }

    async fn get_by_job_id(
        &self,
        job_id: Uuid,
    ) -> crate::error::StoreResult<Option<ImmutableCostResult>> {
        let result = CostResultEntity::find()
            .filter(CostResultColumn::JobId.eq(job_id))
            .one(&self.db)
            .await?
            .map(Into::into);
        Ok(result)
    }

    async fn list_by_project(
        &self,
        limit: u64,
        offset: u64,
    ) -> crate::error::StoreResult<Vec<ImmutableCostResult>> {
        let results = CostResultEntity::find()
            .order_by_desc(CostResultColumn::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();
        Ok(results)
    }
}

#[derive(Clone)]
pub struct PgAuditRepository {
    db: DatabaseConnection,
}

impl PgAuditRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuditRepository for PgAuditRepository {
    async fn log_action(
        &self,
        entry: NewAuditLogEntry,
    ) -> crate::error::StoreResult<AuditLogEntry> {
        let model: AuditActiveModel = entry.into();
        let result = model.insert(&self.db).await?.into();
        Ok(result)
    }

    async fn query(
        &self,
        action: Option<AuditAction>,
        correlation_id: Option<Uuid>,
        limit: u64,
    ) -> crate::error::StoreResult<Vec<AuditLogEntry>> {
        let mut query = AuditEntity::find().order_by_desc(AuditColumn::Timestamp);
        if let Some(action) = action {
            query = query.filter(AuditColumn::Action.eq(action));
        }
        if let Some(correlation_id) = correlation_id {
            query = query.filter(AuditColumn::CorrelationId.eq(correlation_id));
        }
        let results = query.limit(limit).all(&self.db).await?.into_iter().map(Into::into).collect();
        Ok(results)
    }
}
