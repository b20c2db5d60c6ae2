//! Email delivery log repository.

use std::sync::Arc;

use crate::entities::{EmailLog, email_log};
use accreditation_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};

/// Email log repository for database operations.
#[derive(Clone)]
pub struct EmailLogRepository {
    db: Arc<DatabaseConnection>,
}

impl EmailLogRepository {
    /// Create a new email log repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a new log row.
    pub async fn create(&self, model: email_log::ActiveModel) -> AppResult<email_log::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the row for a provider message id.
    pub async fn find_by_provider_id(
        &self,
        provider_message_id: &str,
    ) -> AppResult<Option<email_log::Model>> {
        EmailLog::find()
            .filter(email_log::Column::ProviderMessageId.eq(provider_message_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Every send recorded for an accreditation, newest first.
    pub async fn find_by_accreditation(
        &self,
        accreditation_id: &str,
    ) -> AppResult<Vec<email_log::Model>> {
        EmailLog::find()
            .filter(email_log::Column::AccreditationId.eq(accreditation_id))
            .order_by_desc(email_log::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Persist changes to an existing row.
    pub async fn update(&self, model: email_log::ActiveModel) -> AppResult<email_log::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Overwrite the delivery status of an existing row.
    pub async fn update_status(
        &self,
        existing: email_log::Model,
        status: email_log::DeliveryStatus,
        detail: Option<String>,
    ) -> AppResult<email_log::Model> {
        let mut active = existing.into_active_model();
        active.status = Set(status);
        if detail.is_some() {
            active.detail = Set(detail);
        }
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
