//! Email template override repository.

use std::sync::Arc;

use crate::entities::{
    EmailTemplate,
    email_template::{self, TemplateType, ZoneKey},
};
use accreditation_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Email template repository for database operations.
#[derive(Clone)]
pub struct EmailTemplateRepository {
    db: Arc<DatabaseConnection>,
}

impl EmailTemplateRepository {
    /// Create a new email template repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the override row for an (event, type, zone key) triple.
    pub async fn find(
        &self,
        event_id: i32,
        template_type: TemplateType,
        zone_key: ZoneKey,
    ) -> AppResult<Option<email_template::Model>> {
        EmailTemplate::find()
            .filter(email_template::Column::EventId.eq(event_id))
            .filter(email_template::Column::TemplateType.eq(template_type))
            .filter(email_template::Column::ZoneKey.eq(zone_key))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Every override row of an event.
    pub async fn find_by_event(&self, event_id: i32) -> AppResult<Vec<email_template::Model>> {
        EmailTemplate::find()
            .filter(email_template::Column::EventId.eq(event_id))
            .order_by_asc(email_template::Column::TemplateType)
            .order_by_asc(email_template::Column::ZoneKey)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a new override row.
    pub async fn create(
        &self,
        model: email_template::ActiveModel,
    ) -> AppResult<email_template::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an existing override row.
    pub async fn update(
        &self,
        model: email_template::ActiveModel,
    ) -> AppResult<email_template::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_template(zone_key: ZoneKey) -> email_template::Model {
        email_template::Model {
            id: "tpl1".to_string(),
            event_id: 1,
            template_type: TemplateType::Approval,
            zone_key,
            subject: Some("Acreditación aprobada".to_string()),
            match_description: None,
            event_date: None,
            venue: None,
            arrival_time: Some("17:00".to_string()),
            start_time: None,
            contact_email: None,
            intro_text: None,
            instructions_text: None,
            general_info_text: None,
            updated_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_returns_row() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_template(ZoneKey::Cancha)]])
                .into_connection(),
        );

        let repo = EmailTemplateRepository::new(db);
        let result = repo
            .find(1, TemplateType::Approval, ZoneKey::Cancha)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.zone_key, ZoneKey::Cancha);
        assert_eq!(result.arrival_time.as_deref(), Some("17:00"));
    }

    #[tokio::test]
    async fn test_find_missing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<email_template::Model>::new()])
                .into_connection(),
        );

        let repo = EmailTemplateRepository::new(db);
        let result = repo
            .find(1, TemplateType::Rejection, ZoneKey::Default)
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
