//! Area repository.

use std::sync::Arc;

use crate::entities::{Area, area};
use accreditation_common::{AppError, AppResult};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

/// Area repository for database operations.
#[derive(Clone)]
pub struct AreaRepository {
    db: Arc<DatabaseConnection>,
}

impl AreaRepository {
    /// Create a new area repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find all areas configured for an event.
    pub async fn find_by_event(&self, event_id: i32) -> AppResult<Vec<area::Model>> {
        Area::find()
            .filter(area::Column::EventId.eq(event_id))
            .order_by_asc(area::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase};

    #[tokio::test]
    async fn test_find_by_event() {
        let areas = vec![
            area::Model {
                id: 1,
                event_id: 3,
                code: "prensa".to_string(),
                name: "Prensa".to_string(),
                max_quota: 10,
            },
            area::Model {
                id: 2,
                event_id: 3,
                code: "seguridad".to_string(),
                name: "Seguridad".to_string(),
                max_quota: 4,
            },
        ];
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([areas])
                .into_connection(),
        );

        let repo = AreaRepository::new(db);
        let result = repo.find_by_event(3).await.unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[1].max_quota, 4);
    }

    #[tokio::test]
    async fn test_find_by_event_maps_store_failure() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_errors([DbErr::Custom("connection refused".to_string())])
                .into_connection(),
        );

        let repo = AreaRepository::new(db);
        let result = repo.find_by_event(3).await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }
}
