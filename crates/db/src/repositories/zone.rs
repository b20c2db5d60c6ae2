//! Zone repository.

use std::sync::Arc;

use crate::entities::{Zone, zone};
use accreditation_common::{AppError, AppResult};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

/// Zone repository for database operations.
#[derive(Clone)]
pub struct ZoneRepository {
    db: Arc<DatabaseConnection>,
}

impl ZoneRepository {
    /// Create a new zone repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a zone by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<zone::Model>> {
        Zone::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find all zones of an event.
    pub async fn find_by_event(&self, event_id: i32) -> AppResult<Vec<zone::Model>> {
        Zone::find()
            .filter(zone::Column::EventId.eq(event_id))
            .order_by_asc(zone::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
