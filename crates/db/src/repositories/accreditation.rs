//! Accreditation repository.

use std::sync::Arc;

use crate::entities::{
    Accreditation,
    accreditation::{self, AccreditationStatus},
};
use accreditation_common::{AppError, AppResult};
use sea_orm::{
    ActiveEnum, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, SqlErr, TransactionTrait,
    sea_query::{Expr, Func},
};

/// Whether a store error is a uniqueness violation.
///
/// Drivers that expose SQLSTATE are classified through [`DbErr::sql_err`];
/// anything else falls back to the `PostgreSQL` message text.
#[must_use]
pub fn is_unique_violation(err: &DbErr) -> bool {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return true;
    }
    let message = err.to_string();
    message.contains("duplicate key value violates unique constraint") || message.contains("23505")
}

/// Accreditation repository for database operations.
#[derive(Clone)]
pub struct AccreditationRepository {
    db: Arc<DatabaseConnection>,
}

impl AccreditationRepository {
    /// Create a new accreditation repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an accreditation by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<accreditation::Model>> {
        Accreditation::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an accreditation by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<accreditation::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Accreditation {id} not found")))
    }

    /// Find one accreditation of an event, erroring if it is missing or
    /// belongs to another event.
    pub async fn get_in_event(&self, event_id: i32, id: &str) -> AppResult<accreditation::Model> {
        Accreditation::find_by_id(id)
            .filter(accreditation::Column::EventId.eq(event_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Accreditation {id} not found")))
    }

    /// Find several accreditations of an event by ID. Ids of other events are ignored.
    pub async fn find_by_ids(
        &self,
        event_id: i32,
        ids: &[String],
    ) -> AppResult<Vec<accreditation::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        Accreditation::find()
            .filter(accreditation::Column::EventId.eq(event_id))
            .filter(accreditation::Column::Id.is_in(ids.iter().cloned()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find every accreditation of an event, newest first.
    pub async fn find_by_event(&self, event_id: i32) -> AppResult<Vec<accreditation::Model>> {
        Accreditation::find()
            .filter(accreditation::Column::EventId.eq(event_id))
            .order_by_desc(accreditation::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count rows for an (event, area, company) triple, optionally restricted
    /// to one status. Area and company compare case-insensitively.
    pub async fn count_for_company(
        &self,
        event_id: i32,
        area: &str,
        company: &str,
        status: Option<AccreditationStatus>,
    ) -> AppResult<u64> {
        let mut query = Accreditation::find()
            .filter(accreditation::Column::EventId.eq(event_id))
            .filter(
                Expr::expr(Func::lower(Expr::col(accreditation::Column::Area)))
                    .eq(area.trim().to_lowercase()),
            )
            .filter(
                Expr::expr(Func::lower(Expr::col(accreditation::Column::Company)))
                    .eq(company.trim().to_lowercase()),
            );

        if let Some(s) = status {
            query = query.filter(accreditation::Column::Status.eq(s));
        }

        query
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count an event's accreditations in one status.
    pub async fn count_by_status(
        &self,
        event_id: i32,
        status: AccreditationStatus,
    ) -> AppResult<u64> {
        Accreditation::find()
            .filter(accreditation::Column::EventId.eq(event_id))
            .filter(accreditation::Column::Status.eq(status))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a batch atomically.
    ///
    /// Either every row is written or none is. A uniqueness violation is
    /// reported as [`AppError::DuplicateNationalId`].
    pub async fn insert_batch(&self, models: Vec<accreditation::ActiveModel>) -> AppResult<u64> {
        if models.is_empty() {
            return Ok(0);
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match Accreditation::insert_many(models)
            .exec_without_returning(&txn)
            .await
        {
            Ok(inserted) => {
                txn.commit()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(inserted)
            }
            Err(e) => {
                if let Err(rollback) = txn.rollback().await {
                    tracing::warn!(error = %rollback, "Rollback after failed batch insert failed");
                }
                if is_unique_violation(&e) {
                    Err(AppError::DuplicateNationalId)
                } else {
                    Err(AppError::Database(e.to_string()))
                }
            }
        }
    }

    /// Set the status of one accreditation. Returns the number of rows changed.
    ///
    /// The rejection reason is only kept for rejected rows.
    pub async fn update_status(
        &self,
        event_id: i32,
        id: &str,
        status: AccreditationStatus,
        rejection_reason: Option<&str>,
    ) -> AppResult<u64> {
        let reason = if status == AccreditationStatus::Rejected {
            rejection_reason.map(String::from)
        } else {
            None
        };

        let result = Accreditation::update_many()
            .col_expr(accreditation::Column::Status, Expr::value(status.into_value()))
            .col_expr(accreditation::Column::RejectionReason, Expr::value(reason))
            .filter(accreditation::Column::EventId.eq(event_id))
            .filter(accreditation::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Set the status of many accreditations in one statement.
    ///
    /// Existing rejection reasons are kept only when rejecting.
    pub async fn bulk_update_status(
        &self,
        event_id: i32,
        ids: &[String],
        status: AccreditationStatus,
    ) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut update = Accreditation::update_many()
            .col_expr(accreditation::Column::Status, Expr::value(status.into_value()));
        if status != AccreditationStatus::Rejected {
            update = update.col_expr(
                accreditation::Column::RejectionReason,
                Expr::value(Option::<String>::None),
            );
        }

        let result = update
            .filter(accreditation::Column::EventId.eq(event_id))
            .filter(accreditation::Column::Id.is_in(ids.iter().cloned()))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Assign or clear the zone of one accreditation.
    pub async fn update_zone(
        &self,
        event_id: i32,
        id: &str,
        zone_id: Option<i32>,
    ) -> AppResult<u64> {
        let result = Accreditation::update_many()
            .col_expr(accreditation::Column::ZoneId, Expr::value(zone_id))
            .filter(accreditation::Column::EventId.eq(event_id))
            .filter(accreditation::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Hard-delete accreditations of an event.
    pub async fn delete_many(&self, event_id: i32, ids: &[String]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = Accreditation::delete_many()
            .filter(accreditation::Column::EventId.eq(event_id))
            .filter(accreditation::Column::Id.is_in(ids.iter().cloned()))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}
