//! Event resolution.

use accreditation_common::AppResult;
use accreditation_db::{entities::event, repositories::EventRepository};

/// Resolves which event a request targets.
#[derive(Clone)]
pub struct EventService {
    event_repo: EventRepository,
    default_event_id: i32,
}

impl EventService {
    /// Create a new event service. `default_event_id` is used when no event is active.
    #[must_use]
    pub const fn new(event_repo: EventRepository, default_event_id: i32) -> Self {
        Self {
            event_repo,
            default_event_id,
        }
    }

    /// The active event with the highest id, if any.
    pub async fn active_event(&self) -> AppResult<Option<event::Model>> {
        self.event_repo.find_active().await
    }

    /// Get an event by id.
    pub async fn get(&self, event_id: i32) -> AppResult<event::Model> {
        self.event_repo.get_by_id(event_id).await
    }

    /// Pick the event for a request.
    ///
    /// An explicit id wins. Otherwise the active event is used, and when there
    /// is none (or it cannot be read) the configured default id.
    pub async fn resolve_event(&self, explicit: Option<i32>) -> i32 {
        if let Some(id) = explicit {
            return id;
        }

        match self.event_repo.find_active().await {
            Ok(Some(event)) => event.id,
            Ok(None) => {
                tracing::warn!(
                    default_event_id = self.default_event_id,
                    "No active event, using default"
                );
                self.default_event_id
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    default_event_id = self.default_event_id,
                    "Active event lookup failed, using default"
                );
                self.default_event_id
            }
        }
    }
}
