//! Admin operations on accreditations: review, zone assignment, notification.
//!
//! A status change is committed before its email is attempted. Email failures
//! are reported next to the committed change and never undo it.

use std::sync::Arc;

use accreditation_common::{AppError, AppResult};
use accreditation_db::{
    entities::{
        accreditation::{self, AccreditationStatus},
        zone,
    },
    repositories::{AccreditationRepository, AreaRepository, ZoneRepository},
};
use futures::future::join_all;
use serde::{Deserialize, Serialize};

use super::{
    delivery_status::DeliveryStatusService,
    email::{EmailSender, OutgoingEmail},
    email_template::{EmailTemplateService, RenderedEmail, TemplateSet},
    quota::AreaDefinition,
    search::{DisplayNames, filter_records},
};

/// Records of an event plus the lookups needed to display them.
#[derive(Debug, Clone, Serialize)]
pub struct AccreditationList {
    pub records: Vec<accreditation::Model>,
    pub zones: Vec<zone::Model>,
    pub areas: Vec<AreaDefinition>,
}

impl AccreditationList {
    #[must_use]
    pub fn display_names(&self) -> DisplayNames {
        DisplayNames::new(&self.zones, &self.areas)
    }
}

/// Per-status counts for the dashboard header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
    pub total: u64,
}

/// What happened to the notification of a status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EmailOutcome {
    /// The new status has no notification.
    NotApplicable,
    Sent { message_id: String },
    /// The status change stands; only the email failed.
    Failed { warning: String },
}

impl EmailOutcome {
    const fn is_sent(&self) -> bool {
        matches!(self, Self::Sent { .. })
    }
}

/// Result of a single status change.
#[derive(Debug, Clone, Serialize)]
pub struct StatusChange {
    pub record: accreditation::Model,
    pub email: EmailOutcome,
}

/// Result of a bulk status change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BulkStatusOutcome {
    pub succeeded: u64,
    pub emails_sent: u64,
    pub emails_failed: u64,
}

/// Result of a bulk send.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BulkEmailOutcome {
    pub sent: u64,
    pub failed: u64,
}

/// Actions available from the multi-select list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BulkAction {
    Approve,
    Reject,
    SendEmail,
    Delete,
}

/// Counts returned by [`AccreditationAdminService::run_bulk`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BulkOutcome {
    pub affected: u64,
    pub sent: u64,
    pub failed: u64,
}

/// Lookups and templates for rendering one event's emails.
struct MailContext {
    names: DisplayNames,
    templates: TemplateSet,
}

#[derive(Clone)]
pub struct AccreditationAdminService {
    accreditation_repo: AccreditationRepository,
    zone_repo: ZoneRepository,
    area_repo: AreaRepository,
    template_service: EmailTemplateService,
    delivery_service: DeliveryStatusService,
    sender: Arc<dyn EmailSender>,
    fallback_areas: Vec<AreaDefinition>,
}

impl AccreditationAdminService {
    #[must_use]
    pub fn new(
        accreditation_repo: AccreditationRepository,
        zone_repo: ZoneRepository,
        area_repo: AreaRepository,
        template_service: EmailTemplateService,
        delivery_service: DeliveryStatusService,
        sender: Arc<dyn EmailSender>,
        fallback_areas: Vec<AreaDefinition>,
    ) -> Self {
        Self {
            accreditation_repo,
            zone_repo,
            area_repo,
            template_service,
            delivery_service,
            sender,
            fallback_areas,
        }
    }

    async fn load_areas(&self, event_id: i32) -> Vec<AreaDefinition> {
        match self.area_repo.find_by_event(event_id).await {
            Ok(areas) => areas.into_iter().map(AreaDefinition::from).collect(),
            Err(e) => {
                tracing::warn!(event_id, error = %e, "Area lookup failed, using fallback table");
                self.fallback_areas.clone()
            }
        }
    }

    async fn load_context(&self, event_id: i32) -> AppResult<MailContext> {
        let zones = self.zone_repo.find_by_event(event_id).await?;
        let areas = self.load_areas(event_id).await;
        let templates = self.template_service.load_set(event_id).await?;
        Ok(MailContext {
            names: DisplayNames::new(&zones, &areas),
            templates,
        })
    }

    /// Every record of the event, newest first, with zones and areas.
    pub async fn list(&self, event_id: i32) -> AppResult<AccreditationList> {
        let records = self.accreditation_repo.find_by_event(event_id).await?;
        let zones = self.zone_repo.find_by_event(event_id).await?;
        let areas = self.load_areas(event_id).await;
        Ok(AccreditationList {
            records,
            zones,
            areas,
        })
    }

    /// [`Self::list`] narrowed by a free-text term and an optional status.
    pub async fn search(
        &self,
        event_id: i32,
        term: &str,
        status: Option<AccreditationStatus>,
    ) -> AppResult<AccreditationList> {
        let list = self.list(event_id).await?;
        let names = list.display_names();
        let records = filter_records(&list.records, term, status, &names)
            .into_iter()
            .cloned()
            .collect();
        Ok(AccreditationList { records, ..list })
    }

    pub async fn stats(&self, event_id: i32) -> AppResult<StatusCounts> {
        let pending = self
            .accreditation_repo
            .count_by_status(event_id, AccreditationStatus::Pending)
            .await?;
        let approved = self
            .accreditation_repo
            .count_by_status(event_id, AccreditationStatus::Approved)
            .await?;
        let rejected = self
            .accreditation_repo
            .count_by_status(event_id, AccreditationStatus::Rejected)
            .await?;
        Ok(StatusCounts {
            pending,
            approved,
            rejected,
            total: pending + approved + rejected,
        })
    }

    /// Render, send and log one notification. Never fails.
    async fn notify(&self, record: &accreditation::Model, ctx: &MailContext) -> EmailOutcome {
        let Some(rendered) = ctx.templates.render_for(record, &ctx.names) else {
            return EmailOutcome::NotApplicable;
        };

        let message = OutgoingEmail {
            to: record.email.clone(),
            subject: rendered.subject,
            html: rendered.html,
        };
        let result = self.sender.send(&message).await;

        if let Err(e) = self
            .delivery_service
            .record_send(&record.id, &record.email, rendered.template_type, &result)
            .await
        {
            tracing::warn!(accreditation_id = %record.id, error = %e, "Could not log email send");
        }

        match result {
            Ok(receipt) => {
                tracing::info!(
                    accreditation_id = %record.id,
                    message_id = %receipt.message_id,
                    "Notification sent"
                );
                EmailOutcome::Sent {
                    message_id: receipt.message_id,
                }
            }
            Err(e) => {
                tracing::warn!(accreditation_id = %record.id, error = %e, "Notification failed");
                EmailOutcome::Failed {
                    warning: e.to_string(),
                }
            }
        }
    }

    /// Notify every approved or rejected record concurrently; returns (sent, failed).
    async fn notify_many(&self, event_id: i32, records: &[accreditation::Model]) -> (u64, u64) {
        let eligible: Vec<&accreditation::Model> =
            records.iter().filter(|r| r.status.is_final()).collect();
        if eligible.is_empty() {
            return (0, 0);
        }

        let ctx = match self.load_context(event_id).await {
            Ok(ctx) => ctx,
            Err(e) => {
                tracing::warn!(event_id, error = %e, "Could not load email context");
                return (0, eligible.len() as u64);
            }
        };

        let ctx = &ctx;
        let outcomes = join_all(eligible.into_iter().map(|record| self.notify(record, ctx))).await;

        let sent = outcomes.iter().filter(|o| o.is_sent()).count() as u64;
        (sent, outcomes.len() as u64 - sent)
    }

    /// Persist a new status, then notify if it is approved or rejected.
    ///
    /// The reason is kept only when rejecting. Repeating the same status
    /// sends the email again.
    pub async fn set_status(
        &self,
        event_id: i32,
        id: &str,
        status: AccreditationStatus,
        rejection_reason: Option<&str>,
    ) -> AppResult<StatusChange> {
        let mut record = self.accreditation_repo.get_in_event(event_id, id).await?;
        let reason = rejection_reason
            .map(str::trim)
            .filter(|r| !r.is_empty());

        let updated = self
            .accreditation_repo
            .update_status(event_id, id, status, reason)
            .await?;
        if updated == 0 {
            return Err(AppError::NotFound(format!("Accreditation {id} not found")));
        }

        record.status = status;
        record.rejection_reason = match status {
            AccreditationStatus::Rejected => reason.map(String::from),
            _ => None,
        };

        tracing::info!(event_id, accreditation_id = %id, status = %status, "Status changed");

        let email = if status.is_final() {
            match self.load_context(event_id).await {
                Ok(ctx) => self.notify(&record, &ctx).await,
                Err(e) => {
                    tracing::warn!(accreditation_id = %id, error = %e, "Could not load email context");
                    EmailOutcome::Failed {
                        warning: e.to_string(),
                    }
                }
            }
        } else {
            EmailOutcome::NotApplicable
        };

        Ok(StatusChange { record, email })
    }

    /// Assign a zone of the same event, or unassign with `None`.
    pub async fn set_zone(
        &self,
        event_id: i32,
        id: &str,
        zone_id: Option<i32>,
    ) -> AppResult<accreditation::Model> {
        let mut record = self.accreditation_repo.get_in_event(event_id, id).await?;

        if let Some(zone_id) = zone_id {
            let zone = self
                .zone_repo
                .find_by_id(zone_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Zone {zone_id} not found")))?;
            if zone.event_id != event_id {
                return Err(AppError::BadRequest(
                    "Zone belongs to another event".to_string(),
                ));
            }
        }

        self.accreditation_repo
            .update_zone(event_id, id, zone_id)
            .await?;
        record.zone_id = zone_id;

        tracing::info!(event_id, accreditation_id = %id, zone_id = ?zone_id, "Zone changed");
        Ok(record)
    }

    /// One update for every id of the event, then independent notifications.
    ///
    /// Once the update is stored the call succeeds; anything that goes wrong
    /// afterwards is counted in `emails_failed`.
    pub async fn bulk_set_status(
        &self,
        event_id: i32,
        ids: &[String],
        status: AccreditationStatus,
    ) -> AppResult<BulkStatusOutcome> {
        let succeeded = self
            .accreditation_repo
            .bulk_update_status(event_id, ids, status)
            .await?;

        tracing::info!(event_id, count = succeeded, status = %status, "Bulk status change");

        if !status.is_final() || succeeded == 0 {
            return Ok(BulkStatusOutcome {
                succeeded,
                ..Default::default()
            });
        }

        let records = match self.accreditation_repo.find_by_ids(event_id, ids).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(event_id, error = %e, "Could not reload updated records for email");
                return Ok(BulkStatusOutcome {
                    succeeded,
                    emails_sent: 0,
                    emails_failed: succeeded,
                });
            }
        };
        let (emails_sent, emails_failed) = self.notify_many(event_id, &records).await;

        Ok(BulkStatusOutcome {
            succeeded,
            emails_sent,
            emails_failed,
        })
    }

    /// Send the current notification of each approved or rejected record.
    ///
    /// Pending records and ids of other events are skipped without error.
    pub async fn bulk_send_email(
        &self,
        event_id: i32,
        ids: &[String],
    ) -> AppResult<BulkEmailOutcome> {
        let records = self.accreditation_repo.find_by_ids(event_id, ids).await?;
        let (sent, failed) = self.notify_many(event_id, &records).await;

        tracing::info!(event_id, requested = ids.len(), sent, failed, "Bulk email");
        Ok(BulkEmailOutcome { sent, failed })
    }

    /// Hard delete.
    pub async fn bulk_delete(&self, event_id: i32, ids: &[String]) -> AppResult<u64> {
        let deleted = self.accreditation_repo.delete_many(event_id, ids).await?;
        tracing::info!(event_id, requested = ids.len(), deleted, "Accreditations deleted");
        Ok(deleted)
    }

    pub async fn run_bulk(
        &self,
        event_id: i32,
        action: BulkAction,
        ids: &[String],
    ) -> AppResult<BulkOutcome> {
        if ids.is_empty() {
            return Err(AppError::BadRequest("ids must not be empty".to_string()));
        }

        match action {
            BulkAction::Approve | BulkAction::Reject => {
                let status = if action == BulkAction::Approve {
                    AccreditationStatus::Approved
                } else {
                    AccreditationStatus::Rejected
                };
                let outcome = self.bulk_set_status(event_id, ids, status).await?;
                Ok(BulkOutcome {
                    affected: outcome.succeeded,
                    sent: outcome.emails_sent,
                    failed: outcome.emails_failed,
                })
            }
            BulkAction::SendEmail => {
                let outcome = self.bulk_send_email(event_id, ids).await?;
                Ok(BulkOutcome {
                    affected: outcome.sent + outcome.failed,
                    sent: outcome.sent,
                    failed: outcome.failed,
                })
            }
            BulkAction::Delete => Ok(BulkOutcome {
                affected: self.bulk_delete(event_id, ids).await?,
                ..Default::default()
            }),
        }
    }

    /// Render the email a record would receive, optionally as if it had `status`.
    pub async fn preview_email(
        &self,
        event_id: i32,
        id: &str,
        status: Option<AccreditationStatus>,
    ) -> AppResult<RenderedEmail> {
        let mut record = self.accreditation_repo.get_in_event(event_id, id).await?;
        if let Some(status) = status {
            record.status = status;
        }

        let ctx = self.load_context(event_id).await?;
        ctx.templates
            .render_for(&record, &ctx.names)
            .ok_or_else(|| AppError::BadRequest("Pending accreditations have no email".to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::MemorySender;
    use accreditation_db::{
        entities::{
            area,
            email_log::{self, DeliveryStatus},
            email_template::{self, TemplateType},
            event,
        },
        repositories::{EmailLogRepository, EmailTemplateRepository, EventRepository},
    };
    use chrono::Utc;
    use sea_orm::{
        DatabaseBackend, DatabaseConnection, DbErr, MockDatabase, MockExecResult, Transaction,
        Value,
    };

    fn record(id: &str, status: AccreditationStatus) -> accreditation::Model {
        accreditation::Model {
            id: id.to_string(),
            event_id: 1,
            given_name: "Ana".to_string(),
            first_surname: "Soto".to_string(),
            second_surname: None,
            national_id: "12345678-5".to_string(),
            email: format!("{id}@canalx.cl"),
            role: "Periodista".to_string(),
            credential_type: None,
            credential_number: None,
            area: "prensa".to_string(),
            company: "Canal X".to_string(),
            zone_id: Some(10),
            status,
            rejection_reason: None,
            submitter_name: "Jefa".to_string(),
            submitter_first_surname: "Prensa".to_string(),
            submitter_second_surname: None,
            submitter_national_id: "11111111-1".to_string(),
            submitter_email: "jefa@canalx.cl".to_string(),
            submitter_phone: None,
            created_at: Utc::now().into(),
        }
    }

    fn zones() -> Vec<zone::Model> {
        vec![zone::Model {
            id: 10,
            event_id: 1,
            name: "Prensa".to_string(),
        }]
    }

    fn areas() -> Vec<area::Model> {
        vec![area::Model {
            id: 1,
            event_id: 1,
            code: "prensa".to_string(),
            name: "Prensa Escrita".to_string(),
            max_quota: 10,
        }]
    }

    fn event() -> event::Model {
        event::Model {
            id: 1,
            name: "Fecha 5".to_string(),
            description: Some("Local vs Visita".to_string()),
            event_date: Some("12 de mayo".to_string()),
            venue: Some("Estadio Municipal".to_string()),
            is_active: true,
            created_at: Utc::now().into(),
        }
    }

    fn log_row(accreditation_id: &str) -> email_log::Model {
        email_log::Model {
            id: format!("log-{accreditation_id}"),
            accreditation_id: Some(accreditation_id.to_string()),
            recipient: format!("{accreditation_id}@canalx.cl"),
            template_type: Some(TemplateType::Approval),
            provider_message_id: Some("mem-0".to_string()),
            status: DeliveryStatus::Sent,
            detail: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    /// Queries issued while loading one event's mail context.
    fn with_context(mock: MockDatabase) -> MockDatabase {
        mock.append_query_results([zones()])
            .append_query_results([areas()])
            .append_query_results([[event()]])
            .append_query_results([Vec::<email_template::Model>::new()])
    }

    /// Queries issued while logging one send.
    fn with_send_log(mock: MockDatabase, accreditation_id: &str) -> MockDatabase {
        mock.append_query_results([Vec::<email_log::Model>::new()])
            .append_query_results([[log_row(accreditation_id)]])
    }

    fn service(db: DatabaseConnection, sender: Arc<MemorySender>) -> AccreditationAdminService {
        service_on(&Arc::new(db), sender)
    }

    fn service_on(
        db: &Arc<DatabaseConnection>,
        sender: Arc<MemorySender>,
    ) -> AccreditationAdminService {
        AccreditationAdminService::new(
            AccreditationRepository::new(Arc::clone(db)),
            ZoneRepository::new(Arc::clone(db)),
            AreaRepository::new(Arc::clone(db)),
            EmailTemplateService::new(
                EmailTemplateRepository::new(Arc::clone(db)),
                EventRepository::new(Arc::clone(db)),
            ),
            DeliveryStatusService::new(EmailLogRepository::new(Arc::clone(db))),
            sender,
            Vec::new(),
        )
    }

    #[tokio::test]
    async fn test_approve_sends_email() {
        let mock = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[record("a", AccreditationStatus::Pending)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]);
        let mock = with_send_log(with_context(mock), "a");

        let sender = Arc::new(MemorySender::new());
        let svc = service(mock.into_connection(), Arc::clone(&sender));

        let change = svc
            .set_status(1, "a", AccreditationStatus::Approved, None)
            .await
            .unwrap();

        assert_eq!(change.record.status, AccreditationStatus::Approved);
        assert!(matches!(change.email, EmailOutcome::Sent { .. }));
        let sent = sender.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "a@canalx.cl");
        assert!(sent[0].subject.contains("Local vs Visita"));
    }

    #[tokio::test]
    async fn test_email_failure_keeps_status_change() {
        let mut failed_log = log_row("a");
        failed_log.status = DeliveryStatus::Failed;
        failed_log.provider_message_id = None;

        let mock = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[record("a", AccreditationStatus::Pending)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]);
        let mock = with_context(mock).append_query_results([[failed_log]]);
        let db = Arc::new(mock.into_connection());

        let sender = Arc::new(MemorySender::failing());
        let svc = service_on(&db, Arc::clone(&sender));

        let change = svc
            .set_status(1, "a", AccreditationStatus::Rejected, Some("Sin credencial"))
            .await
            .unwrap();

        assert_eq!(change.record.status, AccreditationStatus::Rejected);
        assert_eq!(change.record.rejection_reason.as_deref(), Some("Sin credencial"));
        match change.email {
            EmailOutcome::Failed { warning } => assert!(warning.contains("refused")),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(sender.sent().is_empty());

        // The stored row changed before the send was attempted.
        drop(svc);
        let log: Vec<Transaction> = Arc::try_unwrap(db).unwrap().into_transaction_log();
        let update = format!("{:?}", log[1]);
        assert!(update.contains("UPDATE"), "{update}");
        assert!(update.contains("rejected"));
        assert!(update.contains("Sin credencial"));
        let failed_send = format!("{:?}", log.last().unwrap());
        assert!(failed_send.contains("INSERT INTO"));
        assert!(failed_send.contains("failed"));
    }

    #[tokio::test]
    async fn test_bulk_status_survives_reload_failure() {
        let mock = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            }])
            .append_query_errors([DbErr::Custom("connection reset".to_string())]);
        let sender = Arc::new(MemorySender::new());
        let svc = service(mock.into_connection(), Arc::clone(&sender));

        let ids = vec!["a".to_string(), "b".to_string()];
        let outcome = svc
            .bulk_set_status(1, &ids, AccreditationStatus::Approved)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            BulkStatusOutcome {
                succeeded: 2,
                emails_sent: 0,
                emails_failed: 2
            }
        );
        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn test_set_status_ignores_other_event() {
        let mock = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<accreditation::Model>::new()]);
        let db = Arc::new(mock.into_connection());
        let sender = Arc::new(MemorySender::new());
        let svc = service_on(&db, Arc::clone(&sender));

        let result = svc
            .set_status(2, "a", AccreditationStatus::Approved, None)
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(sender.sent().is_empty());

        drop(svc);
        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        assert_eq!(log.len(), 1, "no update may follow a failed lookup");
        assert!(format!("{:?}", log[0]).contains("event_id"));
    }

    #[tokio::test]
    async fn test_bulk_send_skips_ids_of_other_events() {
        let mock = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<accreditation::Model>::new()]);
        let sender = Arc::new(MemorySender::new());
        let svc = service(mock.into_connection(), Arc::clone(&sender));

        let ids = vec!["from-event-2".to_string()];
        let outcome = svc.bulk_send_email(1, &ids).await.unwrap();
        assert_eq!(outcome, BulkEmailOutcome::default());
        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn test_reopen_to_pending_sends_nothing() {
        let mock = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[record("a", AccreditationStatus::Approved)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]);
        let sender = Arc::new(MemorySender::new());
        let svc = service(mock.into_connection(), Arc::clone(&sender));

        let change = svc
            .set_status(1, "a", AccreditationStatus::Pending, Some("ignored"))
            .await
            .unwrap();
        assert_eq!(change.email, EmailOutcome::NotApplicable);
        assert!(change.record.rejection_reason.is_none());
        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn test_set_status_unknown_record() {
        let mock = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<accreditation::Model>::new()]);
        let svc = service(mock.into_connection(), Arc::new(MemorySender::new()));

        let result = svc.set_status(1, "nope", AccreditationStatus::Approved, None).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_bulk_send_skips_pending() {
        let mut rejected = record("c", AccreditationStatus::Rejected);
        rejected.rejection_reason = Some("Cupo".to_string());

        let mock = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![
            record("a", AccreditationStatus::Approved),
            record("b", AccreditationStatus::Pending),
            rejected,
        ]]);
        let mock = with_send_log(with_send_log(with_context(mock), "a"), "c");

        let sender = Arc::new(MemorySender::new());
        let svc = service(mock.into_connection(), Arc::clone(&sender));

        let ids = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let outcome = svc.bulk_send_email(1, &ids).await.unwrap();

        assert_eq!(outcome, BulkEmailOutcome { sent: 2, failed: 0 });
        let recipients: Vec<String> = sender.sent().into_iter().map(|m| m.to).collect();
        assert!(!recipients.contains(&"b@canalx.cl".to_string()));
        assert_eq!(recipients.len(), 2);
    }

    #[tokio::test]
    async fn test_bulk_send_tolerates_partial_failure() {
        let mock = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![
            record("a", AccreditationStatus::Approved),
            record("b", AccreditationStatus::Approved),
        ]]);
        let mock = with_context(mock);
        let mut failed_log = log_row("b");
        failed_log.status = DeliveryStatus::Failed;
        let mock = with_send_log(mock, "a").append_query_results([[failed_log]]);

        let sender = Arc::new(MemorySender::new());
        sender.fail_for("b@canalx.cl");
        let svc = service(mock.into_connection(), Arc::clone(&sender));

        let ids = vec!["a".to_string(), "b".to_string()];
        let outcome = svc.bulk_send_email(1, &ids).await.unwrap();
        assert_eq!(outcome, BulkEmailOutcome { sent: 1, failed: 1 });
    }

    #[tokio::test]
    async fn test_bulk_approve_counts_and_notifies() {
        let mock = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            }])
            .append_query_results([vec![
                record("a", AccreditationStatus::Approved),
                record("b", AccreditationStatus::Approved),
            ]]);
        let mock = with_send_log(with_send_log(with_context(mock), "a"), "b");

        let sender = Arc::new(MemorySender::new());
        let svc = service(mock.into_connection(), Arc::clone(&sender));

        let ids = vec!["a".to_string(), "b".to_string()];
        let outcome = svc.run_bulk(1, BulkAction::Approve, &ids).await.unwrap();
        assert_eq!(
            outcome,
            BulkOutcome {
                affected: 2,
                sent: 2,
                failed: 0
            }
        );
        assert_eq!(sender.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_bulk_delete() {
        let mock = MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 3,
            },
        ]);
        let svc = service(mock.into_connection(), Arc::new(MemorySender::new()));

        let ids = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let outcome = svc.run_bulk(1, BulkAction::Delete, &ids).await.unwrap();
        assert_eq!(outcome.affected, 3);
    }

    #[tokio::test]
    async fn test_bulk_requires_ids() {
        let mock = MockDatabase::new(DatabaseBackend::Postgres);
        let svc = service(mock.into_connection(), Arc::new(MemorySender::new()));
        let result = svc.run_bulk(1, BulkAction::SendEmail, &[]).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_set_zone_rejects_foreign_zone() {
        let mock = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[record("a", AccreditationStatus::Pending)]])
            .append_query_results([[zone::Model {
                id: 99,
                event_id: 2,
                name: "Cancha".to_string(),
            }]]);
        let svc = service(mock.into_connection(), Arc::new(MemorySender::new()));

        let result = svc.set_zone(1, "a", Some(99)).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_set_zone_unassign() {
        let mock = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[record("a", AccreditationStatus::Pending)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]);
        let svc = service(mock.into_connection(), Arc::new(MemorySender::new()));

        let updated = svc.set_zone(1, "a", None).await.unwrap();
        assert_eq!(updated.zone_id, None);
    }

    #[tokio::test]
    async fn test_stats() {
        let count = |n: i64| [maplit::btreemap! { "num_items" => Value::BigInt(Some(n)) }];
        let mock = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([count(4)])
            .append_query_results([count(3)])
            .append_query_results([count(1)]);
        let svc = service(mock.into_connection(), Arc::new(MemorySender::new()));

        let stats = svc.stats(1).await.unwrap();
        assert_eq!(
            stats,
            StatusCounts {
                pending: 4,
                approved: 3,
                rejected: 1,
                total: 8
            }
        );
    }

    #[tokio::test]
    async fn test_search_filters_loaded_list() {
        let mut other = record("b", AccreditationStatus::Pending);
        other.first_surname = "Álvarez".to_string();

        let mock = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![record("a", AccreditationStatus::Pending), other]])
            .append_query_results([zones()])
            .append_query_results([areas()]);
        let svc = service(mock.into_connection(), Arc::new(MemorySender::new()));

        let list = svc.search(1, "alvarez", None).await.unwrap();
        assert_eq!(list.records.len(), 1);
        assert_eq!(list.records[0].id, "b");
        assert_eq!(list.zones.len(), 1);
    }

    #[tokio::test]
    async fn test_preview_pending_is_bad_request() {
        let mock = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[record("a", AccreditationStatus::Pending)]]);
        let mock = with_context(mock);
        let svc = service(mock.into_connection(), Arc::new(MemorySender::new()));

        let result = svc.preview_email(1, "a", None).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_preview_as_approved() {
        let mock = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[record("a", AccreditationStatus::Pending)]]);
        let mock = with_context(mock);
        let sender = Arc::new(MemorySender::new());
        let svc = service(mock.into_connection(), Arc::clone(&sender));

        let preview = svc
            .preview_email(1, "a", Some(AccreditationStatus::Approved))
            .await
            .unwrap();
        assert_eq!(preview.template_type, TemplateType::Approval);
        assert!(preview.html.contains("Ana"));
        assert!(sender.sent().is_empty());
    }
}
