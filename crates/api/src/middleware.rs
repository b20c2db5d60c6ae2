//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use accreditation_common::Config;
use accreditation_core::{
    AccreditationAdminService, AreaDefinition, DeliveryStatusService, EmailSender,
    EmailTemplateService, EventService, IntakeDefaults, IntakeService, QuotaService,
};
use accreditation_db::repositories::{
    AccreditationRepository, AreaRepository, EmailLogRepository, EmailTemplateRepository,
    EventRepository, ZoneRepository,
};
use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use sea_orm::DatabaseConnection;

use crate::extractors::AdminSession;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub intake_service: IntakeService,
    pub admin_service: AccreditationAdminService,
    pub event_service: EventService,
    pub template_service: EmailTemplateService,
    pub delivery_service: DeliveryStatusService,
    pub admin_tokens: Arc<[String]>,
    pub webhook_secret: Option<String>,
}

impl AppState {
    /// Wire repositories and services over one connection.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, config: &Config, sender: Arc<dyn EmailSender>) -> Self {
        let accreditation_repo = AccreditationRepository::new(Arc::clone(&db));
        let area_repo = AreaRepository::new(Arc::clone(&db));
        let zone_repo = ZoneRepository::new(Arc::clone(&db));
        let event_repo = EventRepository::new(Arc::clone(&db));
        let template_repo = EmailTemplateRepository::new(Arc::clone(&db));
        let email_log_repo = EmailLogRepository::new(db);

        let defaults = IntakeDefaults::from(&config.intake);
        let event_service = EventService::new(event_repo.clone(), defaults.default_event_id);
        let quota_service = QuotaService::new(accreditation_repo.clone());
        let template_service = EmailTemplateService::new(template_repo, event_repo);
        let delivery_service = DeliveryStatusService::new(email_log_repo);
        let fallback_areas: Vec<AreaDefinition> = defaults.fallback_areas.clone();

        let intake_service = IntakeService::new(
            accreditation_repo.clone(),
            area_repo.clone(),
            zone_repo.clone(),
            event_service.clone(),
            quota_service,
            defaults,
        );
        let admin_service = AccreditationAdminService::new(
            accreditation_repo,
            zone_repo,
            area_repo,
            template_service.clone(),
            delivery_service.clone(),
            sender,
            fallback_areas,
        );

        Self {
            intake_service,
            admin_service,
            event_service,
            template_service,
            delivery_service,
            admin_tokens: config.auth.admin_tokens.clone().into(),
            webhook_secret: config
                .email
                .webhook_secret
                .clone()
                .filter(|s| !s.trim().is_empty()),
        }
    }

    fn is_admin_token(&self, token: &str) -> bool {
        !token.is_empty() && self.admin_tokens.iter().any(|t| t == token)
    }
}

/// Authentication middleware.
///
/// A bearer token listed in `auth.admin_tokens` marks the request as an admin
/// session. Requests without one continue anonymously.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get(AUTHORIZATION)
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        if state.is_admin_token(token.trim()) {
            req.extensions_mut().insert(AdminSession);
        } else {
            tracing::debug!("Rejected admin token");
        }
    }

    next.run(req).await
}
