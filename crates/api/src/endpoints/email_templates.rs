//! Admin email template endpoints.

use accreditation_common::AppResult;
use accreditation_core::UpsertTemplateInput;
use accreditation_db::entities::email_template::{self, TemplateType, ZoneKey};
use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};

use crate::{extractors::AdminUser, middleware::AppState, response::ApiResponse};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/show", post(show))
        .route("/update", post(update))
}

/// Template override response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateResponse {
    pub id: String,
    pub event_id: i32,
    pub template_type: TemplateType,
    pub zone_key: ZoneKey,
    pub subject: Option<String>,
    pub match_description: Option<String>,
    pub event_date: Option<String>,
    pub venue: Option<String>,
    pub arrival_time: Option<String>,
    pub start_time: Option<String>,
    pub contact_email: Option<String>,
    pub intro_text: Option<String>,
    pub instructions_text: Option<String>,
    pub general_info_text: Option<String>,
    pub updated_at: String,
}

impl From<email_template::Model> for TemplateResponse {
    fn from(t: email_template::Model) -> Self {
        Self {
            id: t.id,
            event_id: t.event_id,
            template_type: t.template_type,
            zone_key: t.zone_key,
            subject: t.subject,
            match_description: t.match_description,
            event_date: t.event_date,
            venue: t.venue,
            arrival_time: t.arrival_time,
            start_time: t.start_time,
            contact_email: t.contact_email,
            intro_text: t.intro_text,
            instructions_text: t.instructions_text,
            general_info_text: t.general_info_text,
            updated_at: t.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowRequest {
    #[serde(default)]
    pub event_id: Option<i32>,
    /// When set, only this type and zone key are returned.
    #[serde(default)]
    pub template_type: Option<TemplateType>,
    #[serde(default)]
    pub zone_key: ZoneKey,
}

/// Override rows of an event.
async fn show(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(req): Json<ShowRequest>,
) -> AppResult<ApiResponse<Vec<TemplateResponse>>> {
    let event_id = state.event_service.resolve_event(req.event_id).await;

    let rows = match req.template_type {
        Some(template_type) => vec![
            state
                .template_service
                .get(event_id, template_type, req.zone_key)
                .await?,
        ],
        None => state.template_service.list(event_id).await?,
    };

    Ok(ApiResponse::ok(
        rows.into_iter().map(TemplateResponse::from).collect(),
    ))
}

/// Create or replace an override row.
async fn update(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(req): Json<UpsertTemplateInput>,
) -> AppResult<ApiResponse<TemplateResponse>> {
    let row = state.template_service.upsert(req).await?;
    tracing::info!(
        event_id = row.event_id,
        template_type = ?row.template_type,
        zone_key = ?row.zone_key,
        "Email template saved"
    );
    Ok(ApiResponse::ok(row.into()))
}
