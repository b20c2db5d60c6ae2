//! Admin accreditation endpoints.

use accreditation_common::{AppError, AppResult};
use accreditation_core::{
    AccreditationList, BulkAction, BulkOutcome, DisplayNames, EmailOutcome, ExportFormat,
    ExportSheet, RenderedEmail, StatusCounts, export,
};
use accreditation_db::entities::accreditation::{self, AccreditationStatus};
use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};

use crate::{extractors::AdminUser, middleware::AppState, response::ApiResponse};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/list", post(list))
        .route("/stats", post(stats))
        .route("/status", post(set_status))
        .route("/zone", post(set_zone))
        .route("/bulk", post(bulk))
        .route("/export", post(export_sheet))
        .route("/preview-email", post(preview_email))
}

/// Parse an optional status filter. Blank and `all` mean no filter.
fn parse_status_filter(raw: Option<&str>) -> AppResult<Option<AccreditationStatus>> {
    match raw.map(str::trim) {
        None | Some("" | "all" | "todos") => Ok(None),
        Some(s) => AccreditationStatus::parse(s)
            .map(Some)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown status: {s}"))),
    }
}

fn parse_status(raw: &str) -> AppResult<AccreditationStatus> {
    AccreditationStatus::parse(raw)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown status: {raw}")))
}

// ==================== Responses ====================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitterResponse {
    pub name: String,
    pub first_surname: String,
    pub second_surname: Option<String>,
    pub national_id: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccreditationResponse {
    pub id: String,
    pub event_id: i32,
    pub full_name: String,
    pub given_name: String,
    pub first_surname: String,
    pub second_surname: Option<String>,
    pub national_id: String,
    pub email: String,
    pub role: String,
    pub credential_type: Option<String>,
    pub credential_number: Option<String>,
    pub area: String,
    pub area_name: String,
    pub company: String,
    pub zone_id: Option<i32>,
    pub zone_name: String,
    pub status: AccreditationStatus,
    pub rejection_reason: Option<String>,
    pub submitter: SubmitterResponse,
    pub created_at: String,
}

impl AccreditationResponse {
    fn new(r: accreditation::Model, names: &DisplayNames) -> Self {
        Self {
            full_name: r.full_name(),
            area_name: names.area_name(&r.area).to_string(),
            zone_name: names.zone_name(r.zone_id).to_string(),
            created_at: r.created_at.to_rfc3339(),
            submitter: SubmitterResponse {
                name: r.submitter_name,
                first_surname: r.submitter_first_surname,
                second_surname: r.submitter_second_surname,
                national_id: r.submitter_national_id,
                email: r.submitter_email,
                phone: r.submitter_phone,
            },
            id: r.id,
            event_id: r.event_id,
            given_name: r.given_name,
            first_surname: r.first_surname,
            second_surname: r.second_surname,
            national_id: r.national_id,
            email: r.email,
            role: r.role,
            credential_type: r.credential_type,
            credential_number: r.credential_number,
            area: r.area,
            company: r.company,
            zone_id: r.zone_id,
            status: r.status,
            rejection_reason: r.rejection_reason,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneResponse {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaResponse {
    pub code: String,
    pub name: String,
    pub max_quota: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub event_id: i32,
    pub total: usize,
    pub accreditations: Vec<AccreditationResponse>,
    pub zones: Vec<ZoneResponse>,
    pub areas: Vec<AreaResponse>,
}

impl ListResponse {
    fn new(event_id: i32, list: AccreditationList) -> Self {
        let names = list.display_names();
        Self {
            event_id,
            total: list.records.len(),
            accreditations: list
                .records
                .into_iter()
                .map(|r| AccreditationResponse::new(r, &names))
                .collect(),
            zones: list
                .zones
                .into_iter()
                .map(|z| ZoneResponse {
                    id: z.id,
                    name: z.name,
                })
                .collect(),
            areas: list
                .areas
                .into_iter()
                .map(|a| AreaResponse {
                    code: a.code,
                    name: a.name,
                    max_quota: a.max_quota,
                })
                .collect(),
        }
    }
}

// ==================== Requests ====================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRequest {
    #[serde(default)]
    pub event_id: Option<i32>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    #[serde(default)]
    pub event_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetStatusRequest {
    #[serde(default)]
    pub event_id: Option<i32>,
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetZoneRequest {
    #[serde(default)]
    pub event_id: Option<i32>,
    pub id: String,
    #[serde(default)]
    pub zone_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRequest {
    #[serde(default)]
    pub event_id: Option<i32>,
    pub action: BulkAction,
    pub ids: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    #[serde(default)]
    pub event_id: Option<i32>,
    #[serde(default)]
    pub format: ExportFormat,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    #[serde(default)]
    pub event_id: Option<i32>,
    pub id: String,
    /// Render as if the record had this status.
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeResponse {
    pub id: String,
    pub status: AccreditationStatus,
    pub rejection_reason: Option<String>,
    pub email: EmailOutcome,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneChangeResponse {
    pub id: String,
    pub zone_id: Option<i32>,
}

// ==================== Handlers ====================

/// List and filter an event's accreditations.
async fn list(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(req): Json<ListRequest>,
) -> AppResult<ApiResponse<ListResponse>> {
    let event_id = state.event_service.resolve_event(req.event_id).await;
    let status = parse_status_filter(req.status.as_deref())?;
    let term = req.search.unwrap_or_default();

    let list = state.admin_service.search(event_id, &term, status).await?;
    Ok(ApiResponse::ok(ListResponse::new(event_id, list)))
}

/// Per-status counts.
async fn stats(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(req): Json<EventRequest>,
) -> AppResult<ApiResponse<StatusCounts>> {
    let event_id = state.event_service.resolve_event(req.event_id).await;
    let counts = state.admin_service.stats(event_id).await?;
    Ok(ApiResponse::ok(counts))
}

/// Change one status; the email result is reported alongside.
async fn set_status(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(req): Json<SetStatusRequest>,
) -> AppResult<ApiResponse<StatusChangeResponse>> {
    let status = parse_status(&req.status)?;
    let event_id = state.event_service.resolve_event(req.event_id).await;
    let change = state
        .admin_service
        .set_status(event_id, &req.id, status, req.rejection_reason.as_deref())
        .await?;

    Ok(ApiResponse::ok(StatusChangeResponse {
        id: change.record.id,
        status: change.record.status,
        rejection_reason: change.record.rejection_reason,
        email: change.email,
    }))
}

/// Assign or clear a zone.
async fn set_zone(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(req): Json<SetZoneRequest>,
) -> AppResult<ApiResponse<ZoneChangeResponse>> {
    let event_id = state.event_service.resolve_event(req.event_id).await;
    let record = state
        .admin_service
        .set_zone(event_id, &req.id, req.zone_id)
        .await?;
    Ok(ApiResponse::ok(ZoneChangeResponse {
        id: record.id,
        zone_id: record.zone_id,
    }))
}

/// Approve, reject, email or delete many records.
async fn bulk(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(req): Json<BulkRequest>,
) -> AppResult<ApiResponse<BulkOutcome>> {
    let event_id = state.event_service.resolve_event(req.event_id).await;
    let outcome = state
        .admin_service
        .run_bulk(event_id, req.action, &req.ids)
        .await?;
    Ok(ApiResponse::ok(outcome))
}

/// Filtered list as a sheet.
async fn export_sheet(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(req): Json<ExportRequest>,
) -> AppResult<ApiResponse<ExportSheet>> {
    let event_id = state.event_service.resolve_event(req.event_id).await;
    let status = parse_status_filter(req.status.as_deref())?;
    let term = req.search.unwrap_or_default();

    let list = state.admin_service.search(event_id, &term, status).await?;
    let names = list.display_names();
    let records: Vec<&accreditation::Model> = list.records.iter().collect();

    Ok(ApiResponse::ok(export(req.format, &records, &names)))
}

/// Render a notification without sending it.
async fn preview_email(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(req): Json<PreviewRequest>,
) -> AppResult<ApiResponse<RenderedEmail>> {
    let status = req.status.as_deref().map(parse_status).transpose()?;
    let event_id = state.event_service.resolve_event(req.event_id).await;
    let rendered = state
        .admin_service
        .preview_email(event_id, &req.id, status)
        .await?;
    Ok(ApiResponse::ok(rendered))
}
