//! Public accreditation intake.

use accreditation_common::AppResult;
use accreditation_core::IntakeRequest;
use axum::{Json, Router, extract::State, response::Response, routing::post};
use serde::Serialize;

use crate::{middleware::AppState, response::created};

pub fn router() -> Router<AppState> {
    Router::new().route("/press", post(submit_press))
}

/// Body of an accepted batch.
#[derive(Debug, Serialize)]
pub struct IntakeResponse {
    pub success: bool,
    pub acreditados_insertados: u64,
    pub evento_id: i32,
}

/// Submit a batch of press accreditations.
async fn submit_press(
    State(state): State<AppState>,
    Json(req): Json<IntakeRequest>,
) -> AppResult<Response> {
    let outcome = state.intake_service.submit_batch(req).await?;

    Ok(created(IntakeResponse {
        success: true,
        acreditados_insertados: outcome.inserted,
        evento_id: outcome.event_id,
    }))
}
