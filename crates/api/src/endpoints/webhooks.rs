//! Delivery-status webhooks from the email provider.

use accreditation_common::{AppError, AppResult};
use accreditation_core::{DeliveryWebhook, verify_webhook_signature};
use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::post,
};
use chrono::Utc;
use serde::Serialize;

use crate::{middleware::AppState, response::ApiResponse};

pub fn router() -> Router<AppState> {
    Router::new().route("/email", post(email_webhook))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAck {
    pub received: bool,
}

/// First present header among `names`.
fn header<'a>(headers: &'a HeaderMap, names: &[&str]) -> Option<&'a str> {
    names
        .iter()
        .find_map(|name| headers.get(*name).and_then(|v| v.to_str().ok()))
}

fn check_signature(secret: &str, headers: &HeaderMap, body: &[u8]) -> AppResult<()> {
    let (Some(id), Some(timestamp), Some(signature)) = (
        header(headers, &["svix-id", "webhook-id"]),
        header(headers, &["svix-timestamp", "webhook-timestamp"]),
        header(headers, &["svix-signature", "webhook-signature"]),
    ) else {
        return Err(AppError::Unauthorized);
    };

    if verify_webhook_signature(secret, id, timestamp, body, signature, Utc::now().timestamp()) {
        Ok(())
    } else {
        tracing::warn!(webhook_id = %id, "Webhook signature mismatch");
        Err(AppError::Unauthorized)
    }
}

/// Upsert the delivery status of a sent email.
async fn email_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<ApiResponse<WebhookAck>> {
    if let Some(secret) = state.webhook_secret.as_deref() {
        check_signature(secret, &headers, &body)?;
    }

    let webhook: DeliveryWebhook = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid webhook payload: {e}")))?;

    state.delivery_service.apply_webhook(webhook).await?;
    Ok(ApiResponse::ok(WebhookAck { received: true }))
}
