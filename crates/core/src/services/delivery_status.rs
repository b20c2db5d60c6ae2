//! Email send log and delivery-status webhooks.

use accreditation_common::{AppError, AppResult, IdGenerator};
use accreditation_db::{
    entities::{
        email_log::{self, DeliveryStatus},
        email_template::TemplateType,
    },
    repositories::EmailLogRepository,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sea_orm::{IntoActiveModel, Set};
use serde::Deserialize;
use sha2::Sha256;

use super::email::SendReceipt;

type HmacSha256 = Hmac<Sha256>;

/// Maximum accepted clock skew for signed webhooks, in seconds.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Map a webhook event type to a delivery status.
///
/// Accepts both bare names (`delivered`) and provider names (`email.delivered`).
#[must_use]
pub fn parse_event_type(event_type: &str) -> Option<DeliveryStatus> {
    let name = event_type.trim();
    let name = name.strip_prefix("email.").unwrap_or(name);
    match name {
        "sent" => Some(DeliveryStatus::Sent),
        "delivered" => Some(DeliveryStatus::Delivered),
        "delivery_delayed" | "delayed" => Some(DeliveryStatus::Delayed),
        "complained" => Some(DeliveryStatus::Complained),
        "bounced" => Some(DeliveryStatus::Bounced),
        "opened" => Some(DeliveryStatus::Opened),
        "clicked" => Some(DeliveryStatus::Clicked),
        _ => None,
    }
}

/// Recipient field; providers send either a string or a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    One(String),
    Many(Vec<String>),
}

impl Recipients {
    fn first(&self) -> Option<&str> {
        match self {
            Self::One(s) => Some(s.as_str()),
            Self::Many(list) => list.first().map(String::as_str),
        }
    }
}

/// Payload of a delivery-status webhook.
#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryWebhook {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: DeliveryWebhookData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryWebhookData {
    pub email_id: String,
    #[serde(default)]
    pub to: Option<Recipients>,
    #[serde(default)]
    pub bounce: Option<serde_json::Value>,
    #[serde(default)]
    pub click: Option<serde_json::Value>,
}

impl DeliveryWebhookData {
    /// Bounce message or clicked link, when present.
    fn detail(&self) -> Option<String> {
        let describe = |value: &serde_json::Value, key: &str| {
            value
                .get(key)
                .and_then(serde_json::Value::as_str)
                .map(String::from)
                .unwrap_or_else(|| value.to_string())
        };

        self.bounce
            .as_ref()
            .map(|b| describe(b, "message"))
            .or_else(|| self.click.as_ref().map(|c| describe(c, "link")))
    }
}

/// Verify a signed webhook.
///
/// The signed content is `{id}.{timestamp}.{body}`; the secret is base64 with an
/// optional `whsec_` prefix; the header holds space-separated `v1,<base64>`
/// signatures, any of which may match.
#[must_use]
pub fn verify_webhook_signature(
    secret: &str,
    message_id: &str,
    timestamp: &str,
    body: &[u8],
    signature_header: &str,
    now: i64,
) -> bool {
    let Ok(ts) = timestamp.trim().parse::<i64>() else {
        return false;
    };
    if (now - ts).abs() > SIGNATURE_TOLERANCE_SECS {
        return false;
    }

    let key_b64 = secret.strip_prefix("whsec_").unwrap_or(secret);
    let Ok(key) = STANDARD.decode(key_b64) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(&key) else {
        return false;
    };
    mac.update(message_id.as_bytes());
    mac.update(b".");
    mac.update(timestamp.trim().as_bytes());
    mac.update(b".");
    mac.update(body);

    signature_header
        .split_whitespace()
        .filter_map(|part| part.strip_prefix("v1,"))
        .filter_map(|sig| STANDARD.decode(sig).ok())
        .any(|sig| mac.clone().verify_slice(&sig).is_ok())
}

/// Records sends and applies delivery updates.
#[derive(Clone)]
pub struct DeliveryStatusService {
    email_log_repo: EmailLogRepository,
    id_gen: IdGenerator,
}

impl DeliveryStatusService {
    #[must_use]
    pub const fn new(email_log_repo: EmailLogRepository) -> Self {
        Self {
            email_log_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Log a send attempt.
    ///
    /// When a webhook for the same message id already created the row, the row
    /// is linked to the accreditation and its delivery status is kept.
    pub async fn record_send(
        &self,
        accreditation_id: &str,
        recipient: &str,
        template_type: TemplateType,
        outcome: &AppResult<SendReceipt>,
    ) -> AppResult<email_log::Model> {
        let (message_id, status, detail) = match outcome {
            Ok(receipt) => (Some(receipt.message_id.clone()), DeliveryStatus::Sent, None),
            Err(e) => (None, DeliveryStatus::Failed, Some(e.to_string())),
        };

        if let Some(id) = &message_id {
            if let Some(existing) = self.email_log_repo.find_by_provider_id(id).await? {
                let mut active = existing.into_active_model();
                active.accreditation_id = Set(Some(accreditation_id.to_string()));
                active.template_type = Set(Some(template_type));
                active.updated_at = Set(Some(Utc::now().into()));
                return self.email_log_repo.update(active).await;
            }
        }

        self.email_log_repo
            .create(email_log::ActiveModel {
                id: Set(self.id_gen.generate()),
                accreditation_id: Set(Some(accreditation_id.to_string())),
                recipient: Set(recipient.to_string()),
                template_type: Set(Some(template_type)),
                provider_message_id: Set(message_id),
                status: Set(status),
                detail: Set(detail),
                created_at: Set(Utc::now().into()),
                updated_at: Set(None),
            })
            .await
    }

    /// Upsert the log row for a webhook, keyed by provider message id.
    pub async fn apply_webhook(&self, webhook: DeliveryWebhook) -> AppResult<email_log::Model> {
        let status = parse_event_type(&webhook.event_type).ok_or_else(|| {
            AppError::BadRequest(format!("Unknown event type: {}", webhook.event_type))
        })?;
        let detail = webhook.data.detail();
        let email_id = webhook.data.email_id.trim();
        if email_id.is_empty() {
            return Err(AppError::BadRequest("data.email_id is required".to_string()));
        }

        let row = match self.email_log_repo.find_by_provider_id(email_id).await? {
            Some(existing) => {
                self.email_log_repo
                    .update_status(existing, status, detail)
                    .await?
            }
            None => {
                let recipient = webhook
                    .data
                    .to
                    .as_ref()
                    .and_then(Recipients::first)
                    .unwrap_or_default()
                    .to_string();
                self.email_log_repo
                    .create(email_log::ActiveModel {
                        id: Set(self.id_gen.generate()),
                        accreditation_id: Set(None),
                        recipient: Set(recipient),
                        template_type: Set(None),
                        provider_message_id: Set(Some(email_id.to_string())),
                        status: Set(status),
                        detail: Set(detail),
                        created_at: Set(Utc::now().into()),
                        updated_at: Set(None),
                    })
                    .await?
            }
        };

        tracing::debug!(
            email_id = %email_id,
            status = ?row.status,
            "Delivery status applied"
        );

        Ok(row)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn log_row(status: DeliveryStatus) -> email_log::Model {
        email_log::Model {
            id: "log1".to_string(),
            accreditation_id: Some("acc1".to_string()),
            recipient: "ana@canalx.cl".to_string(),
            template_type: Some(TemplateType::Approval),
            provider_message_id: Some("msg_1".to_string()),
            status,
            detail: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn webhook(event_type: &str) -> DeliveryWebhook {
        serde_json::from_value(serde_json::json!({
            "type": event_type,
            "data": {
                "email_id": "msg_1",
                "to": ["ana@canalx.cl"],
                "bounce": { "message": "Mailbox full" }
            }
        }))
        .unwrap()
    }

    fn sign(secret_b64: &str, id: &str, ts: &str, body: &[u8]) -> String {
        let key = STANDARD.decode(secret_b64).unwrap();
        let mut mac = HmacSha256::new_from_slice(&key).unwrap();
        mac.update(format!("{id}.{ts}.").as_bytes());
        mac.update(body);
        format!("v1,{}", STANDARD.encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn test_parse_event_type() {
        assert_eq!(parse_event_type("email.delivered"), Some(DeliveryStatus::Delivered));
        assert_eq!(parse_event_type("delivery_delayed"), Some(DeliveryStatus::Delayed));
        assert_eq!(parse_event_type("bounced"), Some(DeliveryStatus::Bounced));
        assert_eq!(parse_event_type("email.scheduled"), None);
    }

    #[test]
    fn test_webhook_detail_and_recipient() {
        let hook = webhook("bounced");
        assert_eq!(hook.data.detail().as_deref(), Some("Mailbox full"));
        assert_eq!(hook.data.to.as_ref().and_then(Recipients::first), Some("ana@canalx.cl"));

        let single: DeliveryWebhook = serde_json::from_value(serde_json::json!({
            "type": "clicked",
            "data": { "email_id": "x", "to": "b@c.cl", "click": { "link": "https://club.cl" } }
        }))
        .unwrap();
        assert_eq!(single.data.detail().as_deref(), Some("https://club.cl"));
        assert_eq!(single.data.to.as_ref().and_then(Recipients::first), Some("b@c.cl"));
    }

    #[test]
    fn test_signature_roundtrip_and_tamper() {
        let secret_b64 = STANDARD.encode(b"super-secret-signing-key");
        let secret = format!("whsec_{secret_b64}");
        let body = br#"{"type":"email.delivered"}"#;
        let header = sign(&secret_b64, "msg_abc", "1700000000", body);

        assert!(verify_webhook_signature(&secret, "msg_abc", "1700000000", body, &header, 1_700_000_010));
        assert!(!verify_webhook_signature(&secret, "msg_abc", "1700000000", b"{}", &header, 1_700_000_010));
        assert!(!verify_webhook_signature(&secret, "msg_other", "1700000000", body, &header, 1_700_000_010));
        // stale timestamp
        assert!(!verify_webhook_signature(&secret, "msg_abc", "1700000000", body, &header, 1_700_001_000));
    }

    #[test]
    fn test_signature_header_with_several_entries() {
        let secret_b64 = STANDARD.encode(b"k");
        let body = b"payload";
        let good = sign(&secret_b64, "id", "10", body);
        let header = format!("v1,AAAA {good}");
        assert!(verify_webhook_signature(&secret_b64, "id", "10", body, &header, 10));
    }

    #[tokio::test]
    async fn test_webhook_updates_existing_row() {
        let mut updated = log_row(DeliveryStatus::Bounced);
        updated.detail = Some("Mailbox full".to_string());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[log_row(DeliveryStatus::Sent)]])
                .append_query_results([[updated]])
                .into_connection(),
        );
        let service = DeliveryStatusService::new(EmailLogRepository::new(db));

        let row = service.apply_webhook(webhook("email.bounced")).await.unwrap();
        assert_eq!(row.status, DeliveryStatus::Bounced);
        assert_eq!(row.detail.as_deref(), Some("Mailbox full"));
    }

    #[tokio::test]
    async fn test_webhook_before_send_log_inserts_row() {
        let mut inserted = log_row(DeliveryStatus::Delivered);
        inserted.accreditation_id = None;
        inserted.template_type = None;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<email_log::Model>::new()])
                .append_query_results([[inserted]])
                .into_connection(),
        );
        let service = DeliveryStatusService::new(EmailLogRepository::new(db));

        let row = service.apply_webhook(webhook("delivered")).await.unwrap();
        assert_eq!(row.status, DeliveryStatus::Delivered);
        assert!(row.accreditation_id.is_none());
    }

    #[tokio::test]
    async fn test_unknown_webhook_type_is_bad_request() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = DeliveryStatusService::new(EmailLogRepository::new(db));
        let result = service.apply_webhook(webhook("email.scheduled")).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_failed_send_is_logged_without_message_id() {
        let mut failed = log_row(DeliveryStatus::Failed);
        failed.provider_message_id = None;
        failed.detail = Some("Email send error: refused".to_string());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[failed]])
                .into_connection(),
        );
        let service = DeliveryStatusService::new(EmailLogRepository::new(db));

        let outcome: AppResult<SendReceipt> = Err(AppError::EmailSend("refused".to_string()));
        let row = service
            .record_send("acc1", "ana@canalx.cl", TemplateType::Approval, &outcome)
            .await
            .unwrap();
        assert_eq!(row.status, DeliveryStatus::Failed);
    }
}
