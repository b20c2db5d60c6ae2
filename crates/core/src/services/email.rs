//! Outbound email providers.

use std::sync::Arc;
use std::time::Duration;

use accreditation_common::{AppError, AppResult, EmailProviderKind, IdGenerator, config::EmailSettings};
use async_trait::async_trait;
use futures::future::join_all;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use serde::{Deserialize, Serialize};

/// Email message to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    /// Recipient email address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// HTML body
    pub html: String,
}

/// What the provider returned for an accepted message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendReceipt {
    /// Provider message id, used to match delivery webhooks.
    pub message_id: String,
}

/// Something that can deliver email.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Short provider name for logs.
    fn provider_name(&self) -> &'static str;

    /// Send one message.
    async fn send(&self, message: &OutgoingEmail) -> AppResult<SendReceipt>;

    /// Send several messages, one result per message in input order.
    ///
    /// One failure does not cancel the others.
    async fn send_batch(&self, messages: &[OutgoingEmail]) -> Vec<AppResult<SendReceipt>> {
        join_all(messages.iter().map(|m| self.send(m))).await
    }
}

/// Build the configured provider.
pub fn build_sender(settings: &EmailSettings) -> AppResult<Arc<dyn EmailSender>> {
    let sender: Arc<dyn EmailSender> = match settings.provider {
        EmailProviderKind::Resend => Arc::new(ResendSender::new(settings)?),
        EmailProviderKind::Smtp => Arc::new(SmtpSender::new(settings)?),
        EmailProviderKind::Log => Arc::new(LogSender::new(settings.from_address.clone())),
    };

    tracing::info!(provider = sender.provider_name(), "Email provider configured");
    Ok(sender)
}

// ==================== HTTP API (Resend-compatible) ====================

#[derive(Debug, Serialize)]
struct ApiEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ApiSendResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ApiBatchResponse {
    data: Vec<ApiSendResponse>,
}

/// HTTP API provider.
#[derive(Clone)]
pub struct ResendSender {
    http_client: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
    reply_to: Option<String>,
}

impl ResendSender {
    /// Create a new HTTP provider. Requires `email.api_key`.
    pub fn new(settings: &EmailSettings) -> AppResult<Self> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AppError::Config("email.api_key is required for the resend provider".to_string()))?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| AppError::Config(format!("HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            api_key,
            from: settings.from_address.clone(),
            reply_to: settings.reply_to.clone(),
        })
    }

    fn payload<'a>(&'a self, message: &'a OutgoingEmail) -> ApiEmail<'a> {
        ApiEmail {
            from: &self.from,
            to: [message.to.as_str()],
            subject: &message.subject,
            html: &message.html,
            reply_to: self.reply_to.as_deref(),
        }
    }

    async fn post<T: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> AppResult<reqwest::Response> {
        let response = self
            .http_client
            .post(format!("{}{path}", self.api_url))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::EmailSend(format!("Email API request failed: {e}")))?;

        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            Err(AppError::EmailSend(format!(
                "Email API returned {status}: {error_text}"
            )))
        }
    }
}

#[async_trait]
impl EmailSender for ResendSender {
    fn provider_name(&self) -> &'static str {
        "resend"
    }

    async fn send(&self, message: &OutgoingEmail) -> AppResult<SendReceipt> {
        let response = self.post("/emails", &self.payload(message)).await?;
        let body: ApiSendResponse = response
            .json()
            .await
            .map_err(|e| AppError::EmailSend(format!("Invalid email API response: {e}")))?;

        Ok(SendReceipt {
            message_id: body.id,
        })
    }

    async fn send_batch(&self, messages: &[OutgoingEmail]) -> Vec<AppResult<SendReceipt>> {
        if messages.is_empty() {
            return Vec::new();
        }

        let payload: Vec<ApiEmail<'_>> = messages.iter().map(|m| self.payload(m)).collect();
        let result = match self.post("/emails/batch", &payload).await {
            Ok(response) => response
                .json::<ApiBatchResponse>()
                .await
                .map_err(|e| AppError::EmailSend(format!("Invalid email API response: {e}"))),
            Err(e) => Err(e),
        };

        batch_receipts(result, messages.len())
    }
}

/// One result per batch message. An acknowledgement that does not cover every
/// message cannot be matched to recipients, so every message is failed.
fn batch_receipts(
    result: AppResult<ApiBatchResponse>,
    expected: usize,
) -> Vec<AppResult<SendReceipt>> {
    let error = match result {
        Ok(body) if body.data.len() == expected => {
            return body
                .data
                .into_iter()
                .map(|r| Ok(SendReceipt { message_id: r.id }))
                .collect();
        }
        Ok(body) => format!(
            "Email API acknowledged {} of {expected} messages",
            body.data.len()
        ),
        Err(e) => e.to_string(),
    };

    (0..expected)
        .map(|_| Err(AppError::EmailSend(error.clone())))
        .collect()
}

// ==================== SMTP ====================

/// SMTP relay provider.
#[derive(Clone)]
pub struct SmtpSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    reply_to: Option<Mailbox>,
    id_gen: IdGenerator,
}

fn parse_mailbox(raw: &str, setting: &str) -> AppResult<Mailbox> {
    raw.parse()
        .map_err(|e| AppError::Config(format!("{setting} is not a valid address: {e}")))
}

impl SmtpSender {
    /// Create a new SMTP provider. Requires `email.smtp_host`.
    pub fn new(settings: &EmailSettings) -> AppResult<Self> {
        let host = settings
            .smtp_host
            .as_deref()
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| AppError::Config("email.smtp_host is required for the smtp provider".to_string()))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| AppError::Config(format!("SMTP relay {host}: {e}")))?
            .port(settings.smtp_port);

        if let (Some(username), Some(password)) = (&settings.smtp_username, &settings.smtp_password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        let reply_to = settings
            .reply_to
            .as_deref()
            .map(|r| parse_mailbox(r, "email.reply_to"))
            .transpose()?;

        Ok(Self {
            transport: builder.build(),
            from: parse_mailbox(&settings.from_address, "email.from_address")?,
            reply_to,
            id_gen: IdGenerator::new(),
        })
    }
}

#[async_trait]
impl EmailSender for SmtpSender {
    fn provider_name(&self) -> &'static str {
        "smtp"
    }

    async fn send(&self, message: &OutgoingEmail) -> AppResult<SendReceipt> {
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|e| AppError::EmailSend(format!("Invalid recipient {}: {e}", message.to)))?;

        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_HTML);
        if let Some(reply_to) = &self.reply_to {
            builder = builder.reply_to(reply_to.clone());
        }

        let email = builder
            .body(message.html.clone())
            .map_err(|e| AppError::EmailSend(format!("Could not build message: {e}")))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| AppError::EmailSend(format!("SMTP send failed: {e}")))?;

        Ok(SendReceipt {
            message_id: self.id_gen.generate_message_id("smtp"),
        })
    }
}

// ==================== Log only ====================

/// Development provider that only logs.
#[derive(Clone)]
pub struct LogSender {
    from: String,
    id_gen: IdGenerator,
}

impl LogSender {
    #[must_use]
    pub const fn new(from: String) -> Self {
        Self {
            from,
            id_gen: IdGenerator::new(),
        }
    }
}

#[async_trait]
impl EmailSender for LogSender {
    fn provider_name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, message: &OutgoingEmail) -> AppResult<SendReceipt> {
        let message_id = self.id_gen.generate_message_id("log");
        tracing::info!(
            from = %self.from,
            to = %message.to,
            subject = %message.subject,
            message_id = %message_id,
            "Email not sent (log provider)"
        );
        Ok(SendReceipt { message_id })
    }
}
