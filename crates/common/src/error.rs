//! Error types for accreditation-rs.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value, json};
use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Message shown to end users for unexpected backend failures.
pub const GENERIC_FAILURE_MESSAGE: &str = "No se pudo procesar la solicitud";

/// Numbers behind a refused batch, so the caller can render a precise message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotaDetail {
    /// Area code the batch was submitted to.
    pub area: String,
    /// Company/outlet whose sub-allocation was checked.
    pub company: String,
    /// Configured maximum for the area.
    pub max: i64,
    /// Valid (non-rejected) rows already stored for the triple.
    pub existing: i64,
    /// Size of the incoming batch.
    pub requested: i64,
}

impl QuotaDetail {
    /// Total after accepting the batch.
    #[must_use]
    pub const fn total(&self) -> i64 {
        self.existing.saturating_add(self.requested)
    }

    /// Slots still free before the batch. Negative when already overcommitted.
    #[must_use]
    pub const fn available(&self) -> i64 {
        self.max.saturating_sub(self.existing)
    }
}

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // === Intake gate failures ===
    #[error("Datos incompletos: {0}")]
    IncompleteData(String),

    #[error("Área no encontrada: {0}")]
    AreaNotFound(String),

    #[error(
        "No hay cupos suficientes para {} en el área {}: máximo {}, existentes {}, solicitados {}",
        .0.company, .0.area, .0.max, .0.existing, .0.requested
    )]
    QuotaExceeded(QuotaDetail),

    #[error("Uno o más RUT ya están registrados para este evento")]
    DuplicateNationalId,

    // === Client Errors ===
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    // === Server Errors ===
    #[error("Database error: {0}")]
    Database(String),

    #[error("Email send error: {0}")]
    EmailSend(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            // 4xx Client Errors
            Self::IncompleteData(_)
            | Self::AreaNotFound(_)
            | Self::QuotaExceeded(_)
            | Self::BadRequest(_)
            | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::DuplicateNationalId => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,

            // 5xx Server Errors
            Self::Database(_)
            | Self::EmailSend(_)
            | Self::Config(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ExternalService(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::IncompleteData(_) => "INCOMPLETE_DATA",
            Self::AreaNotFound(_) => "AREA_NOT_FOUND",
            Self::QuotaExceeded(_) => "QUOTA_EXCEEDED",
            Self::DuplicateNationalId => "DUPLICATE_RUT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::EmailSend(_) => "EMAIL_SEND_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Builds the JSON body sent to clients.
    ///
    /// Server errors never expose backend text as the primary message; it is
    /// attached under `details` for debugging only.
    #[must_use]
    pub fn to_body(&self) -> Value {
        let mut body = Map::new();
        body.insert("code".to_string(), json!(self.error_code()));

        match self {
            Self::QuotaExceeded(detail) => {
                body.insert("error".to_string(), json!(self.to_string()));
                body.insert("area".to_string(), json!(detail.area));
                body.insert("empresa".to_string(), json!(detail.company));
                body.insert("cupos_disponibles".to_string(), json!(detail.available()));
                body.insert("cupo_maximo".to_string(), json!(detail.max));
                body.insert("acreditados_existentes".to_string(), json!(detail.existing));
                body.insert("acreditados_solicitados".to_string(), json!(detail.requested));
            }
            Self::DuplicateNationalId => {
                body.insert(
                    "error".to_string(),
                    json!("Uno o más RUT ya están registrados para este evento. Revisa los datos ingresados."),
                );
                body.insert("isRutDuplicate".to_string(), json!(true));
            }
            _ if self.is_server_error() => {
                body.insert("error".to_string(), json!(GENERIC_FAILURE_MESSAGE));
                body.insert("details".to_string(), json!(self.to_string()));
            }
            _ => {
                body.insert("error".to_string(), json!(self.to_string()));
            }
        }

        Value::Object(body)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        // Log server errors
        if self.is_server_error() {
            tracing::error!(error = %self, code = code, "Server error occurred");
        } else {
            tracing::debug!(error = %self, code = code, "Client error occurred");
        }

        (status, Json(self.to_body())).into_response()
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
