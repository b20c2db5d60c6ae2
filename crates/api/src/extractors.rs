//! Request extractors.

use accreditation_common::AppError;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Marker placed in request extensions by the auth middleware.
#[derive(Debug, Clone, Copy)]
pub struct AdminSession;

/// Authenticated administrator extractor.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser;

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AdminSession>()
            .map(|_| Self)
            .ok_or(AppError::Unauthorized)
    }
}
