//! API endpoints.

mod accreditations;
mod email_templates;
mod health;
mod intake;
mod webhooks;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/accreditations", intake::router())
        .nest("/admin/accreditations", accreditations::router())
        .nest("/admin/email-templates", email_templates::router())
        .nest("/webhooks", webhooks::router())
}
