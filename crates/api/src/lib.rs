//! HTTP API layer for accreditation-rs.
//!
//! - **Endpoints**: public intake, admin review, email templates, provider webhooks
//! - **Extractors**: admin authentication
//! - **Middleware**: application state and bearer-token resolution
//!
//! Built on Axum 0.8.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
