//! Core business logic for accreditation-rs.

pub mod services;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use services::*;
