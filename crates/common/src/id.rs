//! ID generation utilities.

use ulid::Ulid;
use uuid::Uuid;

/// ID generator for accreditation rows and email log entries.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based ID.
    ///
    /// ULIDs sort by creation time, so ordering by ID matches submission order
    /// closely enough for the admin list.
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Generate a placeholder provider message id for transports that do not
    /// return one (SMTP, log-only).
    #[must_use]
    pub fn generate_message_id(&self, prefix: &str) -> String {
        format!("{prefix}-{}", Uuid::new_v4().simple())
    }
}
