//! Test doubles shared by this crate's tests and downstream crates.

use std::sync::{
    Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use accreditation_common::{AppError, AppResult};
use async_trait::async_trait;

use crate::services::email::{EmailSender, OutgoingEmail, SendReceipt};

/// In-memory sender that records messages and can be told to fail.
#[derive(Debug, Default)]
pub struct MemorySender {
    sent: Mutex<Vec<OutgoingEmail>>,
    fail: AtomicBool,
    fail_for: Mutex<Vec<String>>,
    counter: AtomicUsize,
}

impl MemorySender {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A sender whose every send fails.
    #[must_use]
    pub fn failing() -> Self {
        let sender = Self::default();
        sender.fail.store(true, Ordering::SeqCst);
        sender
    }

    /// Fail sends to one recipient only.
    pub fn fail_for(&self, recipient: &str) {
        if let Ok(mut list) = self.fail_for.lock() {
            list.push(recipient.to_string());
        }
    }

    /// Messages accepted so far.
    #[must_use]
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl EmailSender for MemorySender {
    fn provider_name(&self) -> &'static str {
        "memory"
    }

    async fn send(&self, message: &OutgoingEmail) -> AppResult<SendReceipt> {
        let refused = self.fail.load(Ordering::SeqCst)
            || self
                .fail_for
                .lock()
                .map(|list| list.contains(&message.to))
                .unwrap_or(false);
        if refused {
            return Err(AppError::EmailSend(format!("refused: {}", message.to)));
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(message.clone());
        }
        Ok(SendReceipt {
            message_id: format!("mem-{n}"),
        })
    }
}
