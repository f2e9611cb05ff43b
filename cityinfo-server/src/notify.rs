//! Notification sender triggered when a point of interest is deleted.
//!
//! The contract is fire-and-forget: `send` returns nothing, implementations
//! swallow their own failures, and a notification can neither roll back the
//! delete that triggered it nor fail the request.

use tracing::info;

/// Outbound notification channel with no delivery guarantee.
pub trait NotificationSender: Send + Sync {
    /// Emit a notification; errors are contained by the implementation.
    fn send(&self, subject: &str, body: &str);
}

/// Sender that writes notifications to the log instead of a mail backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailSender;

impl NotificationSender for LogMailSender {
    fn send(&self, subject: &str, body: &str) {
        info!(target: "cityinfo::mail", subject, body, "mail notification");
    }
}
