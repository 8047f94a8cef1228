//! Operator notification capability
//!
//! Notifications are best-effort: failures are logged and never propagated.
//! The delivery mechanism (email, chat webhook, ...) lives outside this
//! crate; the provided implementation writes to the log so the message at
//! least lands somewhere an operator will see it.

use std::sync::Arc;

/// Best-effort notification sink for operator-facing messages
pub trait Notifier: Send + Sync {
    /// Delivers a message to the operator; must never panic or block long
    fn notify(&self, subject: &str, body: &str);
}

/// Notifier that writes messages to the tracing log
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, subject: &str, body: &str) {
        tracing::warn!("Operator notification: {} - {}", subject, body);
    }
}

/// Convenience constructor for the default notifier
pub fn log_notifier() -> Arc<dyn Notifier> {
    Arc::new(LogNotifier)
}
