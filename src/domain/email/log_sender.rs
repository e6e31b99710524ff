//! Development sender that writes one log record per message.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::sender::{SendError, Sender};
use super::types::Email;

/// Sender that logs messages instead of delivering them.
///
/// The HTML body is only logged at trace level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSender;

impl LogSender {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Sender for LogSender {
    async fn send(&self, email: &Email, cancel: &CancellationToken) -> Result<(), SendError> {
        if cancel.is_cancelled() {
            return Err(SendError::Cancelled);
        }

        tracing::info!(
            to = ?email.to,
            cc = email.cc.len(),
            bcc = email.bcc.len(),
            from = email.from.as_deref().unwrap_or(""),
            subject = %email.subject,
            html_bytes = email.html.len(),
            text_bytes = email.text.len(),
            attachments = email.attachments.len(),
            tags = ?email.tags.keys().collect::<Vec<_>>(),
            "Email sent (log transport)"
        );
        tracing::trace!(subject = %email.subject, html = %email.html, "Email body");

        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
