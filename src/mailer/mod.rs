//! Message composition and handoff.
//!
//! The mailer resolves layout and subject priority, renders the template,
//! assembles an `Email` and passes it to the configured `Sender`. A render
//! failure never reaches the sender.

mod message;

pub use message::TemplateEmail;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::MailerSettings;
use crate::domain::email::{Email, SendError, Sender};
use crate::error::{MailerError, Result};
use crate::metrics::SendMetrics;
use crate::renderer::Renderer;

/// Composes template messages and delegates delivery
pub struct Mailer {
    renderer: Arc<Renderer>,
    sender: Arc<dyn Sender>,
    settings: MailerSettings,
}

impl Mailer {
    pub fn new(renderer: Arc<Renderer>, sender: Arc<dyn Sender>, settings: MailerSettings) -> Self {
        Self {
            renderer,
            sender,
            settings,
        }
    }

    pub fn renderer(&self) -> &Arc<Renderer> {
        &self.renderer
    }

    pub fn settings(&self) -> &MailerSettings {
        &self.settings
    }

    /// Render `message` and send it
    #[tracing::instrument(
        name = "mailer.send",
        skip(self, message, cancel),
        fields(template = %message.template, sender = self.sender.name())
    )]
    pub async fn send(&self, message: TemplateEmail, cancel: &CancellationToken) -> Result<()> {
        let email = self.render(message).inspect_err(|e| {
            if matches!(e, MailerError::RenderFailed(_)) {
                SendMetrics::record_render_failed();
            }
        })?;
        self.deliver(&email, cancel).await
    }

    /// Validate a pre-built email and send it as is
    #[tracing::instrument(
        name = "mailer.send_raw",
        skip(self, email, cancel),
        fields(sender = self.sender.name())
    )]
    pub async fn send_raw(&self, email: Email, cancel: &CancellationToken) -> Result<()> {
        if email.to.is_empty() {
            return Err(MailerError::NoRecipient);
        }
        if email.subject.is_empty() {
            return Err(MailerError::NoSubject);
        }
        if email.html.is_empty() {
            return Err(MailerError::NoContent);
        }

        self.deliver(&email, cancel).await
    }

    /// Build the email `send` would deliver, without sending it
    pub fn render(&self, message: TemplateEmail) -> Result<Email> {
        if message.to.is_empty() {
            return Err(MailerError::NoRecipient);
        }

        let layout = message
            .layout
            .as_deref()
            .unwrap_or(self.settings.default_layout.as_str());

        let rendered = self.renderer.render(layout, &message.template, &message.data)?;

        let subject = message
            .explicit_subject()
            .or_else(|| rendered.subject())
            .unwrap_or(self.settings.fallback_subject.as_str());
        let subject = self.renderer.render_subject(subject, &message.data)?;

        Ok(Email {
            to: vec![message.to],
            cc: message.cc,
            bcc: message.bcc,
            from: message.from.or_else(|| self.settings.default_from.clone()),
            reply_to: message
                .reply_to
                .or_else(|| self.settings.default_reply_to.clone()),
            subject,
            html: rendered.html,
            text: rendered.text,
            headers: message.headers,
            tags: message.tags,
            attachments: message.attachments,
        })
    }

    async fn deliver(&self, email: &Email, cancel: &CancellationToken) -> Result<()> {
        match self.sender.send(email, cancel).await {
            Ok(()) => {
                SendMetrics::record_sent();
                tracing::info!(
                    recipients = email.recipient_count(),
                    subject = %email.subject,
                    "Email sent"
                );
                Ok(())
            }
            Err(e) => {
                match &e {
                    SendError::Rejected(_) => SendMetrics::record_rejected(),
                    _ => SendMetrics::record_send_failed(),
                }
                tracing::warn!(
                    recipients = email.recipient_count(),
                    error = %e,
                    "Email send failed"
                );
                Err(MailerError::SendFailed(e))
            }
        }
    }
}
