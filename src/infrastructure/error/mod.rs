//! Top-level error taxonomy

use thiserror::Error;

use crate::domain::email::SendError;
use crate::domain::template::{FrontmatterError, RenderError};

/// Errors returned by the mailer
#[derive(Error, Debug)]
pub enum MailerError {
    #[error("Message has no recipient")]
    NoRecipient,

    #[error("Message has no subject")]
    NoSubject,

    #[error("Message has no content")]
    NoContent,

    #[error("Render failed: {0}")]
    RenderFailed(#[source] RenderError),

    #[error("Send failed: {0}")]
    SendFailed(#[source] SendError),
}

impl MailerError {
    /// Check if the named template does not exist
    pub fn is_template_not_found(&self) -> bool {
        matches!(self, Self::RenderFailed(RenderError::TemplateNotFound(_)))
    }

    /// Check if the named layout does not exist
    pub fn is_layout_not_found(&self) -> bool {
        matches!(self, Self::RenderFailed(RenderError::LayoutNotFound(_)))
    }

    /// Check if the template's frontmatter is malformed
    pub fn is_frontmatter(&self) -> bool {
        matches!(self, Self::RenderFailed(RenderError::Frontmatter { .. }))
    }

    /// The underlying frontmatter error, if that is the cause
    pub fn frontmatter_error(&self) -> Option<&FrontmatterError> {
        match self {
            Self::RenderFailed(RenderError::Frontmatter { source, .. }) => Some(source),
            _ => None,
        }
    }

    /// Check if the caller cancelled the send
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::SendFailed(SendError::Cancelled))
    }
}

impl From<RenderError> for MailerError {
    fn from(err: RenderError) -> Self {
        MailerError::RenderFailed(err)
    }
}

impl From<SendError> for MailerError {
    fn from(err: SendError) -> Self {
        MailerError::SendFailed(err)
    }
}

/// Errors raised while loading CLI input
#[derive(Error, Debug)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid template data: {0}")]
    Data(#[from] serde_json::Error),

    #[error("Template data must be a JSON object")]
    DataNotObject,
}

pub type Result<T> = std::result::Result<T, MailerError>;
