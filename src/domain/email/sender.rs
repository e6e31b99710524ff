//! Delivery abstraction for outgoing email.
//!
//! The mailer never talks to a transport directly; it hands a finished
//! `Email` to whatever `Sender` it was built with (SMTP relay, provider API,
//! in-memory capture, log output).

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::types::Email;

/// Errors that can occur while handing a message to a transport.
#[derive(Debug, Error)]
pub enum SendError {
    /// The caller cancelled before delivery completed
    #[error("Send cancelled")]
    Cancelled,

    /// The transport refused the message
    #[error("Message rejected: {0}")]
    Rejected(String),

    /// The transport failed
    #[error("Transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl SendError {
    /// Wrap a transport failure
    pub fn transport(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Transport(error.into())
    }
}

/// Delivery contract.
///
/// # Thread Safety
///
/// Implementations must be thread-safe (`Send + Sync`) as a single sender is
/// shared by every caller of the mailer.
///
/// # Cancellation
///
/// `cancel` belongs to the caller. Implementations should stop waiting and
/// return `SendError::Cancelled` once it fires.
#[async_trait]
pub trait Sender: Send + Sync {
    /// Deliver `email`. The message is borrowed and must not be retained.
    async fn send(&self, email: &Email, cancel: &CancellationToken) -> Result<(), SendError>;

    /// Transport name for logs
    fn name(&self) -> &'static str {
        "sender"
    }
}
