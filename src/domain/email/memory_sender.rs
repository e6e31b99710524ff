//! In-memory sender that captures delivered messages.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use super::sender::{SendError, Sender};
use super::types::Email;

/// Sender that stores every accepted message in memory.
///
/// Useful for tests and previews. A rejection reason can be injected with
/// `failing`, in which case nothing is stored.
#[derive(Debug, Default)]
pub struct MemorySender {
    sent: Mutex<Vec<Email>>,
    reject_with: Option<String>,
}

impl MemorySender {
    /// Create a sender that accepts everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sender that rejects every message with `reason`
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            reject_with: Some(reason.into()),
        }
    }

    /// Copies of the accepted messages, oldest first
    pub async fn sent(&self) -> Vec<Email> {
        self.sent.lock().await.clone()
    }

    /// Number of accepted messages
    pub async fn count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Most recently accepted message
    pub async fn last(&self) -> Option<Email> {
        self.sent.lock().await.last().cloned()
    }

    /// Drop all captured messages
    pub async fn clear(&self) {
        self.sent.lock().await.clear();
    }
}

#[async_trait]
impl Sender for MemorySender {
    async fn send(&self, email: &Email, cancel: &CancellationToken) -> Result<(), SendError> {
        if cancel.is_cancelled() {
            return Err(SendError::Cancelled);
        }

        if let Some(reason) = &self.reject_with {
            return Err(SendError::Rejected(reason.clone()));
        }

        let mut sent = tokio::select! {
            _ = cancel.cancelled() => return Err(SendError::Cancelled),
            guard = self.sent.lock() => guard,
        };
        sent.push(email.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_captures_messages() {
        let sender = MemorySender::new();
        let cancel = CancellationToken::new();

        sender
            .send(&Email::new("a@example.com", "One", "<p>1</p>"), &cancel)
            .await
            .unwrap();
        sender
            .send(&Email::new("b@example.com", "Two", "<p>2</p>"), &cancel)
            .await
            .unwrap();

        assert_eq!(sender.count().await, 2);
        assert_eq!(sender.last().await.unwrap().subject, "Two");
        assert_eq!(sender.sent().await[0].to, vec!["a@example.com"]);

        sender.clear().await;
        assert_eq!(sender.count().await, 0);
    }

    #[tokio::test]
    async fn test_cancelled_token() {
        let sender = MemorySender::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = sender.send(&Email::new("a@example.com", "x", "y"), &cancel).await;
        assert!(matches!(result, Err(SendError::Cancelled)));
        assert_eq!(sender.count().await, 0);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let sender = MemorySender::failing("mailbox full");
        let result = sender
            .send(&Email::new("a@example.com", "x", "y"), &CancellationToken::new())
            .await;

        match result {
            Err(SendError::Rejected(reason)) => assert_eq!(reason, "mailbox full"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(sender.count().await, 0);
    }
}
