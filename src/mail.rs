//! Email sending boundary (§6.6): a provider-abstraction interface the core
//! calls when an entity lifecycle wants to notify someone (e.g. an export
//! failure), without the core depending on any particular mail transport.
//! Delivery is synchronous per call; retry/backoff is the caller's
//! responsibility, not this trait's.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

/// A transport-agnostic message. Concrete `MailProvider` impls translate
/// this into whatever wire format their transport needs (e.g.
/// `lettre::Message` for SMTP, grounded in `app::DefaultAppState`).
#[derive(Debug, Clone)]
pub struct NormalizedMessage {
    pub to: String,
    pub from: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub html: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Error)]
#[error("mail delivery failed: {0}")]
pub struct MailError(pub String);

#[cfg_attr(test, automock)]
#[async_trait]
pub trait MailProvider: Send + Sync {
    async fn send(&self, message: NormalizedMessage) -> Result<(), MailError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NormalizedMessage {
        NormalizedMessage {
            to: "user@example.com".to_string(),
            from: "noreply@example.com".to_string(),
            reply_to: None,
            subject: "Export ready".to_string(),
            html: Some("<p>done</p>".to_string()),
            text: Some("done".to_string()),
        }
    }

    #[tokio::test]
    async fn mock_provider_records_the_call() {
        let mut provider = MockMailProvider::new();
        provider.expect_send().times(1).returning(|_| Ok(()));
        provider.send(sample()).await.unwrap();
    }
}
