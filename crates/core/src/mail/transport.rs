//! Provider-neutral send path.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use skyhook_shared::MailSettings;
use tracing::debug;

use super::error::MailError;
use super::message::{Address, Message};
use super::ses::SesMailClient;

/// One provider call's worth of email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    /// Resolved sender, `Name <address>` or a bare address.
    pub source: String,
    /// Primary recipient addresses.
    pub to: Vec<String>,
    /// Carbon-copy recipient addresses.
    pub cc: Vec<String>,
    /// Blind carbon-copy recipient addresses.
    pub bcc: Vec<String>,
    /// Subject line.
    pub subject: String,
    /// HTML part; `None` when the message has no HTML body.
    pub html: Option<String>,
    /// Text part; `None` when the message has no text body.
    pub text: Option<String>,
}

/// Vendor client seam.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailClient: Send + Sync {
    /// Submits one email to the provider.
    async fn send_email(&self, email: OutboundEmail) -> Result<(), MailError>;
}

/// Mail adapter handle.
#[derive(Clone)]
pub struct MailTransport {
    client: Arc<dyn MailClient>,
    from_address: String,
    timeout: Duration,
}

impl MailTransport {
    /// Default deadline for one send call.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Builds an SES-backed transport.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` when the settings are unusable.
    pub async fn from_settings(settings: &MailSettings) -> Result<Self, MailError> {
        settings
            .validate()
            .map_err(|e| MailError::Configuration(e.to_string()))?;

        let client = SesMailClient::from_settings(settings).await;
        Ok(Self::with_client(
            Arc::new(client),
            settings.from_address.clone(),
        ))
    }

    /// Builds a transport over any client.
    #[must_use]
    pub fn with_client(client: Arc<dyn MailClient>, from_address: impl Into<String>) -> Self {
        Self {
            client,
            from_address: from_address.into(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the send deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Default sender.
    #[must_use]
    pub fn from_address(&self) -> &str {
        &self.from_address
    }

    /// Maps a host message onto the provider call shape.
    ///
    /// Empty bodies are dropped rather than sent as empty parts.
    #[must_use]
    pub fn build_outbound(&self, message: &Message) -> OutboundEmail {
        let source = match &message.from {
            Some(sender) if !sender.address.is_empty() => sender.to_string(),
            _ => self.from_address.clone(),
        };
        let addresses = |list: &[Address]| {
            list.iter()
                .map(|addr| addr.address.clone())
                .collect::<Vec<_>>()
        };

        OutboundEmail {
            source,
            to: addresses(&message.to),
            cc: addresses(&message.cc),
            bcc: addresses(&message.bcc),
            subject: message.subject.clone(),
            html: message.html_body().map(str::to_string),
            text: message.text_body().map(str::to_string),
        }
    }

    /// Sends `message` in a single provider call.
    ///
    /// # Errors
    ///
    /// Returns `Timeout` when the deadline elapses, or the client's error.
    pub async fn send(&self, message: &Message) -> Result<(), MailError> {
        let email = self.build_outbound(message);
        let recipients = email.to.len() + email.cc.len() + email.bcc.len();

        tokio::time::timeout(self.timeout, self.client.send_email(email))
            .await
            .map_err(|_| MailError::Timeout(self.timeout))??;

        debug!(recipients, subject = %message.subject, "Email sent");
        Ok(())
    }
}

impl fmt::Debug for MailTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailTransport")
            .field("from_address", &self.from_address)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
