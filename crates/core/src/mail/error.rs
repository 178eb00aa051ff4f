//! Mail error types.

use std::time::Duration;

use skyhook_shared::{CapabilityKind, IntegrationError};
use thiserror::Error;

/// Mail transport errors.
#[derive(Debug, Error)]
pub enum MailError {
    /// The send call did not finish within its deadline.
    #[error("send timed out after {0:?}")]
    Timeout(Duration),

    /// The provider rejected the message or could not be reached.
    #[error("failed to send email: {0}")]
    Send(String),

    /// The message is not deliverable as constructed.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Transport configuration error.
    #[error("mail configuration error: {0}")]
    Configuration(String),
}

impl From<MailError> for IntegrationError {
    fn from(err: MailError) -> Self {
        match err {
            MailError::Configuration(reason) => {
                Self::construction_failed(CapabilityKind::Mail, reason)
            }
            other => Self::remote_call_failed(CapabilityKind::Mail, other.to_string()),
        }
    }
}
