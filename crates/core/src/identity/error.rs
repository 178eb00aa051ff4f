//! Identity error types.

use std::time::Duration;

use skyhook_shared::{CapabilityKind, IntegrationError};
use thiserror::Error;

use crate::host::HostError;

/// Identity bridge errors.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The remote call did not finish within its deadline.
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        /// Operation name.
        operation: &'static str,
        /// Deadline that elapsed.
        after: Duration,
    },

    /// The provider rejected the call or could not be reached.
    #[error("{operation} failed: {reason}")]
    Remote {
        /// Operation name.
        operation: &'static str,
        /// Provider error message.
        reason: String,
    },

    /// The provider answered with a challenge instead of tokens.
    #[error("authentication requires challenge: {0}")]
    ChallengeRequired(String),

    /// A successful exchange carried no access token.
    #[error("authentication returned no access token")]
    MissingToken,

    /// The remote user was created but its password was not made permanent.
    ///
    /// The remote user is left in place.
    #[error("user {username} was created but the password was not set: {reason}")]
    PasswordNotPersisted {
        /// Remote username.
        username: String,
        /// Cause of the second-step failure.
        reason: String,
    },

    /// Provider configuration error.
    #[error("identity configuration error: {0}")]
    Configuration(String),

    /// The host's user store failed.
    #[error(transparent)]
    Host(#[from] HostError),
}

impl IdentityError {
    /// Create a remote call error.
    #[must_use]
    pub fn remote(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Remote {
            operation,
            reason: reason.into(),
        }
    }

    /// The failure happened on the host side, after the provider answered.
    #[must_use]
    pub const fn is_host_failure(&self) -> bool {
        matches!(self, Self::Host(_))
    }
}

impl From<IdentityError> for IntegrationError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Configuration(reason) => {
                Self::construction_failed(CapabilityKind::Identity, reason)
            }
            other => Self::remote_call_failed(CapabilityKind::Identity, other.to_string()),
        }
    }
}
