//! Integration error taxonomy.

use thiserror::Error;

use crate::types::CapabilityKind;

/// Result type alias using `IntegrationError`.
pub type IntegrationResult<T> = Result<T, IntegrationError>;

/// Errors shared by the resolver, the adapters, and the orchestrator.
///
/// "Not found" is deliberately absent: existence checks and deletes report it
/// as a regular outcome, never as an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrationError {
    /// Capability enabled but missing mandatory settings.
    #[error("{capability} configuration is invalid: {reason}")]
    ConfigInvalid {
        /// Affected capability.
        capability: CapabilityKind,
        /// What is missing or inconsistent.
        reason: String,
    },

    /// Remote client or credential setup failed.
    #[error("{capability} adapter could not be constructed: {reason}")]
    ConstructionFailed {
        /// Affected capability.
        capability: CapabilityKind,
        /// Underlying cause.
        reason: String,
    },

    /// Network, timeout, permission, or vendor-side failure during an operation.
    #[error("{capability} remote call failed: {reason}")]
    RemoteCallFailed {
        /// Affected capability.
        capability: CapabilityKind,
        /// Underlying cause.
        reason: String,
    },

    /// The capability is disabled or failed to initialize.
    #[error("{0} is not enabled")]
    CapabilityUnavailable(CapabilityKind),

    /// A storage key component was rejected.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

impl IntegrationError {
    /// Create a configuration error.
    #[must_use]
    pub fn config_invalid(capability: CapabilityKind, reason: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            capability,
            reason: reason.into(),
        }
    }

    /// Create a construction error.
    #[must_use]
    pub fn construction_failed(capability: CapabilityKind, reason: impl Into<String>) -> Self {
        Self::ConstructionFailed {
            capability,
            reason: reason.into(),
        }
    }

    /// Create a remote call error.
    #[must_use]
    pub fn remote_call_failed(capability: CapabilityKind, reason: impl Into<String>) -> Self {
        Self::RemoteCallFailed {
            capability,
            reason: reason.into(),
        }
    }

    /// Returns the capability this error belongs to, if any.
    #[must_use]
    pub const fn capability(&self) -> Option<CapabilityKind> {
        match self {
            Self::ConfigInvalid { capability, .. }
            | Self::ConstructionFailed { capability, .. }
            | Self::RemoteCallFailed { capability, .. } => Some(*capability),
            Self::CapabilityUnavailable(capability) => Some(*capability),
            Self::InvalidKey(_) => None,
        }
    }

    /// Returns a stable machine-readable code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigInvalid { .. } => "CONFIG_INVALID",
            Self::ConstructionFailed { .. } => "CONSTRUCTION_FAILED",
            Self::RemoteCallFailed { .. } => "REMOTE_CALL_FAILED",
            Self::CapabilityUnavailable(_) => "CAPABILITY_UNAVAILABLE",
            Self::InvalidKey(_) => "INVALID_KEY",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            IntegrationError::config_invalid(CapabilityKind::Storage, "x").error_code(),
            "CONFIG_INVALID"
        );
        assert_eq!(
            IntegrationError::construction_failed(CapabilityKind::Mail, "x").error_code(),
            "CONSTRUCTION_FAILED"
        );
        assert_eq!(
            IntegrationError::remote_call_failed(CapabilityKind::Identity, "x").error_code(),
            "REMOTE_CALL_FAILED"
        );
        assert_eq!(
            IntegrationError::CapabilityUnavailable(CapabilityKind::Storage).error_code(),
            "CAPABILITY_UNAVAILABLE"
        );
        assert_eq!(
            IntegrationError::InvalidKey(String::new()).error_code(),
            "INVALID_KEY"
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            IntegrationError::config_invalid(CapabilityKind::Storage, "bucket is required")
                .to_string(),
            "storage configuration is invalid: bucket is required"
        );
        assert_eq!(
            IntegrationError::CapabilityUnavailable(CapabilityKind::Storage).to_string(),
            "storage is not enabled"
        );
        assert_eq!(
            IntegrationError::remote_call_failed(CapabilityKind::Mail, "timed out").to_string(),
            "mail remote call failed: timed out"
        );
    }

    #[test]
    fn test_capability_accessor() {
        assert_eq!(
            IntegrationError::construction_failed(CapabilityKind::Identity, "x").capability(),
            Some(CapabilityKind::Identity)
        );
        assert_eq!(IntegrationError::InvalidKey("x".into()).capability(), None);
    }
}
