//! Storage error types.

use std::time::Duration;

use skyhook_shared::{CapabilityKind, IntegrationError};
use thiserror::Error;

/// Storage operation errors.
///
/// A missing object is only an error for [`get`](super::ObjectStorage::get);
/// `exists` and `delete` report it as a regular outcome.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Object not found in storage.
    #[error("object not found: {key}")]
    NotFound {
        /// Storage key that was not found.
        key: String,
    },

    /// The remote call did not finish within its deadline.
    #[error("{operation} timed out after {after:?}: {key}")]
    Timeout {
        /// Operation name.
        operation: &'static str,
        /// Storage key involved.
        key: String,
        /// Deadline that elapsed.
        after: Duration,
    },

    /// Storage provider configuration error.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// OpenDAL operation error.
    #[error("storage operation failed: {0}")]
    Operation(String),

    /// Reading the local source stream failed.
    #[error("failed to read upload source: {0}")]
    Source(#[from] std::io::Error),
}

impl StorageError {
    /// Create a not found error.
    #[must_use]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an operation error.
    #[must_use]
    pub fn operation(msg: impl Into<String>) -> Self {
        Self::Operation(msg.into())
    }
}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::NotFound => Self::NotFound {
                key: err.to_string(),
            },
            opendal::ErrorKind::ConfigInvalid => Self::Configuration(err.to_string()),
            _ => Self::Operation(err.to_string()),
        }
    }
}

impl From<StorageError> for IntegrationError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Configuration(reason) => {
                Self::construction_failed(CapabilityKind::Storage, reason)
            }
            other => Self::remote_call_failed(CapabilityKind::Storage, other.to_string()),
        }
    }
}
