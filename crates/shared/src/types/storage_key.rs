//! Deterministic object addressing for record files.

use std::fmt;

use serde::Serialize;

use crate::error::IntegrationError;

/// Remote object identifier derived from the owning record and file name.
///
/// Format: `{collection}/{record_id}/{file_name}`. No component may be empty
/// or contain `/`, so distinct triples never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StorageKey(String);

impl StorageKey {
    /// Derives the key for a file owned by a record.
    ///
    /// # Errors
    ///
    /// Returns `IntegrationError::InvalidKey` if a component is empty or contains `/`.
    pub fn for_file(
        collection: &str,
        record_id: &str,
        file_name: &str,
    ) -> Result<Self, IntegrationError> {
        for (label, value) in [
            ("collection", collection),
            ("record id", record_id),
            ("file name", file_name),
        ] {
            if value.is_empty() {
                return Err(IntegrationError::InvalidKey(format!("{label} is empty")));
            }
            if value.contains('/') {
                return Err(IntegrationError::InvalidKey(format!(
                    "{label} '{value}' contains '/'"
                )));
            }
        }

        Ok(Self(format!("{collection}/{record_id}/{file_name}")))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the file name component.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
