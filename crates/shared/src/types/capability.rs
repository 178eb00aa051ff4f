//! Capability identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One optional external integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    /// Remote object storage for record files.
    Storage,
    /// Outbound transactional email.
    Mail,
    /// External identity verification.
    Identity,
}

impl CapabilityKind {
    /// All capabilities in a stable order.
    pub const ALL: [Self; 3] = [Self::Storage, Self::Mail, Self::Identity];

    /// Returns the short name used in logs and status payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Storage => "storage",
            Self::Mail => "mail",
            Self::Identity => "identity",
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
