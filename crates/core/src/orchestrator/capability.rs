//! Per-capability lifecycle state.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use skyhook_shared::{CapabilityKind, IntegrationError};

/// State of one capability, fixed for the life of the process.
///
/// `Disabled` and `FailedInit` both mean "no usable handle"; they differ
/// only in what gets reported.
pub enum CapabilityState<T> {
    /// The capability flag is off.
    Disabled,
    /// The flag is on but configuration or construction failed.
    FailedInit(IntegrationError),
    /// The adapter is live.
    Active(Arc<T>),
}

impl<T> CapabilityState<T> {
    /// The live adapter, if any.
    #[must_use]
    pub const fn active(&self) -> Option<&Arc<T>> {
        match self {
            Self::Active(handle) => Some(handle),
            Self::Disabled | Self::FailedInit(_) => None,
        }
    }

    /// Whether the adapter is live.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    /// Why initialization failed, if it did.
    #[must_use]
    pub const fn init_error(&self) -> Option<&IntegrationError> {
        match self {
            Self::FailedInit(e) => Some(e),
            Self::Disabled | Self::Active(_) => None,
        }
    }

    /// Reportable snapshot.
    #[must_use]
    pub fn status(&self, capability: CapabilityKind) -> CapabilityStatus {
        let (state, error) = match self {
            Self::Disabled => (StateLabel::Disabled, None),
            Self::FailedInit(e) => (StateLabel::FailedInit, Some(e.to_string())),
            Self::Active(_) => (StateLabel::Active, None),
        };
        CapabilityStatus {
            capability,
            state,
            error,
        }
    }
}

impl<T> fmt::Debug for CapabilityState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => f.write_str("Disabled"),
            Self::FailedInit(e) => f.debug_tuple("FailedInit").field(e).finish(),
            Self::Active(_) => f.write_str("Active"),
        }
    }
}

/// Serializable state name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StateLabel {
    /// Flag off.
    Disabled,
    /// Flag on, adapter unavailable.
    FailedInit,
    /// Adapter live.
    Active,
}

/// Status of one capability as reported to operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityStatus {
    /// Capability.
    pub capability: CapabilityKind,
    /// State name.
    pub state: StateLabel,
    /// Why the capability failed to initialize.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
