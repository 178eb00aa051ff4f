//! Shared types used across all crates.

mod capability;
mod storage_key;

pub use capability::CapabilityKind;
pub use storage_key::StorageKey;
