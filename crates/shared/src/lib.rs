//! Configuration, capability settings, and error taxonomy for Skyhook.
//!
//! This crate provides the pieces every other crate agrees on:
//! - Server configuration (`AppConfig`)
//! - Capability settings resolution (`ConfigResolver`, `IntegrationConfig`)
//! - The integration error taxonomy (`IntegrationError`)
//! - Deterministic object addressing (`StorageKey`)

pub mod config;
pub mod error;
pub mod settings;
pub mod types;

pub use config::{AppConfig, IntegrationsConfig};
pub use error::{IntegrationError, IntegrationResult};
pub use settings::{
    ConfigResolver, Credentials, IdentitySettings, IntegrationConfig, MailSettings,
    SettingsSource, StorageSettings,
};
pub use types::{CapabilityKind, StorageKey};
