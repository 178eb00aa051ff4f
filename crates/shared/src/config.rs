//! Application configuration management.

use std::path::PathBuf;

use serde::Deserialize;

use crate::types::CapabilityKind;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Local (default-path) storage configuration.
    #[serde(default)]
    pub local: LocalConfig,
    /// Integration startup policy.
    #[serde(default)]
    pub integrations: IntegrationsConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

/// Host-side local storage used whenever a capability is absent.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalConfig {
    /// Root directory of locally stored record files.
    #[serde(default = "default_storage_root")]
    pub storage_root: PathBuf,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            storage_root: default_storage_root(),
        }
    }
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("./pb_data/storage")
}

/// Integration startup policy.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntegrationsConfig {
    /// Capabilities that must come up at startup; others may degrade.
    #[serde(default)]
    pub required: Vec<CapabilityKind>,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("SKYHOOK")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("integrations.required")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
