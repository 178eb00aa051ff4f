//! Capability settings resolution.
//!
//! Reads a flat set of named settings into one immutable snapshot per
//! capability. Resolution is a pure transform over a [`SettingsSource`]:
//! unset values fall back to defaults, per-capability credentials fall back
//! to the shared pair, and validation marks a capability unusable without
//! failing startup.

use std::collections::HashMap;
use std::fmt;

use config::Source;

use crate::error::IntegrationError;
use crate::types::CapabilityKind;

/// Region used when a capability does not name one.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Flat key/value settings, keyed by upper-case names.
#[derive(Debug, Clone, Default)]
pub struct SettingsSource {
    values: HashMap<String, String>,
}

impl SettingsSource {
    /// Builds a source from literal pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into().to_ascii_uppercase(), v.into()))
                .collect(),
        }
    }

    /// Builds a source from an optional `config/integrations` file and the
    /// process environment (environment wins).
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let collected = config::Config::builder()
            .add_source(config::File::with_name("config/integrations").required(false))
            .add_source(config::Environment::default())
            .build()?
            .collect()?;

        Ok(Self::from_pairs(
            collected
                .into_iter()
                .filter_map(|(key, value)| value.into_string().ok().map(|v| (key, v))),
        ))
    }

    /// Returns the value for `key`, treating an empty string as unset.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    fn string(&self, key: &str) -> String {
        self.get(key).unwrap_or_default().to_string()
    }

    fn string_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }

    fn optional(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }

    fn flag(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(parse_flag).unwrap_or(default)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "y" | "yes" | "on" => Some(true),
        "0" | "f" | "false" | "n" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Access/secret credential pair.
///
/// An incomplete pair defers to the vendor's default credential chain.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Access key ID.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
}

impl Credentials {
    /// Creates a credential pair.
    #[must_use]
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }

    /// Both halves are present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.access_key_id.is_empty() && !self.secret_access_key.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &redacted(&self.secret_access_key))
            .finish()
    }
}

fn redacted(value: &str) -> &'static str {
    if value.is_empty() { "" } else { "***" }
}

/// Object storage settings snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSettings {
    /// Capability flag.
    pub enabled: bool,
    /// Bucket name.
    pub bucket: String,
    /// Region.
    pub region: String,
    /// Credential pair.
    pub credentials: Credentials,
    /// Custom endpoint (S3-compatible services); implies path-style addressing.
    pub endpoint: Option<String>,
    /// Explicit public URL base.
    pub public_url: Option<String>,
    /// CDN domain fronting the bucket.
    pub cdn_domain: Option<String>,
    /// CDN distribution identifier.
    pub cdn_distribution_id: Option<String>,
}

impl StorageSettings {
    /// Checks mandatory identifiers.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` when the bucket or region is empty.
    pub fn validate(&self) -> Result<(), IntegrationError> {
        if self.bucket.is_empty() {
            return Err(IntegrationError::config_invalid(
                CapabilityKind::Storage,
                "bucket is required",
            ));
        }
        if self.region.is_empty() {
            return Err(IntegrationError::config_invalid(
                CapabilityKind::Storage,
                "region is required",
            ));
        }
        Ok(())
    }

    /// Base URL that public object URLs are composed from.
    ///
    /// Explicit override first, then the CDN domain, then the bucket's
    /// virtual-hosted address.
    #[must_use]
    pub fn public_base_url(&self) -> String {
        if let Some(url) = &self.public_url {
            return url.trim_end_matches('/').to_string();
        }
        if let Some(domain) = &self.cdn_domain {
            let domain = domain.trim_end_matches('/');
            if domain.starts_with("http://") || domain.starts_with("https://") {
                return domain.to_string();
            }
            return format!("https://{domain}");
        }
        format!("https://{}.s3.{}.amazonaws.com", self.bucket, self.region)
    }
}

/// Transactional mail settings snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSettings {
    /// Capability flag.
    pub enabled: bool,
    /// Region.
    pub region: String,
    /// Credential pair.
    pub credentials: Credentials,
    /// Sender used when a message carries no sender of its own.
    pub from_address: String,
}

impl MailSettings {
    /// Checks mandatory identifiers.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` when the region or from-address is empty.
    pub fn validate(&self) -> Result<(), IntegrationError> {
        if self.region.is_empty() {
            return Err(IntegrationError::config_invalid(
                CapabilityKind::Mail,
                "region is required",
            ));
        }
        if self.from_address.is_empty() {
            return Err(IntegrationError::config_invalid(
                CapabilityKind::Mail,
                "from address is required",
            ));
        }
        Ok(())
    }
}

/// Identity provider settings snapshot.
#[derive(Clone, PartialEq, Eq)]
pub struct IdentitySettings {
    /// Capability flag.
    pub enabled: bool,
    /// User pool identifier.
    pub user_pool_id: String,
    /// App client identifier.
    pub client_id: String,
    /// Optional app client secret.
    pub client_secret: Option<String>,
    /// Region.
    pub region: String,
    /// Credential pair.
    pub credentials: Credentials,
}

impl IdentitySettings {
    /// Checks mandatory identifiers.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` when the pool, client, or region is empty.
    pub fn validate(&self) -> Result<(), IntegrationError> {
        if self.user_pool_id.is_empty() || self.client_id.is_empty() {
            return Err(IntegrationError::config_invalid(
                CapabilityKind::Identity,
                "user pool id and client id are required",
            ));
        }
        if self.region.is_empty() {
            return Err(IntegrationError::config_invalid(
                CapabilityKind::Identity,
                "region is required",
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for IdentitySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentitySettings")
            .field("enabled", &self.enabled)
            .field("user_pool_id", &self.user_pool_id)
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_deref().map(redacted),
            )
            .field("region", &self.region)
            .field("credentials", &self.credentials)
            .finish()
    }
}

/// Settings for every capability, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrationConfig {
    /// Object storage.
    pub storage: StorageSettings,
    /// Transactional mail.
    pub mail: MailSettings,
    /// Identity provider.
    pub identity: IdentitySettings,
}

impl IntegrationConfig {
    /// Whether the flag for `kind` is set.
    #[must_use]
    pub fn is_enabled(&self, kind: CapabilityKind) -> bool {
        match kind {
            CapabilityKind::Storage => self.storage.enabled,
            CapabilityKind::Mail => self.mail.enabled,
            CapabilityKind::Identity => self.identity.enabled,
        }
    }

    /// Validates the settings of `kind` regardless of its flag.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` for missing mandatory settings.
    pub fn validate(&self, kind: CapabilityKind) -> Result<(), IntegrationError> {
        match kind {
            CapabilityKind::Storage => self.storage.validate(),
            CapabilityKind::Mail => self.mail.validate(),
            CapabilityKind::Identity => self.identity.validate(),
        }
    }

    /// Insists that every capability in `required` is enabled and valid.
    ///
    /// # Errors
    ///
    /// Returns the first violation as `ConfigInvalid`.
    pub fn require(&self, required: &[CapabilityKind]) -> Result<(), IntegrationError> {
        for &kind in required {
            if !self.is_enabled(kind) {
                return Err(IntegrationError::config_invalid(
                    kind,
                    "capability is required but disabled",
                ));
            }
            self.validate(kind)?;
        }
        Ok(())
    }
}

/// Turns a [`SettingsSource`] into an [`IntegrationConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigResolver;

impl ConfigResolver {
    /// Shared access key.
    pub const SHARED_ACCESS_KEY: &'static str = "AWS_ACCESS_KEY_ID";
    /// Shared secret key.
    pub const SHARED_SECRET_KEY: &'static str = "AWS_SECRET_ACCESS_KEY";

    /// Resolves every capability's settings.
    #[must_use]
    pub fn resolve(source: &SettingsSource) -> IntegrationConfig {
        IntegrationConfig {
            storage: Self::storage(source),
            mail: Self::mail(source),
            identity: Self::identity(source),
        }
    }

    fn credentials(source: &SettingsSource, access_key: &str, secret_key: &str) -> Credentials {
        let pick = |own: &str, shared: &str| {
            source
                .get(own)
                .or_else(|| source.get(shared))
                .unwrap_or_default()
                .to_string()
        };

        Credentials {
            access_key_id: pick(access_key, Self::SHARED_ACCESS_KEY),
            secret_access_key: pick(secret_key, Self::SHARED_SECRET_KEY),
        }
    }

    fn storage(source: &SettingsSource) -> StorageSettings {
        let cdn_enabled = source.flag("AWS_CLOUDFRONT_ENABLED", false);

        StorageSettings {
            enabled: source.flag("AWS_S3_ENABLED", false),
            bucket: source.string("AWS_S3_BUCKET"),
            region: source.string_or("AWS_S3_REGION", DEFAULT_REGION),
            credentials: Self::credentials(
                source,
                "AWS_S3_ACCESS_KEY_ID",
                "AWS_S3_SECRET_ACCESS_KEY",
            ),
            endpoint: source.optional("AWS_S3_ENDPOINT"),
            public_url: source.optional("AWS_S3_PUBLIC_URL"),
            cdn_domain: source
                .optional("AWS_CLOUDFRONT_DOMAIN")
                .filter(|_| cdn_enabled),
            cdn_distribution_id: source
                .optional("AWS_CLOUDFRONT_DISTRIBUTION_ID")
                .filter(|_| cdn_enabled),
        }
    }

    fn mail(source: &SettingsSource) -> MailSettings {
        MailSettings {
            enabled: source.flag("AWS_SES_ENABLED", false),
            region: source.string_or("AWS_SES_REGION", DEFAULT_REGION),
            credentials: Self::credentials(
                source,
                "AWS_SES_ACCESS_KEY_ID",
                "AWS_SES_SECRET_ACCESS_KEY",
            ),
            from_address: source.string("AWS_SES_FROM_ADDRESS"),
        }
    }

    fn identity(source: &SettingsSource) -> IdentitySettings {
        IdentitySettings {
            enabled: source.flag("AWS_COGNITO_ENABLED", false),
            user_pool_id: source.string("AWS_COGNITO_USER_POOL_ID"),
            client_id: source.string("AWS_COGNITO_CLIENT_ID"),
            client_secret: source.optional("AWS_COGNITO_CLIENT_SECRET"),
            region: source.string_or("AWS_COGNITO_REGION", DEFAULT_REGION),
            credentials: Self::credentials(
                source,
                "AWS_COGNITO_ACCESS_KEY_ID",
                "AWS_COGNITO_SECRET_ACCESS_KEY",
            ),
        }
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
