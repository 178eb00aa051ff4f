//! Adapter construction seam.

use async_trait::async_trait;
use skyhook_shared::{IdentitySettings, IntegrationError, MailSettings, StorageSettings};

use crate::identity::IdentityBridge;
use crate::mail::MailTransport;
use crate::storage::ObjectStorage;

/// Builds adapter handles from validated settings.
#[async_trait]
pub trait AdapterFactory: Send + Sync {
    /// Builds the storage adapter.
    async fn storage(&self, settings: &StorageSettings) -> Result<ObjectStorage, IntegrationError>;

    /// Builds the mail adapter.
    async fn mail(&self, settings: &MailSettings) -> Result<MailTransport, IntegrationError>;

    /// Builds the identity adapter.
    async fn identity(
        &self,
        settings: &IdentitySettings,
    ) -> Result<IdentityBridge, IntegrationError>;
}

/// Production factory: S3 via OpenDAL, SES v2, and Cognito.
#[derive(Debug, Clone, Copy, Default)]
pub struct AwsAdapterFactory;

#[async_trait]
impl AdapterFactory for AwsAdapterFactory {
    async fn storage(&self, settings: &StorageSettings) -> Result<ObjectStorage, IntegrationError> {
        Ok(ObjectStorage::from_settings(settings)?)
    }

    async fn mail(&self, settings: &MailSettings) -> Result<MailTransport, IntegrationError> {
        Ok(MailTransport::from_settings(settings).await?)
    }

    async fn identity(
        &self,
        settings: &IdentitySettings,
    ) -> Result<IdentityBridge, IntegrationError> {
        Ok(IdentityBridge::from_settings(settings).await?)
    }
}
