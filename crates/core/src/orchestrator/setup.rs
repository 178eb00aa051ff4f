//! Composition root for the capability adapters.

use std::future::Future;
use std::sync::Arc;

use skyhook_shared::{CapabilityKind, IntegrationConfig, IntegrationError};
use tokio::io::AsyncRead;
use tracing::{debug, info, warn};

use super::bindings::{
    AuthenticateUsers, DeliverMail, MirrorRecordFiles, PurgeRecordFiles, ServeFromStorage,
};
use super::capability::{CapabilityState, CapabilityStatus};
use super::factory::AdapterFactory;
use crate::hooks::HookRegistry;
use crate::host::{LocalFiles, UserStore};
use crate::identity::IdentityBridge;
use crate::mail::MailTransport;
use crate::storage::ObjectStorage;

/// Host collaborators the bound handlers need.
#[derive(Clone)]
pub struct HostContext {
    /// Local file storage.
    pub files: Arc<dyn LocalFiles>,
    /// Local user records.
    pub users: Arc<dyn UserStore>,
}

/// Setup policy.
#[derive(Debug, Clone, Default)]
pub struct SetupOptions {
    /// Capabilities that must come up; anything else may degrade.
    pub required: Vec<CapabilityKind>,
}

/// The live set of capabilities.
///
/// Each capability's state is decided once in [`setup`](Self::setup) and
/// never changes afterwards.
#[derive(Debug)]
pub struct Integrations {
    config: IntegrationConfig,
    storage: CapabilityState<ObjectStorage>,
    mail: CapabilityState<MailTransport>,
    identity: CapabilityState<IdentityBridge>,
}

impl Integrations {
    /// Brings up every enabled capability and binds its hooks.
    ///
    /// Capabilities are independent: an invalid or failing one is left
    /// inactive, logged, and never affects the others. Hooks are bound only
    /// for active capabilities.
    ///
    /// # Errors
    ///
    /// Returns an error only when a capability listed in
    /// `options.required` is disabled, invalid, or fails to construct.
    pub async fn setup(
        config: IntegrationConfig,
        factory: &dyn AdapterFactory,
        host: HostContext,
        registry: &mut HookRegistry,
        options: SetupOptions,
    ) -> Result<Self, IntegrationError> {
        config.require(&options.required)?;

        let storage = activate(CapabilityKind::Storage, &config, || {
            factory.storage(&config.storage)
        })
        .await;
        let mail = activate(CapabilityKind::Mail, &config, || factory.mail(&config.mail)).await;
        let identity = activate(CapabilityKind::Identity, &config, || {
            factory.identity(&config.identity)
        })
        .await;

        let integrations = Self {
            config,
            storage,
            mail,
            identity,
        };

        for &kind in &options.required {
            if let Some(e) = integrations.init_error(kind) {
                return Err(e.clone());
            }
        }

        integrations.bind(&host, registry);
        Ok(integrations)
    }

    fn bind(&self, host: &HostContext, registry: &mut HookRegistry) {
        if let Some(storage) = self.storage.active() {
            registry.record_created.bind(MirrorRecordFiles::new(
                Arc::clone(storage),
                Arc::clone(&host.files),
            ));
            registry
                .record_deleted
                .bind(PurgeRecordFiles::new(Arc::clone(storage)));
            registry
                .file_download
                .bind(ServeFromStorage::new(Arc::clone(storage)));
            info!(
                bucket = %self.config.storage.bucket,
                region = %self.config.storage.region,
                "Object storage enabled"
            );
        }

        if let Some(transport) = self.mail.active() {
            registry.mail_send.bind(DeliverMail::new(Arc::clone(transport)));
            info!(
                region = %self.config.mail.region,
                from = %self.config.mail.from_address,
                "Transactional mail enabled"
            );
        }

        if let Some(bridge) = self.identity.active() {
            registry.auth.bind(AuthenticateUsers::new(
                Arc::clone(bridge),
                Arc::clone(&host.users),
            ));
            info!(
                user_pool = %self.config.identity.user_pool_id,
                region = %self.config.identity.region,
                "Identity provider enabled"
            );
        }
    }

    fn init_error(&self, kind: CapabilityKind) -> Option<&IntegrationError> {
        match kind {
            CapabilityKind::Storage => self.storage.init_error(),
            CapabilityKind::Mail => self.mail.init_error(),
            CapabilityKind::Identity => self.identity.init_error(),
        }
    }

    /// Resolved settings.
    #[must_use]
    pub fn config(&self) -> &IntegrationConfig {
        &self.config
    }

    /// Storage state.
    #[must_use]
    pub fn storage(&self) -> &CapabilityState<ObjectStorage> {
        &self.storage
    }

    /// Mail state.
    #[must_use]
    pub fn mail(&self) -> &CapabilityState<MailTransport> {
        &self.mail
    }

    /// Identity state.
    #[must_use]
    pub fn identity(&self) -> &CapabilityState<IdentityBridge> {
        &self.identity
    }

    /// Whether object storage is active.
    #[must_use]
    pub fn is_storage_enabled(&self) -> bool {
        self.storage.is_active()
    }

    /// Whether transactional mail is active.
    #[must_use]
    pub fn is_mail_enabled(&self) -> bool {
        self.mail.is_active()
    }

    /// Whether the identity provider is active.
    #[must_use]
    pub fn is_identity_enabled(&self) -> bool {
        self.identity.is_active()
    }

    /// Status of every capability.
    #[must_use]
    pub fn status(&self) -> Vec<CapabilityStatus> {
        vec![
            self.storage.status(CapabilityKind::Storage),
            self.mail.status(CapabilityKind::Mail),
            self.identity.status(CapabilityKind::Identity),
        ]
    }

    /// Public URL for a stored file, or `local_path` unchanged when storage
    /// is not active.
    #[must_use]
    pub fn public_url(&self, local_path: &str) -> String {
        match self.storage.active() {
            Some(storage) => storage.public_url(local_path),
            None => local_path.to_string(),
        }
    }

    /// Uploads `reader` to storage at `key`.
    ///
    /// # Errors
    ///
    /// Returns `CapabilityUnavailable` when storage is not active, or the
    /// storage failure.
    pub async fn upload<R>(&self, reader: R, key: &str) -> Result<u64, IntegrationError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let storage = self.active_storage()?;
        Ok(storage.put_stream(reader, key).await?)
    }

    /// Deletes `key` from storage.
    ///
    /// # Errors
    ///
    /// Returns `CapabilityUnavailable` when storage is not active, or the
    /// storage failure.
    pub async fn delete(&self, key: &str) -> Result<(), IntegrationError> {
        let storage = self.active_storage()?;
        Ok(storage.delete(key).await?)
    }

    fn active_storage(&self) -> Result<&Arc<ObjectStorage>, IntegrationError> {
        self.storage
            .active()
            .ok_or(IntegrationError::CapabilityUnavailable(CapabilityKind::Storage))
    }
}

async fn activate<T, F, Fut>(
    kind: CapabilityKind,
    config: &IntegrationConfig,
    build: F,
) -> CapabilityState<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, IntegrationError>>,
{
    if !config.is_enabled(kind) {
        debug!(capability = %kind, "Capability disabled");
        return CapabilityState::Disabled;
    }

    if let Err(e) = config.validate(kind) {
        warn!(capability = %kind, error = %e, "Capability configuration invalid, using local default");
        return CapabilityState::FailedInit(e);
    }

    match build().await {
        Ok(adapter) => CapabilityState::Active(Arc::new(adapter)),
        Err(e) => {
            warn!(capability = %kind, error = %e, "Capability failed to initialize, using local default");
            CapabilityState::FailedInit(e)
        }
    }
}
