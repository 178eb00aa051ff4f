//! Hook handlers bound for active capabilities.
//!
//! Every handler here converts its adapter's failures into a logged
//! warning plus `PassThrough`, so the host's default path still runs.

use std::sync::Arc;

use async_trait::async_trait;
use skyhook_shared::StorageKey;
use tracing::{debug, info, warn};

use crate::hooks::{
    AuthEvent, FileDownloadEvent, HookError, HookHandler, HookOutcome, MailEvent, RecordEvent,
    ServedFile,
};
use crate::host::{LocalFiles, Record, UserStore};
use crate::identity::IdentityBridge;
use crate::mail::MailTransport;
use crate::storage::{ObjectStorage, content_type_for};

/// Auth collection the identity bridge serves.
pub const USERS_COLLECTION: &str = "users";

fn file_keys(record: &Record) -> impl Iterator<Item = (&str, Option<StorageKey>)> {
    record.file_names().map(move |name| {
        let key = match StorageKey::for_file(&record.collection, &record.id, name) {
            Ok(key) => Some(key),
            Err(e) => {
                warn!(file = %name, error = %e, "Skipping file with unusable storage key");
                None
            }
        };
        (name, key)
    })
}

/// record-created: copy every local file of the record to storage.
pub struct MirrorRecordFiles {
    storage: Arc<ObjectStorage>,
    files: Arc<dyn LocalFiles>,
}

impl MirrorRecordFiles {
    /// Creates the handler.
    #[must_use]
    pub fn new(storage: Arc<ObjectStorage>, files: Arc<dyn LocalFiles>) -> Self {
        Self { storage, files }
    }
}

#[async_trait]
impl HookHandler<RecordEvent> for MirrorRecordFiles {
    fn name(&self) -> &'static str {
        "mirror_record_files"
    }

    async fn handle(&self, event: &mut RecordEvent) -> HookOutcome {
        let record = &event.record;
        for (name, key) in file_keys(record) {
            let Some(key) = key else { continue };

            let local_path = record.local_path(name);
            let reader = match self.files.open(&local_path).await {
                Ok(reader) => reader,
                Err(e) => {
                    warn!(path = %local_path, error = %e, "Failed to read local file for upload");
                    continue;
                }
            };

            match self.storage.put_stream(reader, key.as_str()).await {
                Ok(size) => info!(file = %name, key = %key, size, "File mirrored to storage"),
                Err(e) => warn!(file = %name, key = %key, error = %e, "Failed to mirror file"),
            }
        }
        HookOutcome::PassThrough
    }
}

/// record-deleted: remove every file of the record from storage.
pub struct PurgeRecordFiles {
    storage: Arc<ObjectStorage>,
}

impl PurgeRecordFiles {
    /// Creates the handler.
    #[must_use]
    pub fn new(storage: Arc<ObjectStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl HookHandler<RecordEvent> for PurgeRecordFiles {
    fn name(&self) -> &'static str {
        "purge_record_files"
    }

    async fn handle(&self, event: &mut RecordEvent) -> HookOutcome {
        for (_, key) in file_keys(&event.record) {
            let Some(key) = key else { continue };

            match self.storage.delete(key.as_str()).await {
                Ok(()) => info!(key = %key, "File removed from storage"),
                Err(e) => warn!(key = %key, error = %e, "Failed to remove file from storage"),
            }
        }
        HookOutcome::PassThrough
    }
}

/// file-download-requested: serve the file from storage when it is there.
pub struct ServeFromStorage {
    storage: Arc<ObjectStorage>,
}

impl ServeFromStorage {
    /// Creates the handler.
    #[must_use]
    pub fn new(storage: Arc<ObjectStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl HookHandler<FileDownloadEvent> for ServeFromStorage {
    fn name(&self) -> &'static str {
        "serve_from_storage"
    }

    async fn handle(&self, event: &mut FileDownloadEvent) -> HookOutcome {
        let key = match StorageKey::for_file(
            &event.record.collection,
            &event.record.id,
            &event.served_name,
        ) {
            Ok(key) => key,
            Err(e) => {
                debug!(error = %e, "Download not addressable in storage");
                return HookOutcome::PassThrough;
            }
        };

        match self.storage.exists(key.as_str()).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(key = %key, "File not in storage, serving locally");
                return HookOutcome::PassThrough;
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Storage lookup failed, serving locally");
                return HookOutcome::PassThrough;
            }
        }

        match self.storage.get(key.as_str()).await {
            Ok(body) => {
                event.served = Some(ServedFile {
                    body,
                    content_type: content_type_for(key.as_str()),
                });
                HookOutcome::Handled
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to serve file from storage");
                HookOutcome::PassThrough
            }
        }
    }
}

/// mail-send-requested: deliver through the mail adapter.
pub struct DeliverMail {
    transport: Arc<MailTransport>,
}

impl DeliverMail {
    /// Creates the handler.
    #[must_use]
    pub fn new(transport: Arc<MailTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl HookHandler<MailEvent> for DeliverMail {
    fn name(&self) -> &'static str {
        "deliver_mail"
    }

    async fn handle(&self, event: &mut MailEvent) -> HookOutcome {
        match self.transport.send(&event.message).await {
            Ok(()) => HookOutcome::Handled,
            Err(e) => {
                warn!(error = %e, "Mail delivery failed, falling back to local mailer");
                HookOutcome::PassThrough
            }
        }
    }
}

/// auth-requested: sign users in through the identity provider.
pub struct AuthenticateUsers {
    bridge: Arc<IdentityBridge>,
    users: Arc<dyn UserStore>,
}

impl AuthenticateUsers {
    /// Creates the handler.
    #[must_use]
    pub fn new(bridge: Arc<IdentityBridge>, users: Arc<dyn UserStore>) -> Self {
        Self { bridge, users }
    }
}

#[async_trait]
impl HookHandler<AuthEvent> for AuthenticateUsers {
    fn name(&self) -> &'static str {
        "authenticate_users"
    }

    async fn handle(&self, event: &mut AuthEvent) -> HookOutcome {
        if event.collection != USERS_COLLECTION {
            return HookOutcome::PassThrough;
        }

        match self
            .bridge
            .sign_in(self.users.as_ref(), &event.identity, &event.password)
            .await
        {
            Ok(record) => {
                info!(identity = %event.identity, "User authenticated via identity provider");
                event.record = Some(record);
                HookOutcome::Handled
            }
            Err(e) if e.is_host_failure() => {
                HookOutcome::Fatal(HookError::new(self.name(), e.to_string()))
            }
            Err(e) => {
                warn!(
                    identity = %event.identity,
                    error = %e,
                    "Remote authentication failed, falling back to local auth"
                );
                HookOutcome::PassThrough
            }
        }
    }
}
