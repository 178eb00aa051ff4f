//! Orchestrator tests: capability independence and hook fallback policy.

use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use opendal::{Operator, services};
use skyhook_shared::{
    CapabilityKind, ConfigResolver, IdentitySettings, IntegrationConfig, IntegrationError,
    MailSettings, SettingsSource, StorageSettings,
};

use super::*;
use crate::hooks::{
    AuthEvent, FileDownloadEvent, HookKind, HookOutcome, HookRegistry, MailEvent, RecordEvent,
};
use crate::host::{HostError, InMemoryFiles, InMemoryUserStore, NewUser, Record, UserRecord, UserStore};
use crate::identity::{AuthResult, IdentityBridge, IdentityError, MockIdentityProvider};
use crate::mail::{Address, MailError, MailTransport, Message, MockMailClient};
use crate::storage::{ObjectStorage, StorageTimeouts};

const STORAGE_ON: [(&str, &str); 2] = [("AWS_S3_ENABLED", "true"), ("AWS_S3_BUCKET", "assets")];
const MAIL_ON: [(&str, &str); 2] = [
    ("AWS_SES_ENABLED", "true"),
    ("AWS_SES_FROM_ADDRESS", "noreply@example.com"),
];
const IDENTITY_ON: [(&str, &str); 3] = [
    ("AWS_COGNITO_ENABLED", "true"),
    ("AWS_COGNITO_USER_POOL_ID", "us-east-1_pool"),
    ("AWS_COGNITO_CLIENT_ID", "client123"),
];

fn config(pairs: &[(&str, &str)]) -> IntegrationConfig {
    ConfigResolver::resolve(&SettingsSource::from_pairs(pairs.iter().copied()))
}

#[derive(Default)]
struct TestFactory {
    mail_client: Mutex<Option<MockMailClient>>,
    identity_provider: Mutex<Option<MockIdentityProvider>>,
    fail_storage: bool,
    remote_storage: bool,
    built: Mutex<Vec<CapabilityKind>>,
}

impl TestFactory {
    fn with_mail(self, client: MockMailClient) -> Self {
        *self.mail_client.lock().unwrap() = Some(client);
        self
    }

    fn with_identity(self, provider: MockIdentityProvider) -> Self {
        *self.identity_provider.lock().unwrap() = Some(provider);
        self
    }

    fn built(&self) -> Vec<CapabilityKind> {
        self.built.lock().unwrap().clone()
    }
}

#[async_trait]
impl AdapterFactory for TestFactory {
    async fn storage(&self, settings: &StorageSettings) -> Result<ObjectStorage, IntegrationError> {
        self.built.lock().unwrap().push(CapabilityKind::Storage);
        if self.fail_storage {
            return Err(IntegrationError::construction_failed(
                CapabilityKind::Storage,
                "credentials rejected",
            ));
        }
        if self.remote_storage {
            let storage = ObjectStorage::from_settings(settings)?;
            return Ok(storage.with_timeouts(StorageTimeouts {
                read: Duration::from_millis(500),
                write: Duration::from_millis(500),
                stream: Duration::from_millis(500),
            }));
        }
        let operator = Operator::new(services::Memory::default()).unwrap().finish();
        Ok(ObjectStorage::with_operator(
            operator,
            settings.bucket.clone(),
            settings.public_base_url(),
        ))
    }

    async fn mail(&self, settings: &MailSettings) -> Result<MailTransport, IntegrationError> {
        self.built.lock().unwrap().push(CapabilityKind::Mail);
        let client = self.mail_client.lock().unwrap().take().unwrap_or_default();
        Ok(MailTransport::with_client(
            Arc::new(client),
            settings.from_address.clone(),
        ))
    }

    async fn identity(
        &self,
        _settings: &IdentitySettings,
    ) -> Result<IdentityBridge, IntegrationError> {
        self.built.lock().unwrap().push(CapabilityKind::Identity);
        let provider = self
            .identity_provider
            .lock()
            .unwrap()
            .take()
            .unwrap_or_default();
        Ok(IdentityBridge::new(Arc::new(provider)))
    }
}

struct Harness {
    integrations: Integrations,
    registry: HookRegistry,
    files: Arc<InMemoryFiles>,
    users: Arc<InMemoryUserStore>,
}

async fn setup_with(config: IntegrationConfig, factory: &TestFactory) -> Harness {
    let files = Arc::new(InMemoryFiles::new());
    let users = Arc::new(InMemoryUserStore::new());
    let mut registry = HookRegistry::new();
    let host = HostContext {
        files: files.clone(),
        users: users.clone(),
    };

    let integrations = Integrations::setup(
        config,
        factory,
        host,
        &mut registry,
        SetupOptions::default(),
    )
    .await
    .expect("setup without required capabilities never fails");

    Harness {
        integrations,
        registry,
        files,
        users,
    }
}

/// Storage settings pointing at `endpoint` with static credentials.
fn remote_storage_config(endpoint: &str) -> IntegrationConfig {
    config(&[
        ("AWS_S3_ENABLED", "true"),
        ("AWS_S3_BUCKET", "assets"),
        ("AWS_S3_ENDPOINT", endpoint),
        ("AWS_ACCESS_KEY_ID", "AKIAEXAMPLE"),
        ("AWS_SECRET_ACCESS_KEY", "secret"),
    ])
}

/// Accepts connections and never answers.
async fn stalled_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{addr}")
}

fn tokens() -> AuthResult {
    AuthResult {
        access_token: "access".to_string(),
        refresh_token: Some("refresh".to_string()),
        id_token: Some("id".to_string()),
        expires_in: 3600,
    }
}

#[tokio::test]
async fn test_all_disabled_binds_nothing() {
    let factory = TestFactory::default();
    let harness = setup_with(config(&[]), &factory).await;

    assert!(factory.built().is_empty());
    assert!(harness.registry.handler_counts().values().all(|&n| n == 0));
    for status in harness.integrations.status() {
        assert_eq!(status.state, StateLabel::Disabled);
        assert_eq!(status.error, None);
    }
}

#[tokio::test]
async fn test_invalid_capability_is_not_constructed_and_others_unaffected() {
    let factory = TestFactory::default();
    let harness = setup_with(
        config(&[("AWS_S3_ENABLED", "true"), MAIL_ON[0], MAIL_ON[1]]),
        &factory,
    )
    .await;

    assert_eq!(factory.built(), vec![CapabilityKind::Mail]);
    assert!(matches!(
        harness.integrations.storage(),
        CapabilityState::FailedInit(IntegrationError::ConfigInvalid { .. })
    ));
    assert!(harness.integrations.is_mail_enabled());

    let counts = harness.registry.handler_counts();
    assert_eq!(counts[&HookKind::RecordCreated], 0);
    assert_eq!(counts[&HookKind::RecordDeleted], 0);
    assert_eq!(counts[&HookKind::FileDownloadRequested], 0);
    assert_eq!(counts[&HookKind::MailSendRequested], 1);
}

#[tokio::test]
async fn test_construction_failure_degrades_only_that_capability() {
    let factory = TestFactory {
        fail_storage: true,
        ..TestFactory::default()
    };
    let pairs: Vec<_> = STORAGE_ON.into_iter().chain(IDENTITY_ON).collect();
    let harness = setup_with(config(&pairs), &factory).await;

    assert!(!harness.integrations.is_storage_enabled());
    assert!(harness.integrations.is_identity_enabled());
    assert_eq!(harness.registry.file_download.len(), 0);
    assert_eq!(harness.registry.auth.len(), 1);

    let status = harness.integrations.storage().status(CapabilityKind::Storage);
    assert_eq!(status.state, StateLabel::FailedInit);
    assert!(status.error.unwrap().contains("credentials rejected"));
}

#[tokio::test]
async fn test_required_capability_violations_are_fatal() {
    let host = || HostContext {
        files: Arc::new(InMemoryFiles::new()),
        users: Arc::new(InMemoryUserStore::new()),
    };
    let required = || SetupOptions {
        required: vec![CapabilityKind::Storage],
    };

    let factory = TestFactory::default();
    let disabled = Integrations::setup(
        config(&[]),
        &factory,
        host(),
        &mut HookRegistry::new(),
        required(),
    )
    .await;
    assert!(matches!(disabled, Err(IntegrationError::ConfigInvalid { .. })));
    assert!(factory.built().is_empty());

    let failing = TestFactory {
        fail_storage: true,
        ..TestFactory::default()
    };
    let mut registry = HookRegistry::new();
    let construction = Integrations::setup(
        config(&STORAGE_ON),
        &failing,
        host(),
        &mut registry,
        required(),
    )
    .await;
    assert!(matches!(
        construction,
        Err(IntegrationError::ConstructionFailed { .. })
    ));
    assert_eq!(registry.record_created.len(), 0);
}

#[tokio::test]
async fn test_record_files_are_mirrored_and_purged() {
    let factory = TestFactory::default();
    let harness = setup_with(config(&STORAGE_ON), &factory).await;
    harness.files.insert("pages/r1/hero.png", "png");
    harness.files.insert("pages/r1/doc.pdf", "pdf");

    let record = Record::new("pages", "r1")
        .with_files("cover", ["hero.png", ""])
        .with_files("attachments", ["doc.pdf", "missing.txt"]);
    let storage = Arc::clone(harness.integrations.storage().active().unwrap());

    let mut created = RecordEvent::new(record.clone());
    let outcome = harness.registry.record_created.trigger(&mut created).await;
    assert!(outcome.is_pass_through());
    assert!(storage.exists("pages/r1/hero.png").await.unwrap());
    assert!(storage.exists("pages/r1/doc.pdf").await.unwrap());
    assert!(!storage.exists("pages/r1/missing.txt").await.unwrap());

    let mut deleted = RecordEvent::new(record);
    let outcome = harness.registry.record_deleted.trigger(&mut deleted).await;
    assert!(outcome.is_pass_through());
    assert!(!storage.exists("pages/r1/hero.png").await.unwrap());
    assert!(!storage.exists("pages/r1/doc.pdf").await.unwrap());
}

#[tokio::test]
async fn test_download_is_served_from_storage_when_present() {
    let factory = TestFactory::default();
    let harness = setup_with(config(&STORAGE_ON), &factory).await;
    let storage = harness.integrations.storage().active().unwrap();
    storage.put("{}", "pages/r1/data.json").await.unwrap();

    let mut event = FileDownloadEvent::new(Record::new("pages", "r1"), "data.json");
    let outcome = harness.registry.file_download.trigger(&mut event).await;

    assert_eq!(outcome, HookOutcome::Handled);
    let served = event.served.unwrap();
    assert_eq!(&served.body[..], b"{}");
    assert_eq!(served.content_type, "application/json");

    let mut missing = FileDownloadEvent::new(Record::new("pages", "r1"), "other.json");
    let outcome = harness.registry.file_download.trigger(&mut missing).await;
    assert!(outcome.is_pass_through());
    assert!(missing.served.is_none());
}

#[tokio::test]
async fn test_mail_failure_passes_through() {
    let mut client = MockMailClient::new();
    client
        .expect_send_email()
        .times(1)
        .returning(|_| Err(MailError::Send("MessageRejected".to_string())));
    let factory = TestFactory::default().with_mail(client);
    let harness = setup_with(config(&MAIL_ON), &factory).await;

    let message = Message::new(Address::new("jane@example.com"), "Hi").with_text("Hello");
    let outcome = harness
        .registry
        .mail_send
        .trigger(&mut MailEvent::new(message))
        .await;

    assert!(outcome.is_pass_through());
}

#[tokio::test]
async fn test_mail_success_is_handled() {
    let mut client = MockMailClient::new();
    client.expect_send_email().times(1).returning(|_| Ok(()));
    let factory = TestFactory::default().with_mail(client);
    let harness = setup_with(config(&MAIL_ON), &factory).await;

    let message = Message::new(Address::new("jane@example.com"), "Hi").with_html("<b>Hello</b>");
    let outcome = harness
        .registry
        .mail_send
        .trigger(&mut MailEvent::new(message))
        .await;

    assert!(outcome.is_handled());
}

#[tokio::test]
async fn test_failed_remote_auth_passes_through_without_local_user() {
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_initiate_password_auth()
        .times(1)
        .returning(|_, _| Err(IdentityError::remote("initiate_auth", "NotAuthorizedException")));
    let factory = TestFactory::default().with_identity(provider);
    let harness = setup_with(config(&IDENTITY_ON), &factory).await;

    let mut event = AuthEvent::new("users", "u@example.com", "wrong");
    let outcome = harness.registry.auth.trigger(&mut event).await;

    assert!(outcome.is_pass_through());
    assert!(event.record.is_none());
    assert!(harness.users.is_empty());
}

#[tokio::test]
async fn test_successful_auth_creates_user_once() {
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_initiate_password_auth()
        .times(2)
        .returning(|_, _| Ok(tokens()));
    let factory = TestFactory::default().with_identity(provider);
    let harness = setup_with(config(&IDENTITY_ON), &factory).await;

    let mut first = AuthEvent::new("users", "u@example.com", "hunter2");
    assert!(harness.registry.auth.trigger(&mut first).await.is_handled());
    let first = first.record.unwrap();
    assert!(first.verified);
    assert_eq!(first.get("cognitoAccessToken"), Some("access"));
    assert_eq!(first.get("cognitoRefreshToken"), Some("refresh"));
    assert_eq!(first.get("cognitoIdToken"), Some("id"));

    let mut second = AuthEvent::new("users", "u@example.com", "hunter2");
    assert!(harness.registry.auth.trigger(&mut second).await.is_handled());
    assert_eq!(second.record.unwrap().id, first.id);
    assert_eq!(harness.users.len(), 1);
}

#[tokio::test]
async fn test_auth_for_other_collections_is_ignored() {
    let mut provider = MockIdentityProvider::new();
    provider.expect_initiate_password_auth().times(0);
    let factory = TestFactory::default().with_identity(provider);
    let harness = setup_with(config(&IDENTITY_ON), &factory).await;

    let mut event = AuthEvent::new("admins", "root@example.com", "pw");
    assert!(harness.registry.auth.trigger(&mut event).await.is_pass_through());
}

struct LockedStore;

#[async_trait]
impl UserStore for LockedStore {
    async fn find_by_email(&self, _email: &str) -> Result<Option<UserRecord>, HostError> {
        Err(HostError::UserStore("database is locked".to_string()))
    }

    async fn create(&self, _user: NewUser) -> Result<UserRecord, HostError> {
        Err(HostError::UserStore("database is locked".to_string()))
    }

    async fn save(&self, _user: &UserRecord) -> Result<(), HostError> {
        Err(HostError::UserStore("database is locked".to_string()))
    }
}

#[tokio::test]
async fn test_host_store_failure_after_remote_success_is_fatal() {
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_initiate_password_auth()
        .returning(|_, _| Ok(tokens()));
    let factory = TestFactory::default().with_identity(provider);
    let mut registry = HookRegistry::new();
    let host = HostContext {
        files: Arc::new(InMemoryFiles::new()),
        users: Arc::new(LockedStore),
    };
    Integrations::setup(
        config(&IDENTITY_ON),
        &factory,
        host,
        &mut registry,
        SetupOptions::default(),
    )
    .await
    .unwrap();

    let mut event = AuthEvent::new("users", "u@example.com", "hunter2");
    let outcome = registry.auth.trigger(&mut event).await;
    assert!(matches!(outcome, HookOutcome::Fatal(ref e) if e.handler == "authenticate_users"));
    assert!(event.record.is_none());
}

#[tokio::test]
async fn test_convenience_helpers_without_storage() {
    let factory = TestFactory::default();
    let harness = setup_with(config(&[]), &factory).await;

    assert_eq!(harness.integrations.public_url("pages/r1/a.png"), "pages/r1/a.png");
    assert_eq!(
        harness
            .integrations
            .upload(Cursor::new(b"x".to_vec()), "pages/r1/a.png")
            .await
            .unwrap_err(),
        IntegrationError::CapabilityUnavailable(CapabilityKind::Storage)
    );
    assert_eq!(
        harness.integrations.delete("pages/r1/a.png").await.unwrap_err(),
        IntegrationError::CapabilityUnavailable(CapabilityKind::Storage)
    );
}

#[tokio::test]
async fn test_convenience_helpers_with_storage() {
    let factory = TestFactory::default();
    let harness = setup_with(config(&STORAGE_ON), &factory).await;

    assert_eq!(
        harness.integrations.public_url("pages/r1/a.png"),
        "https://assets.s3.us-east-1.amazonaws.com/pages/r1/a.png"
    );
    let size = harness
        .integrations
        .upload(Cursor::new(b"abc".to_vec()), "pages/r1/a.png")
        .await
        .unwrap();
    assert_eq!(size, 3);
    harness.integrations.delete("pages/r1/a.png").await.unwrap();
    harness.integrations.delete("pages/r1/a.png").await.unwrap();
}

async fn assert_storage_failures_pass_through(endpoint: &str) {
    let factory = TestFactory {
        remote_storage: true,
        ..TestFactory::default()
    };
    let harness = setup_with(remote_storage_config(endpoint), &factory).await;
    assert!(harness.integrations.is_storage_enabled());
    harness.files.insert("pages/r1/hero.png", "png");
    let record = Record::new("pages", "r1").with_files("cover", ["hero.png"]);

    let mut created = RecordEvent::new(record.clone());
    let outcome = harness.registry.record_created.trigger(&mut created).await;
    assert!(outcome.is_pass_through());

    let mut download = FileDownloadEvent::new(record.clone(), "hero.png");
    let outcome = harness.registry.file_download.trigger(&mut download).await;
    assert!(outcome.is_pass_through());
    assert!(download.served.is_none());

    let mut deleted = RecordEvent::new(record);
    let outcome = harness.registry.record_deleted.trigger(&mut deleted).await;
    assert!(outcome.is_pass_through());

    assert!(matches!(
        harness.integrations.delete("pages/r1/hero.png").await,
        Err(IntegrationError::RemoteCallFailed {
            capability: CapabilityKind::Storage,
            ..
        })
    ));
}

#[tokio::test]
async fn test_unreachable_storage_falls_back_to_default_path() {
    assert_storage_failures_pass_through("http://127.0.0.1:1").await;
}

#[tokio::test]
async fn test_stalled_storage_falls_back_to_default_path() {
    let endpoint = stalled_endpoint().await;
    assert_storage_failures_pass_through(&endpoint).await;
}
