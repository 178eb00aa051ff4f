//! Skyhook API Server
//!
//! Main entry point: resolves capability settings, brings up the enabled
//! integrations, and serves the HTTP surface.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skyhook_api::{AppState, create_router};
use skyhook_core::hooks::HookRegistry;
use skyhook_core::host::{DirectoryFiles, InMemoryUserStore};
use skyhook_core::orchestrator::{AwsAdapterFactory, HostContext, Integrations, SetupOptions};
use skyhook_shared::{AppConfig, ConfigResolver, SettingsSource};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skyhook=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;
    let integration_config = ConfigResolver::resolve(&SettingsSource::from_env()?);

    // Host collaborators
    let files = Arc::new(DirectoryFiles::new(config.local.storage_root.clone()));
    let users = Arc::new(InMemoryUserStore::new());
    info!(root = %config.local.storage_root.display(), "Local storage configured");

    // Bring up integrations and bind their hooks
    let mut hooks = HookRegistry::new();
    let integrations = Integrations::setup(
        integration_config,
        &AwsAdapterFactory,
        HostContext {
            files: files.clone(),
            users,
        },
        &mut hooks,
        SetupOptions {
            required: config.integrations.required.clone(),
        },
    )
    .await?;

    for status in integrations.status() {
        info!(
            capability = %status.capability,
            state = ?status.state,
            "Capability state"
        );
    }

    // Create application state
    let state = AppState {
        integrations: Arc::new(integrations),
        hooks: Arc::new(hooks),
        files,
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
