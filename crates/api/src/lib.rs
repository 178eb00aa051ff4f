//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - Health and capability status endpoints
//! - The record file download route, served through the download hook
//!   with the host's local files as the fallback

pub mod routes;

use std::sync::Arc;

use axum::Router;
use skyhook_core::hooks::HookRegistry;
use skyhook_core::host::LocalFiles;
use skyhook_core::orchestrator::Integrations;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Live capability set.
    pub integrations: Arc<Integrations>,
    /// Bound lifecycle hooks.
    pub hooks: Arc<HookRegistry>,
    /// Host local files, the default download path.
    pub files: Arc<dyn LocalFiles>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
