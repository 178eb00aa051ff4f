//! Capability status endpoint.

use std::collections::BTreeMap;

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use skyhook_core::hooks::HookKind;
use skyhook_core::orchestrator::CapabilityStatus;

use crate::AppState;

/// Capability status response.
#[derive(Serialize)]
pub struct IntegrationsResponse {
    /// State of each capability.
    pub capabilities: Vec<CapabilityStatus>,
    /// Handlers bound per hook.
    pub hooks: BTreeMap<HookKind, usize>,
}

async fn integration_status(State(state): State<AppState>) -> Json<IntegrationsResponse> {
    Json(IntegrationsResponse {
        capabilities: state.integrations.status(),
        hooks: state.hooks.handler_counts(),
    })
}

/// Creates capability status routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/integrations", get(integration_status))
}
