//! Liveness endpoint with a capability summary.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use skyhook_core::orchestrator::StateLabel;
use skyhook_shared::CapabilityKind;

use crate::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `healthy`, or `degraded` when an enabled capability failed to start.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Number of active capabilities.
    pub active: usize,
    /// Capabilities that were enabled but failed to initialize.
    pub degraded: Vec<CapabilityKind>,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let statuses = state.integrations.status();
    let active = statuses
        .iter()
        .filter(|s| s.state == StateLabel::Active)
        .count();
    let degraded: Vec<_> = statuses
        .iter()
        .filter(|s| s.state == StateLabel::FailedInit)
        .map(|s| s.capability)
        .collect();

    // A degraded capability falls back to the host default; the service still serves.
    Json(HealthResponse {
        status: if degraded.is_empty() {
            "healthy"
        } else {
            "degraded"
        },
        version: env!("CARGO_PKG_VERSION"),
        active,
        degraded,
    })
}

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use skyhook_core::hooks::HookRegistry;
    use skyhook_core::host::{InMemoryFiles, InMemoryUserStore};
    use skyhook_core::orchestrator::{AwsAdapterFactory, HostContext, Integrations, SetupOptions};
    use skyhook_shared::{ConfigResolver, SettingsSource};
    use tower::ServiceExt;

    use crate::{AppState, create_router};

    async fn health(pairs: &[(&str, &str)]) -> serde_json::Value {
        let files = Arc::new(InMemoryFiles::new());
        let mut hooks = HookRegistry::new();
        let integrations = Integrations::setup(
            ConfigResolver::resolve(&SettingsSource::from_pairs(pairs.iter().copied())),
            &AwsAdapterFactory,
            HostContext {
                files: files.clone(),
                users: Arc::new(InMemoryUserStore::new()),
            },
            &mut hooks,
            SetupOptions::default(),
        )
        .await
        .expect("nothing required");

        let app = create_router(AppState {
            integrations: Arc::new(integrations),
            hooks: Arc::new(hooks),
            files,
        });
        let response = app
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health_without_capabilities() {
        let json = health(&[]).await;

        assert_eq!(json["status"], "healthy");
        assert_eq!(json["active"], 0);
        assert_eq!(json["degraded"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_health_reports_failed_capability() {
        // Enabled without a bucket: rejected before any client is built.
        let json = health(&[("AWS_S3_ENABLED", "true")]).await;

        assert_eq!(json["status"], "degraded");
        assert_eq!(json["active"], 0);
        assert_eq!(json["degraded"], serde_json::json!(["storage"]));
    }
}
