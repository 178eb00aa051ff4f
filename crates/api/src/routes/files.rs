//! Record file download route.
//!
//! The download hook gets the first chance to serve a file; when every
//! handler passes, the file is served from the host's local storage.

use axum::{
    Router,
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use skyhook_core::hooks::{FileDownloadEvent, HookOutcome};
use skyhook_core::host::{HostError, Record};
use skyhook_core::storage::content_type_for;
use tokio::io::AsyncReadExt;
use tracing::{debug, error};

use super::error_response;
use crate::AppState;

/// Creates file routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/files/{collection}/{record_id}/{filename}", get(download))
}

fn file_response(body: impl Into<Body>, content_type: &'static str) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type)],
        body.into(),
    )
        .into_response()
}

async fn download(
    State(state): State<AppState>,
    Path((collection, record_id, filename)): Path<(String, String, String)>,
) -> Response {
    let mut event = FileDownloadEvent::new(Record::new(collection, record_id), filename);

    match state.hooks.file_download.trigger(&mut event).await {
        HookOutcome::Handled => {
            if let Some(served) = event.served.take() {
                return file_response(served.body, served.content_type);
            }
            debug!(file = %event.served_name, "Download handled without content, serving locally");
        }
        HookOutcome::Fatal(e) => {
            error!(error = %e, "Download hook failed");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An error occurred",
            );
        }
        HookOutcome::PassThrough => {}
    }

    serve_local(&state, &event.record, &event.served_name).await
}

async fn serve_local(state: &AppState, record: &Record, filename: &str) -> Response {
    let local_path = record.local_path(filename);

    let mut reader = match state.files.open(&local_path).await {
        Ok(reader) => reader,
        Err(HostError::FileNotFound(_) | HostError::InvalidPath(_)) => {
            return error_response(StatusCode::NOT_FOUND, "not_found", "File not found");
        }
        Err(e) => {
            error!(path = %local_path, error = %e, "Failed to open local file");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An error occurred",
            );
        }
    };

    let mut body = Vec::new();
    if let Err(e) = reader.read_to_end(&mut body).await {
        error!(path = %local_path, error = %e, "Failed to read local file");
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "An error occurred",
        );
    }

    file_response(body, content_type_for(filename))
}
