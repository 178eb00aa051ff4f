//! Content-type inference by file extension.

use std::path::Path;

/// Fallback for unmapped or missing extensions.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Infers the content type of `key` from its extension (case-insensitive).
#[must_use]
pub fn content_type_for(key: &str) -> &'static str {
    let Some(ext) = Path::new(key).extension().and_then(|e| e.to_str()) else {
        return DEFAULT_CONTENT_TYPE;
    };

    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "json" => "application/json",
        "js" => "application/javascript",
        "css" => "text/css",
        "html" => "text/html",
        "txt" => "text/plain",
        "xml" => "application/xml",
        "mp4" => "video/mp4",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        _ => DEFAULT_CONTENT_TYPE,
    }
}
