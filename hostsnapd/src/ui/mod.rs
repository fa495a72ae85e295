/// Embedded page chrome for the snapshot view
///
/// The template is the original page with a `{{sections}}` marker where the
/// captured output goes and `{{title}}` where the product name was; everything
/// else is served as-is.
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use log::warn;
use std::path::Path;

/// Snapshot page template
pub const PAGE_TEMPLATE: &str = include_str!("snapshot.html");

/// Stylesheet referenced by the template
const STYLESHEET: &str = include_str!("starter-template.css");

/// Logo referenced by the template, looked up in the static directory
pub const LOGO_FILE: &str = "logo.png";

/// Serve the stylesheet unchanged
pub async fn stylesheet_handler() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLESHEET)
}

/// Serve `dir/name` byte for byte, or 404 when it is not there
pub async fn static_file(dir: &Path, name: &str, content_type: &'static str) -> Response {
    let path = dir.join(name);
    match tokio::fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type)], bytes).into_response(),
        Err(err) => {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!("[ui] failed to read {}: {}", path.display(), err);
            }
            StatusCode::NOT_FOUND.into_response()
        }
    }
}
