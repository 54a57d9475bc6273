//! HTML error page for failed redirects.

use askama::Template;
use askama_web::WebTemplate;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Template for the redirect error page.
///
/// Renders `templates/error.html` with the status line and a short
/// explanation for the visitor.
#[derive(Template, WebTemplate)]
#[template(path = "error.html")]
pub struct ErrorPageTemplate {
    pub status: u16,
    pub title: String,
    pub message: String,
}

/// Renders the error page with the given status.
pub fn error_page(status: StatusCode, message: impl Into<String>) -> Response {
    let template = ErrorPageTemplate {
        status: status.as_u16(),
        title: status.canonical_reason().unwrap_or("Error").to_string(),
        message: message.into(),
    };

    (status, template).into_response()
}
