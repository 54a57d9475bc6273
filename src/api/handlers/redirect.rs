//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::application::services::RedirectOutcome;
use crate::state::AppState;
use crate::web::error_page;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Responses
///
/// - **301 Moved Permanently** with `Location` for a live link
/// - **404 Not Found** HTML page for unknown and expired codes
/// - **500 Internal Server Error** HTML page on storage failure
///
/// # Click Tracking
///
/// The click is queued for the background worker before responding; if the
/// queue is full the click is dropped and the redirect still happens.
pub async fn redirect_handler(Path(code): Path<String>, State(state): State<AppState>) -> Response {
    match state.link_service.resolve(&code).await {
        Ok(RedirectOutcome::Found(target)) => {
            (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, target)]).into_response()
        }
        Ok(RedirectOutcome::NotFound) => error_page(
            StatusCode::NOT_FOUND,
            "This short link does not exist.",
        ),
        Ok(RedirectOutcome::Expired) => error_page(
            StatusCode::NOT_FOUND,
            "This short link has expired.",
        ),
        Err(e) => {
            tracing::error!(code = %code, error = %e, "Failed to resolve short link");
            error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong. Please try again later.",
            )
        }
    }
}
