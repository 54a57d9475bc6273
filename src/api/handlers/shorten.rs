//! Handler for link shortening endpoint.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link, or returns the existing one for the same target.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "example.com/some/page",
///   "expires_in_days": 7
/// }
/// ```
///
/// # Response
///
/// `201 Created` for a new link, `200 OK` when the target was already shortened:
///
/// ```json
/// {
///   "short_url": "https://sho.rt/aB3xY9",
///   "original_url": "https://example.com/some/page",
///   "created_at": "2025-01-01T12:00:00Z",
///   "expires_at": "2025-01-08T12:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - 400 Bad Request for a missing URL, malformed body or out-of-range expiry
/// - 503 Service Unavailable when no free code was found
/// - 500 Internal Server Error on storage failure
pub async fn shorten_handler(
    State(state): State<AppState>,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let shortened = state
        .link_service
        .shorten(&payload.url, payload.expires_in_days)
        .await?;

    let status = if shortened.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    let short_url = state.link_service.short_url(&shortened.link.code);

    Ok((status, Json(ShortenResponse::new(shortened.link, short_url))))
}
