//! Handler for link details endpoint.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::link::LinkDetailsResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns a short link with its click counter.
///
/// # Endpoint
///
/// `GET /api/links/{code}`
///
/// Expired links are returned too, with `"expired": true`. Reading details
/// does not count as a click.
///
/// # Errors
///
/// Returns 404 Not Found if the code is unknown.
pub async fn link_details_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<LinkDetailsResponse>, AppError> {
    let link = state.link_service.get_link(&code).await?;
    let short_url = state.link_service.short_url(&link.code);

    Ok(Json(LinkDetailsResponse::new(link, short_url)))
}
