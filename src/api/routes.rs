//! API route configuration.
//!
//! Mounted under `/api` by [`crate::routes::app_router`].

use crate::api::handlers::{
    link_details_handler, login_handler, me_handler, shorten_handler, signup_handler,
};
use crate::api::middleware::{auth, rate_limit};
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Public link endpoints.
///
/// # Endpoints
///
/// - `POST /shorten`       - Create (or reuse) a short link
/// - `GET  /links/{code}`  - Link details with click count
pub fn link_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/links/{code}", get(link_details_handler))
}

/// Signup and login, rate limited per client IP.
///
/// # Endpoints
///
/// - `POST /signup` - Create an account
/// - `POST /login`  - Exchange credentials for a token
pub fn credential_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup_handler))
        .route("/login", post(login_handler))
        .layer(rate_limit::credentials_layer())
}

/// Endpoints requiring a bearer token.
///
/// # Endpoints
///
/// - `GET /me` - The signed-in account
pub fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(me_handler))
        .route_layer(middleware::from_fn_with_state(state, auth::layer))
}

/// All `/api` routes.
pub fn api_router(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(link_routes())
        .merge(credential_routes())
        .merge(protected_routes(state))
}
