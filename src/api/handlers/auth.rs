//! Handlers for signup, login and the current session.

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::dto::auth::{AuthRequest, AuthResponse, MeResponse};
use crate::api::middleware::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::state::AppState;

/// Failed signup or login, rendered as an [`AuthResponse`] with
/// `success: false` and the error message.
#[derive(Debug)]
pub struct AuthFailure(AppError);

impl From<AppError> for AuthFailure {
    fn from(e: AppError) -> Self {
        Self(e)
    }
}

impl From<JsonRejection> for AuthFailure {
    fn from(e: JsonRejection) -> Self {
        Self(e.into())
    }
}

impl IntoResponse for AuthFailure {
    fn into_response(self) -> Response {
        let status = self.0.status_code();

        if status.is_server_error() {
            tracing::error!(status = %status, error = %self.0, "auth request failed");
        }

        (status, Json(AuthResponse::failure(self.0.to_string()))).into_response()
    }
}

/// Creates an account and signs it in.
///
/// # Endpoint
///
/// `POST /api/signup`
///
/// # Request Body
///
/// ```json
/// { "user_id": "alice", "password": "secret1" }
/// ```
///
/// # Response
///
/// `201 Created`:
///
/// ```json
/// {
///   "success": true,
///   "message": "Account created",
///   "token": "...",
///   "user_id": "alice"
/// }
/// ```
///
/// # Errors
///
/// Failures return `{"success": false, "message": "..."}` with:
///
/// - 400 Bad Request if a field is missing or breaks the input rules
/// - 409 Conflict if the user ID is taken
/// - 500 Internal Server Error on hashing or storage failure
pub async fn signup_handler(
    State(state): State<AppState>,
    payload: Result<Json<AuthRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), AuthFailure> {
    let Json(payload) = payload?;

    let session = state
        .auth_service
        .signup(&payload.user_id, &payload.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::new(session, "Account created")),
    ))
}

/// Signs in with a user ID and password.
///
/// # Endpoint
///
/// `POST /api/login`
///
/// # Errors
///
/// Same failure body as signup:
///
/// - 400 Bad Request if a field is missing
/// - 401 Unauthorized for an unknown user or wrong password
pub async fn login_handler(
    State(state): State<AppState>,
    payload: Result<Json<AuthRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AuthFailure> {
    let Json(payload) = payload?;

    let session = state
        .auth_service
        .login(&payload.user_id, &payload.password)
        .await?;

    Ok(Json(AuthResponse::new(session, "Login successful")))
}

/// Returns the account the bearer token belongs to.
///
/// # Endpoint
///
/// `GET /api/me`
///
/// # Authentication
///
/// Requires `Authorization: Bearer <token>`; see [`crate::api::middleware::auth`].
pub async fn me_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
) -> Result<Json<MeResponse>, AppError> {
    let user = state.auth_service.current_user(&user_id).await?;

    Ok(Json(MeResponse {
        user_id: user.user_id,
        created_at: user.created_at,
    }))
}
