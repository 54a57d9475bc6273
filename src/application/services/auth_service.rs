//! User signup, login and session token handling.

use std::sync::{Arc, LazyLock};

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{TimeDelta, Utc};
use hmac::{Hmac, Mac};
use regex::Regex;
use serde_json::json;
use sha2::Sha256;

use crate::domain::entities::{NewUser, User};
use crate::domain::repositories::UserRepository;
use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Allowed characters for login names.
static USER_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("static regex is valid"));

pub const MIN_USER_ID_LEN: usize = 3;
pub const MAX_USER_ID_LEN: usize = 50;
pub const MIN_PASSWORD_LEN: usize = 6;
/// bcrypt ignores input past 72 bytes.
pub const MAX_PASSWORD_LEN: usize = 72;

const NONCE_BYTES: usize = 9;

/// Message shared by every failed login so callers cannot probe for accounts.
const INVALID_CREDENTIALS: &str = "Invalid user ID or password";

/// An authenticated user together with a freshly issued token.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user_id: String,
    pub token: String,
}

/// Service for account creation, password login and bearer tokens.
///
/// Passwords are hashed with bcrypt on the blocking thread pool. Tokens are
/// stateless: `base64url(user_id:issued_at:nonce).hex(hmac_sha256(payload))`,
/// keyed by the server signing secret and valid for `token_ttl`.
pub struct AuthService {
    user_repository: Arc<dyn UserRepository>,
    signing_secret: String,
    token_ttl: TimeDelta,
    password_cost: u32,
}

impl AuthService {
    /// Creates a new authentication service.
    ///
    /// # Arguments
    ///
    /// - `user_repository` - account storage
    /// - `signing_secret` - HMAC key for issued tokens
    /// - `token_ttl` - lifetime of issued tokens
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        signing_secret: String,
        token_ttl: TimeDelta,
    ) -> Self {
        Self {
            user_repository,
            signing_secret,
            token_ttl,
            password_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Overrides the bcrypt work factor.
    pub fn with_password_cost(mut self, cost: u32) -> Self {
        self.password_cost = cost;
        self
    }

    /// Registers a new account and signs it in.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if either field is missing or breaks the length/charset rules
    /// - [`AppError::Conflict`] if the user ID is taken
    /// - [`AppError::Internal`] on hashing or storage failure
    pub async fn signup(&self, user_id: &str, password: &str) -> Result<AuthSession, AppError> {
        validate_new_credentials(user_id, password)?;

        if self.user_repository.exists(user_id).await? {
            return Err(AppError::conflict(
                "User ID already exists",
                json!({ "user_id": user_id }),
            ));
        }

        let password_hash = self.hash_password(password).await?;

        let user = self
            .user_repository
            .create(NewUser {
                user_id: user_id.to_string(),
                password_hash,
            })
            .await?;

        tracing::info!(user_id = %user.user_id, "User signed up");

        let token = self.issue_token(&user.user_id)?;
        Ok(AuthSession {
            user_id: user.user_id,
            token,
        })
    }

    /// Checks a password and issues a token.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if either field is missing
    /// - [`AppError::Unauthorized`] for an unknown user or a wrong password
    /// - [`AppError::Internal`] on storage or hashing failure
    pub async fn login(&self, user_id: &str, password: &str) -> Result<AuthSession, AppError> {
        require_credentials(user_id, password)?;

        let Some(user) = self.user_repository.find_by_user_id(user_id).await? else {
            tracing::debug!(user_id, "Login for unknown user");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS, json!({})));
        };

        if !verify_password(password, &user.password_hash).await? {
            tracing::debug!(user_id, "Login with wrong password");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS, json!({})));
        }

        tracing::info!(user_id = %user.user_id, "User logged in");

        let token = self.issue_token(&user.user_id)?;
        Ok(AuthSession {
            user_id: user.user_id,
            token,
        })
    }

    /// Loads the account a verified token belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the account no longer exists.
    pub async fn current_user(&self, user_id: &str) -> Result<User, AppError> {
        self.user_repository
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| {
                AppError::unauthorized("Unauthorized", json!({ "reason": "Unknown user" }))
            })
    }

    /// Issues a signed token for `user_id`.
    pub fn issue_token(&self, user_id: &str) -> Result<String, AppError> {
        self.issue_token_at(user_id, Utc::now().timestamp())
    }

    /// Verifies a token and returns the user ID it was issued to.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token is malformed, its
    /// signature does not match, or it has expired.
    pub fn verify_token(&self, token: &str) -> Result<String, AppError> {
        let invalid = |reason: &str| AppError::unauthorized("Unauthorized", json!({ "reason": reason }));

        let (payload, signature) = token
            .split_once('.')
            .ok_or_else(|| invalid("Malformed token"))?;

        let signature = hex::decode(signature).map_err(|_| invalid("Malformed token"))?;
        self.mac_for(payload)
            .verify_slice(&signature)
            .map_err(|_| invalid("Invalid token signature"))?;

        let decoded = URL_SAFE_NO_PAD
            .decode(payload)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .ok_or_else(|| invalid("Malformed token"))?;

        let mut parts = decoded.splitn(3, ':');
        let (Some(user_id), Some(issued_at), Some(_nonce)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid("Malformed token"));
        };

        let issued_at: i64 = issued_at.parse().map_err(|_| invalid("Malformed token"))?;
        let age = Utc::now().timestamp() - issued_at;
        if age < 0 || age > self.token_ttl.num_seconds() {
            return Err(invalid("Token expired"));
        }

        Ok(user_id.to_string())
    }

    fn issue_token_at(&self, user_id: &str, issued_at: i64) -> Result<String, AppError> {
        let mut nonce = [0u8; NONCE_BYTES];
        getrandom::fill(&mut nonce).map_err(|e| {
            AppError::internal("Failed to generate token", json!({ "reason": e.to_string() }))
        })?;

        let payload = URL_SAFE_NO_PAD.encode(format!(
            "{}:{}:{}",
            user_id,
            issued_at,
            URL_SAFE_NO_PAD.encode(nonce)
        ));
        let signature = hex::encode(self.mac_for(&payload).finalize().into_bytes());

        Ok(format!("{payload}.{signature}"))
    }

    fn mac_for(&self, payload: &str) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(self.signing_secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(payload.as_bytes());
        mac
    }

    async fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let password = password.to_string();
        let cost = self.password_cost;

        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AppError::internal("Password hashing failed", json!({ "reason": e.to_string() })))?
            .map_err(|e| AppError::internal("Password hashing failed", json!({ "reason": e.to_string() })))
    }
}

async fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let password = password.to_string();
    let hash = hash.to_string();

    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::internal("Password verification failed", json!({ "reason": e.to_string() })))?
        .map_err(|e| AppError::internal("Password verification failed", json!({ "reason": e.to_string() })))
}

/// Applies the signup rules for user IDs and passwords.
///
/// # Errors
///
/// Returns [`AppError::Validation`] describing the first broken rule.
pub fn validate_new_credentials(user_id: &str, password: &str) -> Result<(), AppError> {
    require_credentials(user_id, password)?;
    validate_user_id(user_id)?;
    validate_password(password)
}

fn require_credentials(user_id: &str, password: &str) -> Result<(), AppError> {
    if user_id.is_empty() || password.is_empty() {
        return Err(AppError::bad_request(
            "User ID and password are required",
            json!({}),
        ));
    }
    Ok(())
}

fn validate_user_id(user_id: &str) -> Result<(), AppError> {
    if user_id.len() < MIN_USER_ID_LEN {
        return Err(AppError::bad_request(
            "User ID must be at least 3 characters long",
            json!({ "provided_length": user_id.len() }),
        ));
    }

    if user_id.len() > MAX_USER_ID_LEN {
        return Err(AppError::bad_request(
            "User ID must be at most 50 characters long",
            json!({ "provided_length": user_id.len() }),
        ));
    }

    if !USER_ID_REGEX.is_match(user_id) {
        return Err(AppError::bad_request(
            "User ID can only contain letters, digits, underscores and hyphens",
            json!({ "user_id": user_id }),
        ));
    }

    Ok(())
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::bad_request(
            "Password must be at least 6 characters long",
            json!({}),
        ));
    }

    if password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::bad_request(
            "Password must be at most 72 bytes long",
            json!({}),
        ));
    }

    Ok(())
}
