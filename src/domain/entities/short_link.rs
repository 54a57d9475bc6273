//! Short link entity representing a code-to-target mapping.

use chrono::{DateTime, Utc};

/// A persisted mapping from a generated code to a target URL.
///
/// `target` is always normalized (explicit `http://` or `https://` scheme).
/// `clicks` only ever grows, and only through the redirect path.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ShortLink {
    pub id: i64,
    pub code: String,
    pub target: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub clicks: i64,
}

impl ShortLink {
    /// Creates a new ShortLink instance.
    pub fn new(
        id: i64,
        code: String,
        target: String,
        created_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
        clicks: i64,
    ) -> Self {
        Self {
            id,
            code,
            target,
            created_at,
            expires_at,
            clicks,
        }
    }

    /// Returns true if `expires_at` is set and strictly before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| e < now)
    }

    /// Returns true if the link has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Input data for creating a new short link.
///
/// `clicks` is not part of the input: storage always starts it at zero.
#[derive(Debug, Clone)]
pub struct NewShortLink {
    pub code: String,
    pub target: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}
