//! User account entity.

use chrono::{DateTime, Utc};

/// A registered user.
///
/// `password_hash` holds a bcrypt hash and is never serialized.
#[derive(Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub user_id: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("password_hash", &"***")
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Input data for creating a user.
#[derive(Clone)]
pub struct NewUser {
    pub user_id: String,
    pub password_hash: String,
}
