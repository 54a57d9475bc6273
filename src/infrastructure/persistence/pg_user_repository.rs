//! PostgreSQL implementation of user repository.

use async_trait::async_trait;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewUser, User};
use crate::domain::repositories::UserRepository;
use crate::error::AppError;
use crate::utils::db_error::{USER_ID_CONSTRAINT, is_unique_violation_on};

/// PostgreSQL repository for user accounts.
///
/// Stores bcrypt hashes only; raw passwords never reach this layer.
pub struct PgUserRepository {
    pool: Arc<PgPool>,
}

impl PgUserRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (user_id, password_hash)
            VALUES ($1, $2)
            RETURNING id, user_id, password_hash, created_at, updated_at
            "#,
        )
        .bind(&new_user.user_id)
        .bind(&new_user.password_hash)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| {
            if is_unique_violation_on(&e, USER_ID_CONSTRAINT) {
                AppError::conflict("User ID already exists", json!({ "user_id": new_user.user_id }))
            } else {
                AppError::from(e)
            }
        })
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, user_id, password_hash, created_at, updated_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(user)
    }

    async fn exists(&self, user_id: &str) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE user_id = $1)")
                .bind(user_id)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(exists)
    }
}
