//! Repository trait for user accounts.

use crate::domain::entities::{NewUser, User};
use crate::error::AppError;
use async_trait::async_trait;

/// Storage interface for user accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a new user.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if `user_id` is taken.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_user: NewUser) -> Result<User, AppError>;

    /// Finds a user by login name.
    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<User>, AppError>;

    /// Returns true if a user with this login name exists.
    async fn exists(&self, user_id: &str) -> Result<bool, AppError>;
}
