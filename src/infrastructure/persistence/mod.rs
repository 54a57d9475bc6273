//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx prepared
//! statements. Row mapping goes through `sqlx::FromRow` on the entities.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - Short link storage and click counting
//! - [`PgUserRepository`] - User accounts

pub mod pg_link_repository;
pub mod pg_user_repository;

pub use pg_link_repository::PgLinkRepository;
pub use pg_user_repository::PgUserRepository;
