//! Application layer services implementing business logic.
//!
//! Services coordinate repository calls, validation and business rules, and
//! expose a small API to the HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Shortening, dedup and redirect resolution
//! - [`services::auth_service::AuthService`] - Signup, login and bearer tokens

pub mod services;
