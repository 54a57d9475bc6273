//! HTTP middleware for request processing and protection.
//!
//! Provides bearer authentication, rate limiting for credential endpoints,
//! CORS and request tracing.

pub mod auth;
pub mod cors;
pub mod rate_limit;
pub mod tracing;
