//! CORS policy for a browser front-end.

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;

/// Creates a CORS layer allowing a single front-end origin.
///
/// Allows `GET` and `POST` with `Content-Type` and `Authorization` headers,
/// which covers shortening, details lookup, signup, login and `/api/me`.
/// Credentialed requests are allowed.
///
/// # Errors
///
/// Returns an error if `origin` is not a valid header value.
pub fn layer(origin: &str) -> Result<CorsLayer> {
    let origin = HeaderValue::from_str(origin)
        .with_context(|| format!("CORS_ORIGIN is not a valid origin: '{origin}'"))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_origin() {
        assert!(layer("http://localhost:3000").is_ok());
    }

    #[test]
    fn test_rejects_invalid_origin() {
        assert!(layer("http://bad\norigin").is_err());
    }
}
