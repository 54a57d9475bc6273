//! DTOs for link shortening endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::ShortLink;

/// Request to shorten a URL.
///
/// `url` may omit the scheme; `https://` is assumed.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    #[serde(default)]
    #[validate(length(max = 2048, message = "URL must be at most 2048 characters"))]
    pub url: String,

    /// Lifetime of a newly created link in days. Omitted means it never expires.
    pub expires_in_days: Option<i64>,
}

/// Public view of a short link.
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub short_url: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl ShortenResponse {
    pub fn new(link: ShortLink, short_url: String) -> Self {
        Self {
            short_url,
            original_url: link.target,
            created_at: link.created_at,
            expires_at: link.expires_at,
        }
    }
}
