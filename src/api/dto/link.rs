//! DTOs for link details endpoint.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::ShortLink;

/// Full view of a short link including its click counter.
#[derive(Debug, Serialize)]
pub struct LinkDetailsResponse {
    pub code: String,
    pub short_url: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub clicks: i64,
    pub expired: bool,
}

impl LinkDetailsResponse {
    pub fn new(link: ShortLink, short_url: String) -> Self {
        let expired = link.is_expired();

        Self {
            code: link.code,
            short_url,
            original_url: link.target,
            created_at: link.created_at,
            expires_at: link.expires_at,
            clicks: link.clicks,
            expired,
        }
    }
}
