//! Link shortening and redirect resolution.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::json;

use crate::domain::click_event::{ClickEvent, ClickTracker};
use crate::domain::entities::{NewShortLink, ShortLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::CodeGenerator;
use crate::utils::url_normalizer::normalize_url;

/// Upper bound on code candidates tried for one shorten request.
///
/// Counts both candidates found taken by lookup and inserts rejected by the
/// uniqueness constraint.
pub const MAX_CODE_ATTEMPTS: usize = 10;

/// Codes that would be shadowed by a fixed route and never redirect.
pub const RESERVED_CODES: &[&str] = &["health"];

/// Result of a shorten request.
#[derive(Debug, Clone)]
pub struct Shortened {
    pub link: ShortLink,
    /// `false` when an existing link for the same target was returned.
    pub created: bool,
}

/// Decision for a redirect request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectOutcome {
    /// Live link; redirect to the contained target.
    Found(String),
    NotFound,
    /// Link exists but its expiry time has passed.
    Expired,
}

/// Service for creating short links and resolving codes.
///
/// Handles URL normalization, target deduplication, collision-tolerant code
/// generation and best-effort click tracking.
pub struct LinkService {
    link_repository: Arc<dyn LinkRepository>,
    code_generator: Arc<dyn CodeGenerator>,
    click_tracker: ClickTracker,
    base_url: String,
}

impl LinkService {
    /// Creates a new link service.
    ///
    /// `base_url` is the public address short URLs are built on, e.g.
    /// `https://sho.rt`. A trailing slash is ignored.
    pub fn new(
        link_repository: Arc<dyn LinkRepository>,
        code_generator: Arc<dyn CodeGenerator>,
        click_tracker: ClickTracker,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            link_repository,
            code_generator,
            click_tracker,
            base_url,
        }
    }

    /// Shortens `raw_url`, reusing an existing link for the same target.
    ///
    /// # Deduplication
    ///
    /// The input is normalized first (`example.com` and `https://example.com`
    /// are the same target). If a link for that target exists it is returned
    /// unchanged, even if it was created with a different expiry.
    ///
    /// # Expiry
    ///
    /// `expires_in_days` only applies to a new link and may be zero or
    /// negative, which yields a link that is already expired.
    ///
    /// # Code Generation
    ///
    /// Up to [`MAX_CODE_ATTEMPTS`] candidates are tried. A candidate is
    /// skipped if it is in [`RESERVED_CODES`], if a lookup finds it taken, or
    /// if the insert loses a race on the uniqueness constraint.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] for a blank URL or an expiry past the representable range
    /// - [`AppError::Capacity`] when every candidate collided
    /// - [`AppError::Internal`] on storage failure (not retried)
    pub async fn shorten(
        &self,
        raw_url: &str,
        expires_in_days: Option<i64>,
    ) -> Result<Shortened, AppError> {
        if raw_url.trim().is_empty() {
            return Err(AppError::bad_request("URL is required", json!({ "field": "url" })));
        }

        let target = normalize_url(raw_url);

        if let Some(existing) = self.link_repository.find_by_target(&target).await? {
            tracing::debug!(code = %existing.code, target = %target, "Returning existing short link");
            return Ok(Shortened {
                link: existing,
                created: false,
            });
        }

        let created_at = Utc::now();
        let expires_at = expires_in_days
            .map(|days| expiry_from(created_at, days))
            .transpose()?;

        let link = self
            .create_with_unique_code(target, created_at, expires_at)
            .await?;

        tracing::info!(code = %link.code, target = %link.target, "Short link created");
        metrics::counter!("shortlink_links_created_total").increment(1);

        Ok(Shortened {
            link,
            created: true,
        })
    }

    /// Decides where a code redirects to.
    ///
    /// For a live link a click is queued without waiting; a dropped click
    /// never affects the outcome. Expired links are left in storage.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] only on storage failure. Unknown, empty
    /// and expired codes are outcomes, not errors.
    pub async fn resolve(&self, code: &str) -> Result<RedirectOutcome, AppError> {
        if code.is_empty() {
            return Ok(RedirectOutcome::NotFound);
        }

        let Some(link) = self.link_repository.find_by_code(code).await? else {
            tracing::debug!(code, "Short code not found");
            metrics::counter!("shortlink_redirects_total", "outcome" => "not_found").increment(1);
            return Ok(RedirectOutcome::NotFound);
        };

        if link.is_expired() {
            tracing::debug!(code, expires_at = ?link.expires_at, "Short link expired");
            metrics::counter!("shortlink_redirects_total", "outcome" => "expired").increment(1);
            return Ok(RedirectOutcome::Expired);
        }

        self.click_tracker.track(ClickEvent::new(link.id, &link.code));
        metrics::counter!("shortlink_redirects_total", "outcome" => "found").increment(1);

        Ok(RedirectOutcome::Found(link.target))
    }

    /// Retrieves a link by its short code, expired or not.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches the code.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn get_link(&self, code: &str) -> Result<ShortLink, AppError> {
        self.link_repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "code": code })))
    }

    /// Builds the public short URL for a code.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url, code)
    }

    /// Checks that storage answers.
    pub async fn check_storage(&self) -> Result<(), AppError> {
        self.link_repository.ping().await
    }

    /// Click queue handle, exposed for health reporting.
    pub fn click_tracker(&self) -> &ClickTracker {
        &self.click_tracker
    }

    async fn create_with_unique_code(
        &self,
        target: String,
        created_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<ShortLink, AppError> {
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = self.code_generator.generate();

            if RESERVED_CODES.contains(&code.as_str()) {
                tracing::debug!(attempt, code = %code, "Generated code is reserved");
                continue;
            }

            if self.link_repository.find_by_code(&code).await?.is_some() {
                tracing::debug!(attempt, code = %code, "Generated code already taken");
                continue;
            }

            let new_link = NewShortLink {
                code,
                target: target.clone(),
                created_at,
                expires_at,
            };

            match self.link_repository.create(new_link).await {
                Ok(link) => return Ok(link),
                Err(AppError::Conflict { details, .. }) => {
                    tracing::warn!(attempt, details = %details, "Code collision on insert, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        tracing::error!(attempts = MAX_CODE_ATTEMPTS, target = %target, "Short code space exhausted");
        metrics::counter!("shortlink_code_exhausted_total").increment(1);

        Err(AppError::capacity(
            "Failed to generate unique code",
            json!({ "reason": "Too many collisions", "attempts": MAX_CODE_ATTEMPTS }),
        ))
    }
}

/// Computes `created_at + days * 24h`.
fn expiry_from(created_at: DateTime<Utc>, days: i64) -> Result<DateTime<Utc>, AppError> {
    TimeDelta::try_days(days)
        .and_then(|delta| created_at.checked_add_signed(delta))
        .ok_or_else(|| {
            AppError::bad_request(
                "expires_in_days is out of range",
                json!({ "expires_in_days": days }),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use crate::utils::code_generator::{ALPHABET, MockCodeGenerator, RandomCodeGenerator};
    use chrono::Duration;
    use mockall::Sequence;
    use mockall::predicate::eq;
    use tokio::sync::mpsc;

    const BASE_URL: &str = "https://sho.rt/";

    fn create_test_link(id: i64, code: &str, target: &str) -> ShortLink {
        ShortLink::new(id, code.to_string(), target.to_string(), Utc::now(), None, 0)
    }

    fn link_from(new_link: &NewShortLink, id: i64) -> ShortLink {
        ShortLink::new(
            id,
            new_link.code.clone(),
            new_link.target.clone(),
            new_link.created_at,
            new_link.expires_at,
            0,
        )
    }

    fn service_with(
        repo: MockLinkRepository,
        generator: Arc<dyn CodeGenerator>,
    ) -> (LinkService, mpsc::Receiver<ClickEvent>) {
        let (tx, rx) = mpsc::channel(16);
        let service = LinkService::new(Arc::new(repo), generator, ClickTracker::new(tx), BASE_URL);
        (service, rx)
    }

    fn scripted_generator(codes: &[&str]) -> Arc<dyn CodeGenerator> {
        let mut generator = MockCodeGenerator::new();
        let mut seq = Sequence::new();
        for code in codes {
            let code = code.to_string();
            generator
                .expect_generate()
                .times(1)
                .in_sequence(&mut seq)
                .returning(move || code.clone());
        }
        Arc::new(generator)
    }

    #[tokio::test]
    async fn test_shorten_creates_link_for_bare_host() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_target()
            .with(eq("https://example.com"))
            .times(1)
            .returning(|_| Ok(None));
        repo.expect_find_by_code().times(1).returning(|_| Ok(None));
        repo.expect_create()
            .withf(|l| l.target == "https://example.com" && l.code.len() == 6 && l.expires_at.is_none())
            .times(1)
            .returning(|l| Ok(link_from(&l, 1)));

        let (service, _rx) = service_with(repo, Arc::new(RandomCodeGenerator::default()));

        let shortened = service.shorten("example.com", None).await.unwrap();

        assert!(shortened.created);
        assert_eq!(shortened.link.target, "https://example.com");
        assert_eq!(shortened.link.clicks, 0);
        assert_eq!(shortened.link.code.len(), 6);
        assert!(shortened.link.code.bytes().all(|b| ALPHABET.contains(&b)));
    }

    #[tokio::test]
    async fn test_shorten_returns_existing_link_for_same_target() {
        let mut repo = MockLinkRepository::new();
        let existing = create_test_link(5, "abc123", "https://example.com");
        repo.expect_find_by_target()
            .with(eq("https://example.com"))
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_find_by_code().times(0);
        repo.expect_create().times(0);

        let mut generator = MockCodeGenerator::new();
        generator.expect_generate().times(0);

        let (service, _rx) = service_with(repo, Arc::new(generator));

        let shortened = service.shorten("https://example.com", None).await.unwrap();

        assert!(!shortened.created);
        assert_eq!(shortened.link.id, 5);
        assert_eq!(shortened.link.code, "abc123");
    }

    #[tokio::test]
    async fn test_shorten_rejects_empty_url() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_target().times(0);

        let (service, _rx) = service_with(repo, Arc::new(RandomCodeGenerator::default()));

        for raw in ["", "   "] {
            let err = service.shorten(raw, None).await.unwrap_err();
            assert!(matches!(err, AppError::Validation { .. }));
        }
    }

    #[tokio::test]
    async fn test_shorten_retries_once_on_lookup_collision() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_target().times(1).returning(|_| Ok(None));

        let taken = create_test_link(9, "taken1", "https://other.com");
        repo.expect_find_by_code()
            .with(eq("taken1"))
            .times(1)
            .returning(move |_| Ok(Some(taken.clone())));
        repo.expect_find_by_code()
            .with(eq("free22"))
            .times(1)
            .returning(|_| Ok(None));
        repo.expect_create()
            .withf(|l| l.code == "free22")
            .times(1)
            .returning(|l| Ok(link_from(&l, 10)));

        let (service, _rx) = service_with(repo, scripted_generator(&["taken1", "free22"]));

        let shortened = service.shorten("https://example.com", None).await.unwrap();
        assert_eq!(shortened.link.code, "free22");
    }

    #[tokio::test]
    async fn test_shorten_retries_on_insert_conflict() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_target().times(1).returning(|_| Ok(None));
        repo.expect_find_by_code().times(2).returning(|_| Ok(None));

        let mut seq = Sequence::new();
        repo.expect_create()
            .withf(|l| l.code == "raced1")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|l| Err(AppError::conflict("Short code already exists", json!({ "code": l.code }))));
        repo.expect_create()
            .withf(|l| l.code == "fresh2")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|l| Ok(link_from(&l, 11)));

        let (service, _rx) = service_with(repo, scripted_generator(&["raced1", "fresh2"]));

        let shortened = service.shorten("example.com/page", None).await.unwrap();
        assert_eq!(shortened.link.code, "fresh2");
        assert_eq!(shortened.link.target, "https://example.com/page");
    }

    #[tokio::test]
    async fn test_shorten_fails_with_capacity_error_after_retry_budget() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_target().times(1).returning(|_| Ok(None));
        repo.expect_find_by_code()
            .times(MAX_CODE_ATTEMPTS)
            .returning(|code| Ok(Some(create_test_link(1, code, "https://taken.com"))));
        repo.expect_create().times(0);

        let mut generator = MockCodeGenerator::new();
        generator
            .expect_generate()
            .times(MAX_CODE_ATTEMPTS)
            .returning(|| "same00".to_string());

        let (service, _rx) = service_with(repo, Arc::new(generator));

        let err = service.shorten("example.com", None).await.unwrap_err();
        assert!(matches!(err, AppError::Capacity { .. }));
    }

    #[tokio::test]
    async fn test_shorten_does_not_retry_storage_failure() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_target().times(1).returning(|_| Ok(None));
        repo.expect_find_by_code().times(1).returning(|_| Ok(None));
        repo.expect_create()
            .times(1)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let (service, _rx) = service_with(repo, Arc::new(RandomCodeGenerator::default()));

        let err = service.shorten("example.com", None).await.unwrap_err();
        assert!(matches!(err, AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_shorten_propagates_lookup_failure() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_target()
            .times(1)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));
        repo.expect_create().times(0);

        let (service, _rx) = service_with(repo, Arc::new(RandomCodeGenerator::default()));

        let err = service.shorten("example.com", None).await.unwrap_err();
        assert!(matches!(err, AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_shorten_sets_expiry_from_days() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_target().times(1).returning(|_| Ok(None));
        repo.expect_find_by_code().times(1).returning(|_| Ok(None));
        repo.expect_create()
            .withf(|l| l.expires_at == Some(l.created_at + Duration::days(7)))
            .times(1)
            .returning(|l| Ok(link_from(&l, 3)));

        let (service, _rx) = service_with(repo, Arc::new(RandomCodeGenerator::default()));

        let shortened = service.shorten("example.com", Some(7)).await.unwrap();
        assert!(shortened.link.expires_at.is_some());
        assert!(!shortened.link.is_expired());
    }

    #[tokio::test]
    async fn test_shorten_existing_target_ignores_requested_expiry() {
        let mut repo = MockLinkRepository::new();
        let existing = create_test_link(5, "abc123", "https://example.com");
        repo.expect_find_by_target()
            .times(3)
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_create().times(0);

        let (service, _rx) = service_with(repo, Arc::new(RandomCodeGenerator::default()));

        for days in [0, -3, i64::MAX] {
            let shortened = service.shorten("example.com", Some(days)).await.unwrap();
            assert!(!shortened.created);
            assert_eq!(shortened.link.code, "abc123");
            assert!(shortened.link.expires_at.is_none());
        }
    }

    #[tokio::test]
    async fn test_shorten_zero_days_creates_expired_link() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_target().times(1).returning(|_| Ok(None));
        repo.expect_find_by_code().times(1).returning(|_| Ok(None));
        repo.expect_create()
            .withf(|l| l.expires_at == Some(l.created_at))
            .times(1)
            .returning(|l| Ok(link_from(&l, 4)));

        let (service, _rx) = service_with(repo, Arc::new(RandomCodeGenerator::default()));

        let shortened = service.shorten("example.com", Some(0)).await.unwrap();
        assert!(shortened.created);
    }

    #[tokio::test]
    async fn test_shorten_rejects_unrepresentable_expiry() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_target().times(2).returning(|_| Ok(None));
        repo.expect_create().times(0);

        let (service, _rx) = service_with(repo, Arc::new(RandomCodeGenerator::default()));

        for days in [i64::MAX, i64::MIN] {
            let err = service.shorten("example.com", Some(days)).await.unwrap_err();
            assert!(matches!(err, AppError::Validation { .. }));
        }
    }

    #[tokio::test]
    async fn test_shorten_keeps_surrounding_whitespace() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_target()
            .with(eq("https://  example.com"))
            .times(1)
            .returning(|_| Ok(None));
        repo.expect_find_by_code().times(1).returning(|_| Ok(None));
        repo.expect_create()
            .withf(|l| l.target == "https://  example.com")
            .times(1)
            .returning(|l| Ok(link_from(&l, 6)));

        let (service, _rx) = service_with(repo, Arc::new(RandomCodeGenerator::default()));

        let shortened = service.shorten("  example.com", None).await.unwrap();
        assert_eq!(shortened.link.target, "https://  example.com");
    }

    #[tokio::test]
    async fn test_shorten_skips_reserved_code() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_target().times(1).returning(|_| Ok(None));
        repo.expect_find_by_code().with(eq("health")).times(0);
        repo.expect_find_by_code()
            .with(eq("free22"))
            .times(1)
            .returning(|_| Ok(None));
        repo.expect_create()
            .withf(|l| l.code == "free22")
            .times(1)
            .returning(|l| Ok(link_from(&l, 7)));

        let (service, _rx) = service_with(repo, scripted_generator(&["health", "free22"]));

        let shortened = service.shorten("example.com", None).await.unwrap();
        assert_eq!(shortened.link.code, "free22");
    }

    #[tokio::test]
    async fn test_resolve_empty_code_skips_storage() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_code().times(0);

        let (service, _rx) = service_with(repo, Arc::new(RandomCodeGenerator::default()));

        assert_eq!(service.resolve("").await.unwrap(), RedirectOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_resolve_unknown_code() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_code().times(1).returning(|_| Ok(None));

        let (service, mut rx) = service_with(repo, Arc::new(RandomCodeGenerator::default()));

        assert_eq!(service.resolve("nope00").await.unwrap(), RedirectOutcome::NotFound);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_resolve_live_link_queues_click() {
        let mut repo = MockLinkRepository::new();
        let link = create_test_link(42, "abc123", "https://example.com");
        repo.expect_find_by_code()
            .with(eq("abc123"))
            .times(1)
            .returning(move |_| Ok(Some(link.clone())));

        let (service, mut rx) = service_with(repo, Arc::new(RandomCodeGenerator::default()));

        let outcome = service.resolve("abc123").await.unwrap();

        assert_eq!(outcome, RedirectOutcome::Found("https://example.com".to_string()));
        assert_eq!(rx.try_recv().unwrap(), ClickEvent::new(42, "abc123"));
    }

    #[tokio::test]
    async fn test_resolve_future_expiry_is_found() {
        let mut repo = MockLinkRepository::new();
        let mut link = create_test_link(1, "later1", "https://example.com");
        link.expires_at = Some(Utc::now() + Duration::hours(1));
        repo.expect_find_by_code()
            .times(1)
            .returning(move |_| Ok(Some(link.clone())));

        let (service, _rx) = service_with(repo, Arc::new(RandomCodeGenerator::default()));

        assert!(matches!(
            service.resolve("later1").await.unwrap(),
            RedirectOutcome::Found(_)
        ));
    }

    #[tokio::test]
    async fn test_resolve_expired_link() {
        let mut repo = MockLinkRepository::new();
        let mut link = create_test_link(1, "old123", "https://example.com");
        link.expires_at = Some(Utc::now() - Duration::hours(1));
        repo.expect_find_by_code()
            .times(1)
            .returning(move |_| Ok(Some(link.clone())));
        repo.expect_increment_clicks().times(0);

        let (service, mut rx) = service_with(repo, Arc::new(RandomCodeGenerator::default()));

        assert_eq!(service.resolve("old123").await.unwrap(), RedirectOutcome::Expired);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_resolve_succeeds_when_click_queue_closed() {
        let mut repo = MockLinkRepository::new();
        let link = create_test_link(1, "abc123", "https://example.com");
        repo.expect_find_by_code()
            .times(1)
            .returning(move |_| Ok(Some(link.clone())));

        let (service, rx) = service_with(repo, Arc::new(RandomCodeGenerator::default()));
        drop(rx);

        assert_eq!(
            service.resolve("abc123").await.unwrap(),
            RedirectOutcome::Found("https://example.com".to_string())
        );
    }

    #[tokio::test]
    async fn test_resolve_propagates_storage_failure() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_code()
            .times(1)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let (service, _rx) = service_with(repo, Arc::new(RandomCodeGenerator::default()));

        assert!(matches!(
            service.resolve("abc123").await.unwrap_err(),
            AppError::Internal { .. }
        ));
    }

    #[tokio::test]
    async fn test_get_link_not_found() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_code().times(1).returning(|_| Ok(None));

        let (service, _rx) = service_with(repo, Arc::new(RandomCodeGenerator::default()));

        assert!(matches!(
            service.get_link("nope00").await.unwrap_err(),
            AppError::NotFound { .. }
        ));
    }

    #[test]
    fn test_short_url_trims_trailing_slash() {
        let (service, _rx) = service_with(
            MockLinkRepository::new(),
            Arc::new(RandomCodeGenerator::default()),
        );
        assert_eq!(service.short_url("abc123"), "https://sho.rt/abc123");
    }
}
