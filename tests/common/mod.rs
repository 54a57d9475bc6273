#![allow(dead_code)]

use async_trait::async_trait;
use axum::{Router, extract::ConnectInfo};
use chrono::{DateTime, TimeDelta, Utc};
use serde_json::json;
use shortlink::application::services::{AuthService, LinkService};
use shortlink::domain::click_event::{ClickEvent, ClickTracker};
use shortlink::domain::entities::{NewShortLink, NewUser, ShortLink, User};
use shortlink::domain::repositories::{LinkRepository, UserRepository};
use shortlink::error::AppError;
use shortlink::routes::build_router;
use shortlink::state::AppState;
use shortlink::utils::code_generator::RandomCodeGenerator;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tower::Layer;

pub const BASE_URL: &str = "https://sho.rt";
pub const SIGNING_SECRET: &str = "test-signing-secret";

/// Link storage kept in memory, enforcing code uniqueness like the real table.
#[derive(Default)]
pub struct InMemoryLinkRepository {
    links: Mutex<Vec<ShortLink>>,
}

impl InMemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a link directly, bypassing the service.
    pub fn insert(&self, code: &str, target: &str, expires_at: Option<DateTime<Utc>>) -> ShortLink {
        let mut links = self.links.lock().unwrap();
        let link = ShortLink::new(
            links.len() as i64 + 1,
            code.to_string(),
            target.to_string(),
            Utc::now(),
            expires_at,
            0,
        );
        links.push(link.clone());
        link
    }

    pub fn clicks(&self, code: &str) -> Option<i64> {
        self.links
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.code == code)
            .map(|l| l.clicks)
    }

    pub fn count(&self) -> usize {
        self.links.lock().unwrap().len()
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        let mut links = self.links.lock().unwrap();

        if links.iter().any(|l| l.code == new_link.code) {
            return Err(AppError::conflict(
                "Short code already exists",
                json!({ "code": new_link.code }),
            ));
        }

        let link = ShortLink::new(
            links.len() as i64 + 1,
            new_link.code,
            new_link.target,
            new_link.created_at,
            new_link.expires_at,
            0,
        );
        links.push(link.clone());
        Ok(link)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError> {
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.code == code)
            .cloned())
    }

    async fn find_by_target(&self, target: &str) -> Result<Option<ShortLink>, AppError> {
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.target == target)
            .cloned())
    }

    async fn increment_clicks(&self, id: i64) -> Result<bool, AppError> {
        let mut links = self.links.lock().unwrap();
        match links.iter_mut().find(|l| l.id == id) {
            Some(link) => {
                link.clicks += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// Link storage whose every call fails, standing in for a lost database.
pub struct FailingLinkRepository;

#[async_trait]
impl LinkRepository for FailingLinkRepository {
    async fn create(&self, _new_link: NewShortLink) -> Result<ShortLink, AppError> {
        Err(AppError::internal("Database error", json!({})))
    }

    async fn find_by_code(&self, _code: &str) -> Result<Option<ShortLink>, AppError> {
        Err(AppError::internal("Database error", json!({})))
    }

    async fn find_by_target(&self, _target: &str) -> Result<Option<ShortLink>, AppError> {
        Err(AppError::internal("Database error", json!({})))
    }

    async fn increment_clicks(&self, _id: i64) -> Result<bool, AppError> {
        Err(AppError::internal("Database error", json!({})))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Err(AppError::internal("Database error", json!({})))
    }
}

/// User storage kept in memory, enforcing user ID uniqueness.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();

        if users.iter().any(|u| u.user_id == new_user.user_id) {
            return Err(AppError::conflict(
                "User ID already exists",
                json!({ "user_id": new_user.user_id }),
            ));
        }

        let now = Utc::now();
        let user = User {
            id: users.len() as i64 + 1,
            user_id: new_user.user_id,
            password_hash: new_user.password_hash,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.user_id == user_id)
            .cloned())
    }

    async fn exists(&self, user_id: &str) -> Result<bool, AppError> {
        Ok(self.users.lock().unwrap().iter().any(|u| u.user_id == user_id))
    }
}

/// Builds application state over the given repositories.
///
/// Returns the receiving end of the click queue; drop it to simulate a
/// stopped worker, or hand it to `run_click_worker`.
pub fn create_test_state(
    link_repository: Arc<dyn LinkRepository>,
) -> (AppState, mpsc::Receiver<ClickEvent>) {
    let (tx, rx) = mpsc::channel(100);

    let link_service = Arc::new(LinkService::new(
        link_repository,
        Arc::new(RandomCodeGenerator::default()),
        ClickTracker::new(tx),
        format!("{BASE_URL}/"),
    ));

    let auth_service = Arc::new(
        AuthService::new(
            Arc::new(InMemoryUserRepository::new()),
            SIGNING_SECRET.to_string(),
            TimeDelta::hours(24),
        )
        .with_password_cost(4),
    );

    (AppState::new(link_service, auth_service), rx)
}

/// Full application router with a fake peer address for the rate limiter.
pub fn test_app(state: AppState) -> Router {
    build_router(state, None).layer(MockConnectInfoLayer)
}

/// Inserts a fixed `ConnectInfo` so per-IP rate limiting can key requests.
#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}
