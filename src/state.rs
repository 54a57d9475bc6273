//! Shared application state injected into handlers.

use std::sync::Arc;

use crate::application::services::{AuthService, LinkService};

/// Services shared by every request handler.
///
/// Cloning is cheap; all members are reference counted.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub auth_service: Arc<AuthService>,
}

impl AppState {
    pub fn new(link_service: Arc<LinkService>, auth_service: Arc<AuthService>) -> Self {
        Self {
            link_service,
            auth_service,
        }
    }
}
