//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::WebConfig;
use crate::db::Repositories;
use crate::services::{AuthService, StoreDirectoryService};

/// Application state shared across all handlers.
///
/// Cheaply cloneable; everything lives behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebConfig,
    repositories: Repositories,
    directory: StoreDirectoryService,
    auth: AuthService,
}

impl AppState {
    /// Wire the services over `repositories`.
    #[must_use]
    pub fn new(config: WebConfig, repositories: Repositories) -> Self {
        let directory = StoreDirectoryService::from_repositories(&repositories);
        let auth = AuthService::new(Arc::clone(&repositories.members));

        Self {
            inner: Arc::new(AppStateInner {
                config,
                repositories,
                directory,
                auth,
            }),
        }
    }

    /// Get a reference to the web configuration.
    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.inner.config
    }

    /// Get the repository bundle.
    #[must_use]
    pub fn repositories(&self) -> &Repositories {
        &self.inner.repositories
    }

    /// Get the store directory service.
    #[must_use]
    pub fn directory(&self) -> &StoreDirectoryService {
        &self.inner.directory
    }

    /// Get the authentication service.
    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }
}
