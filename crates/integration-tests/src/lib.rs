//! Integration test support for Nagoyameshi.
//!
//! Provides in-memory implementations of every repository port and a
//! [`TestApp`] that serves the real router over them with a
//! `tower_sessions::MemoryStore`, so tests exercise the full HTTP stack
//! without `PostgreSQL`.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p nagoyameshi-integration-tests
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{Router, body::Body, http::Request, response::Response};
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use tokio::sync::RwLock;
use tower::ServiceExt;
use tower_sessions::MemoryStore;
use url::Url;

use nagoyameshi_core::{
    CategoryId, Email, FavoriteId, MemberId, Page, PageRequest, ReviewId, StoreId,
};
use nagoyameshi_web::config::{LogFormat, SentryConfig, WebConfig};
use nagoyameshi_web::db::{
    CategoryRepository, FavoriteRepository, MemberRepository, Repositories, RepositoryError,
    ReviewRepository, StoreRepository,
};
use nagoyameshi_web::middleware::create_session_layer;
use nagoyameshi_web::models::{
    Category, Favorite, Member, Review, Store, StoreFilter, StoreSort, StoreSortField,
};
use nagoyameshi_web::services::auth::hash_password;
use nagoyameshi_web::state::AppState;

// =============================================================================
// In-memory repositories
// =============================================================================

#[derive(Default)]
struct Tables {
    categories: Vec<Category>,
    stores: Vec<Store>,
    members: Vec<(Member, String)>,
    reviews: Vec<Review>,
    favorites: Vec<Favorite>,
}

/// Every repository port backed by one set of in-memory tables.
#[derive(Default)]
pub struct InMemoryDirectory {
    tables: RwLock<Tables>,
}

fn next_id(len: usize) -> i32 {
    i32::try_from(len + 1).unwrap_or(i32::MAX)
}

impl InMemoryDirectory {
    /// Empty tables.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Bundle this directory as the application's repositories.
    #[must_use]
    pub fn repositories(self: &Arc<Self>) -> Repositories {
        Repositories {
            stores: Arc::clone(self) as Arc<dyn StoreRepository>,
            categories: Arc::clone(self) as Arc<dyn CategoryRepository>,
            reviews: Arc::clone(self) as Arc<dyn ReviewRepository>,
            favorites: Arc::clone(self) as Arc<dyn FavoriteRepository>,
            members: Arc::clone(self) as Arc<dyn MemberRepository>,
        }
    }

    /// Add a category and return its id.
    pub async fn add_category(&self, name: &str) -> CategoryId {
        let mut tables = self.tables.write().await;
        let id = CategoryId::new(next_id(tables.categories.len()));
        tables.categories.push(Category {
            id,
            name: name.to_owned(),
        });
        id
    }

    /// Add a store linked to `categories` and return its id.
    pub async fn add_store(&self, name: &str, address: &str, categories: &[CategoryId]) -> StoreId {
        let mut tables = self.tables.write().await;
        let id = StoreId::new(next_id(tables.stores.len()));
        let linked = tables
            .categories
            .iter()
            .filter(|c| categories.contains(&c.id))
            .cloned()
            .collect();
        tables.stores.push(Store {
            id,
            name: name.to_owned(),
            address: address.to_owned(),
            categories: linked,
        });
        id
    }

    /// Add a member whose password is `password`.
    ///
    /// # Panics
    ///
    /// Panics if `email` is invalid or hashing fails.
    #[allow(clippy::expect_used)]
    pub async fn add_member(&self, name: &str, email: &str, password: &str) -> MemberId {
        let email = Email::parse(email).expect("valid test email");
        let hash = hash_password(password).expect("hash test password");
        self.create(name, &email, &hash)
            .await
            .expect("insert test member")
            .id
    }

    /// Add a review written at `created_at`.
    pub async fn add_review(
        &self,
        store_id: StoreId,
        author: MemberId,
        body: &str,
        created_at: DateTime<Utc>,
    ) -> ReviewId {
        let mut tables = self.tables.write().await;
        let id = ReviewId::new(next_id(tables.reviews.len()));
        let author_name = tables
            .members
            .iter()
            .find(|(m, _)| m.id == author)
            .map(|(m, _)| m.name.clone())
            .unwrap_or_default();
        tables.reviews.push(Review {
            id,
            store_id,
            author_id: author,
            author_name,
            body: body.to_owned(),
            created_at,
        });
        id
    }

    /// Number of favorite rows, across all members.
    pub async fn favorite_count(&self) -> usize {
        self.tables.read().await.favorites.len()
    }
}

fn compare(a: &Store, b: &Store, sort: StoreSort) -> std::cmp::Ordering {
    let primary = match sort.field {
        StoreSortField::Id => a.id.cmp(&b.id),
        StoreSortField::Name => a.name.cmp(&b.name),
        StoreSortField::Address => a.address.cmp(&b.address),
    };
    let primary = match sort.direction {
        nagoyameshi_core::Direction::Asc => primary,
        nagoyameshi_core::Direction::Desc => primary.reverse(),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl StoreRepository for InMemoryDirectory {
    async fn find_page(
        &self,
        filter: &StoreFilter,
        sort: StoreSort,
        page: PageRequest,
    ) -> Result<Page<Store>, RepositoryError> {
        let tables = self.tables.read().await;
        let mut matching: Vec<Store> = tables
            .stores
            .iter()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| compare(a, b, sort));

        let total = u64::try_from(matching.len()).unwrap_or(u64::MAX);
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
        let content = matching.into_iter().skip(offset).take(limit).collect();

        Ok(Page::new(content, page, total))
    }

    async fn find_by_id(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.stores.iter().find(|s| s.id == id).cloned())
    }

    async fn find_names(
        &self,
        ids: &[StoreId],
    ) -> Result<HashMap<StoreId, String>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .stores
            .iter()
            .filter(|s| ids.contains(&s.id))
            .map(|s| (s.id, s.name.clone()))
            .collect())
    }

    async fn exists(&self, id: StoreId) -> Result<bool, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.stores.iter().any(|s| s.id == id))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryDirectory {
    async fn find_all(&self) -> Result<Vec<Category>, RepositoryError> {
        Ok(self.tables.read().await.categories.clone())
    }
}

#[async_trait]
impl ReviewRepository for InMemoryDirectory {
    async fn find_by_store_newest_first(
        &self,
        store_id: StoreId,
    ) -> Result<Vec<Review>, RepositoryError> {
        let tables = self.tables.read().await;
        let mut reviews: Vec<Review> = tables
            .reviews
            .iter()
            .filter(|r| r.store_id == store_id)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(reviews)
    }
}

#[async_trait]
impl FavoriteRepository for InMemoryDirectory {
    async fn insert(
        &self,
        member_id: MemberId,
        store_id: StoreId,
    ) -> Result<Favorite, RepositoryError> {
        let mut tables = self.tables.write().await;
        let favorite = Favorite {
            id: FavoriteId::new(next_id(tables.favorites.len())),
            member_id,
            store_id,
        };
        tables.favorites.push(favorite.clone());
        Ok(favorite)
    }

    async fn find_by_member(&self, member_id: MemberId) -> Result<Vec<Favorite>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .favorites
            .iter()
            .filter(|f| f.member_id == member_id)
            .cloned()
            .collect())
    }

    async fn find_by_member_and_store(
        &self,
        member_id: MemberId,
        store_id: StoreId,
    ) -> Result<Vec<Favorite>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .favorites
            .iter()
            .filter(|f| f.member_id == member_id && f.store_id == store_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl MemberRepository for InMemoryDirectory {
    async fn find_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(Member, String)>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.members.iter().find(|(m, _)| &m.email == email).cloned())
    }

    async fn create(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
    ) -> Result<Member, RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.members.iter().any(|(m, _)| &m.email == email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }
        let member = Member {
            id: MemberId::new(next_id(tables.members.len())),
            name: name.to_owned(),
            email: email.clone(),
            created_at: Utc::now(),
        };
        tables.members.push((member.clone(), password_hash.to_owned()));
        Ok(member)
    }
}

// =============================================================================
// Application harness
// =============================================================================

/// Configuration suitable for tests: plain HTTP, no Sentry.
///
/// # Panics
///
/// Panics if the hard-coded URLs fail to parse.
#[must_use]
#[allow(clippy::expect_used)]
pub fn test_config() -> WebConfig {
    WebConfig {
        database_url: SecretString::from("postgres://localhost/nagoyameshi_test"),
        host: "127.0.0.1".parse().expect("valid test host"),
        port: 8080,
        base_url: Url::parse("http://localhost:8080").expect("valid test base url"),
        session_secret: SecretString::from(
            "q8Vf2LmZ7xRt4KpN9wYc3HbJ6sDg1EaUo5iTrQvXkMnBz0WlCy8PhGjFdSaE2uIx",
        ),
        log_format: LogFormat::Text,
        sentry: SentryConfig::default(),
    }
}

/// The full router over an [`InMemoryDirectory`].
pub struct TestApp {
    pub directory: Arc<InMemoryDirectory>,
    router: Router,
}

impl TestApp {
    /// Build the application over empty in-memory tables.
    ///
    /// # Panics
    ///
    /// Panics if the session layer cannot be built from the test secret.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        let directory = InMemoryDirectory::new();
        let config = test_config();
        let session_layer = create_session_layer(MemoryStore::default(), &config)
            .expect("test session layer");
        let state = AppState::new(config, directory.repositories());

        Self {
            router: nagoyameshi_web::app(state, session_layer),
            directory,
        }
    }

    /// Send one request through the router.
    ///
    /// # Panics
    ///
    /// Panics if the router itself fails, which axum routers never do.
    #[allow(clippy::expect_used)]
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
