//! Database access for the store directory.
//!
//! # Schema: `nagoyameshi`
//!
//! - `category` - Cuisine/venue categories
//! - `store` - Restaurants shown in the directory
//! - `store_category` - Many-to-many link between stores and categories
//! - `member` - Registered members with argon2 password hashes
//! - `review` - Member reviews, listed newest first per store
//! - `favorite` - Insert-only (member, store) pairs
//! - `tower_sessions.session` - Session storage
//!
//! Each table is reached through an `async_trait` repository port so the
//! services can run against `PostgreSQL` in production and in-memory fakes in
//! tests.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/web/migrations/` and run via:
//! ```bash
//! cargo run -p nagoyameshi-cli -- migrate
//! ```

pub mod categories;
pub mod favorites;
pub mod members;
pub mod reviews;
pub mod stores;

use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use categories::{CategoryRepository, PgCategoryRepository};
pub use favorites::{FavoriteRepository, PgFavoriteRepository};
pub use members::{MemberRepository, PgMemberRepository};
pub use reviews::{PgReviewRepository, ReviewRepository};
pub use stores::{PgStoreRepository, StoreRepository};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique-constraint violation to `Conflict`, anything else to `Database`.
    pub(crate) fn from_insert(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(format!("{what} already exists"));
        }
        Self::Database(err)
    }
}

/// Every repository the application uses, behind shared trait objects.
#[derive(Clone)]
pub struct Repositories {
    pub stores: Arc<dyn StoreRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub favorites: Arc<dyn FavoriteRepository>,
    pub members: Arc<dyn MemberRepository>,
}

impl Repositories {
    /// `PostgreSQL`-backed repositories sharing one pool.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            stores: Arc::new(PgStoreRepository::new(pool.clone())),
            categories: Arc::new(PgCategoryRepository::new(pool.clone())),
            reviews: Arc::new(PgReviewRepository::new(pool.clone())),
            favorites: Arc::new(PgFavoriteRepository::new(pool.clone())),
            members: Arc::new(PgMemberRepository::new(pool.clone())),
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Build a `LIKE` pattern matching `needle` anywhere in a column.
///
/// `\`, `%` and `_` are escaped so user input only ever matches literally.
#[must_use]
pub fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
