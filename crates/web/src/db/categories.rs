//! Category repository.

use async_trait::async_trait;
use sqlx::PgPool;

use nagoyameshi_core::CategoryId;

use super::RepositoryError;
use crate::models::Category;

/// Read access to the category list shown as listing filters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Every category, ordered by id.
    async fn find_all(&self) -> Result<Vec<Category>, RepositoryError>;
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: i32,
    name: String,
}

/// `PostgreSQL` implementation of [`CategoryRepository`].
#[derive(Clone)]
pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn find_all(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name FROM nagoyameshi.category ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Category {
                id: CategoryId::new(r.id),
                name: r.name,
            })
            .collect())
    }
}
