//! Review repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use nagoyameshi_core::{MemberId, ReviewId, StoreId};

use super::RepositoryError;
use crate::models::Review;

/// Read access to store reviews.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Reviews for `store_id`, newest first. Equal timestamps fall back to
    /// descending review id.
    async fn find_by_store_newest_first(
        &self,
        store_id: StoreId,
    ) -> Result<Vec<Review>, RepositoryError>;
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: i32,
    store_id: i32,
    member_id: i32,
    author_name: String,
    body: String,
    created_at: DateTime<Utc>,
}

/// `PostgreSQL` implementation of [`ReviewRepository`].
#[derive(Clone)]
pub struct PgReviewRepository {
    pool: PgPool,
}

impl PgReviewRepository {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewRepository for PgReviewRepository {
    async fn find_by_store_newest_first(
        &self,
        store_id: StoreId,
    ) -> Result<Vec<Review>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            r"
            SELECT r.id, r.store_id, r.member_id, m.name AS author_name,
                   r.body, r.created_at
            FROM nagoyameshi.review r
            JOIN nagoyameshi.member m ON m.id = r.member_id
            WHERE r.store_id = $1
            ORDER BY r.created_at DESC, r.id DESC
            ",
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Review {
                id: ReviewId::new(r.id),
                store_id: StoreId::new(r.store_id),
                author_id: MemberId::new(r.member_id),
                author_name: r.author_name,
                body: r.body,
                created_at: r.created_at,
            })
            .collect())
    }
}
