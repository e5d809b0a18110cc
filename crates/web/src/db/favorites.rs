//! Favorite repository.
//!
//! Favorites are insert-only with no unique constraint on (member, store):
//! inserting the same pair twice yields two rows.

use async_trait::async_trait;
use sqlx::PgPool;

use nagoyameshi_core::{FavoriteId, MemberId, StoreId};

use super::RepositoryError;
use crate::models::Favorite;

/// Persistence for (member, store) favorites.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    /// Insert a new favorite and return it with its assigned id.
    async fn insert(
        &self,
        member_id: MemberId,
        store_id: StoreId,
    ) -> Result<Favorite, RepositoryError>;

    /// All favorites of a member, ordered by favorite id.
    async fn find_by_member(&self, member_id: MemberId) -> Result<Vec<Favorite>, RepositoryError>;

    /// Favorites of a member for one store, ordered by favorite id.
    async fn find_by_member_and_store(
        &self,
        member_id: MemberId,
        store_id: StoreId,
    ) -> Result<Vec<Favorite>, RepositoryError>;
}

#[derive(sqlx::FromRow)]
struct FavoriteRow {
    id: i32,
    member_id: i32,
    store_id: i32,
}

impl From<FavoriteRow> for Favorite {
    fn from(row: FavoriteRow) -> Self {
        Self {
            id: FavoriteId::new(row.id),
            member_id: MemberId::new(row.member_id),
            store_id: StoreId::new(row.store_id),
        }
    }
}

/// `PostgreSQL` implementation of [`FavoriteRepository`].
#[derive(Clone)]
pub struct PgFavoriteRepository {
    pool: PgPool,
}

impl PgFavoriteRepository {
    /// Create a new favorite repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FavoriteRepository for PgFavoriteRepository {
    async fn insert(
        &self,
        member_id: MemberId,
        store_id: StoreId,
    ) -> Result<Favorite, RepositoryError> {
        let row = sqlx::query_as::<_, FavoriteRow>(
            r"
            INSERT INTO nagoyameshi.favorite (member_id, store_id)
            VALUES ($1, $2)
            RETURNING id, member_id, store_id
            ",
        )
        .bind(member_id)
        .bind(store_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_by_member(&self, member_id: MemberId) -> Result<Vec<Favorite>, RepositoryError> {
        let rows = sqlx::query_as::<_, FavoriteRow>(
            r"
            SELECT id, member_id, store_id
            FROM nagoyameshi.favorite
            WHERE member_id = $1
            ORDER BY id
            ",
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Favorite::from).collect())
    }

    async fn find_by_member_and_store(
        &self,
        member_id: MemberId,
        store_id: StoreId,
    ) -> Result<Vec<Favorite>, RepositoryError> {
        let rows = sqlx::query_as::<_, FavoriteRow>(
            r"
            SELECT id, member_id, store_id
            FROM nagoyameshi.favorite
            WHERE member_id = $1 AND store_id = $2
            ORDER BY id
            ",
        )
        .bind(member_id)
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Favorite::from).collect())
    }
}
