//! Favorite service.

use std::sync::Arc;

use nagoyameshi_core::{MemberId, StoreId};

use crate::db::{FavoriteRepository, RepositoryError};
use crate::models::Favorite;

/// Operations on members' saved stores.
#[derive(Clone)]
pub struct FavoriteService {
    favorites: Arc<dyn FavoriteRepository>,
}

impl FavoriteService {
    /// Create a new favorite service.
    #[must_use]
    pub fn new(favorites: Arc<dyn FavoriteRepository>) -> Self {
        Self { favorites }
    }

    /// Save `store_id` for `member_id`. Always inserts a new row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the insert fails.
    pub async fn add_favorite(
        &self,
        member_id: MemberId,
        store_id: StoreId,
    ) -> Result<Favorite, RepositoryError> {
        self.favorites.insert(member_id, store_id).await
    }

    /// Every favorite of `member_id`, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn favorites_by_member(
        &self,
        member_id: MemberId,
    ) -> Result<Vec<Favorite>, RepositoryError> {
        self.favorites.find_by_member(member_id).await
    }

    /// Favorites of `member_id` for `store_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn favorites_by_member_and_store(
        &self,
        member_id: MemberId,
        store_id: StoreId,
    ) -> Result<Vec<Favorite>, RepositoryError> {
        self.favorites
            .find_by_member_and_store(member_id, store_id)
            .await
    }

    /// Whether `member_id` has saved `store_id` at least once.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn has_favorited(
        &self,
        member_id: MemberId,
        store_id: StoreId,
    ) -> Result<bool, RepositoryError> {
        let favorites = self
            .favorites_by_member_and_store(member_id, store_id)
            .await?;
        Ok(!favorites.is_empty())
    }
}
