//! Store directory service.
//!
//! The façade behind the `/storeinfo` routes. It picks a single listing
//! filter, assembles store detail pages with reviews and favorite state, and
//! records favorites for the caller.
//!
//! The caller's identity is always passed in explicitly as
//! `Option<MemberId>`; operations that need a member fail with
//! [`DirectoryError::Unauthenticated`] rather than reading ambient state.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::instrument;

use nagoyameshi_core::{CategoryId, MemberId, Page, PageRequest, StoreId};

use super::{FavoriteService, ReviewService};
use crate::db::{CategoryRepository, Repositories, RepositoryError, StoreRepository};
use crate::models::{Category, Favorite, Review, Store, StoreFilter, StoreSort};

/// Errors surfaced by [`StoreDirectoryService`].
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The referenced store does not exist.
    #[error("store {0} not found")]
    NotFound(StoreId),

    /// The operation needs a logged-in member.
    #[error("authentication required")]
    Unauthenticated,

    /// Persistence failure, passed through unchanged.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Parameters of a store listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreQuery {
    pub keyword: Option<String>,
    pub area: Option<String>,
    pub category: Option<CategoryId>,
    pub page: PageRequest,
    pub sort: StoreSort,
}

impl StoreQuery {
    /// The one filter this query resolves to (keyword, then area, then category).
    #[must_use]
    pub fn filter(&self) -> StoreFilter {
        StoreFilter::select(self.keyword.as_deref(), self.area.as_deref(), self.category)
    }
}

/// Result of [`StoreDirectoryService::list_stores`].
#[derive(Debug, Clone)]
pub struct StoreListing {
    /// The requested page of matching stores.
    pub stores: Page<Store>,
    /// Every category, for rendering filter options.
    pub categories: Vec<Category>,
}

/// Result of [`StoreDirectoryService::get_store_detail`].
#[derive(Debug, Clone)]
pub struct StoreDetail {
    pub store: Store,
    /// Newest first.
    pub reviews: Vec<Review>,
    /// Whether the caller has saved this store. Always `false` for anonymous
    /// callers.
    pub has_favorited: bool,
}

/// Store listing, detail and favorite operations.
#[derive(Clone)]
pub struct StoreDirectoryService {
    stores: Arc<dyn StoreRepository>,
    categories: Arc<dyn CategoryRepository>,
    favorites: FavoriteService,
    reviews: ReviewService,
}

impl StoreDirectoryService {
    /// Create a directory service from its collaborators.
    #[must_use]
    pub fn new(
        stores: Arc<dyn StoreRepository>,
        categories: Arc<dyn CategoryRepository>,
        favorites: FavoriteService,
        reviews: ReviewService,
    ) -> Self {
        Self {
            stores,
            categories,
            favorites,
            reviews,
        }
    }

    /// Create a directory service over a repository bundle.
    #[must_use]
    pub fn from_repositories(repositories: &Repositories) -> Self {
        Self::new(
            Arc::clone(&repositories.stores),
            Arc::clone(&repositories.categories),
            FavoriteService::new(Arc::clone(&repositories.favorites)),
            ReviewService::new(Arc::clone(&repositories.reviews)),
        )
    }

    /// List one page of stores plus the full category list.
    ///
    /// Only one filter applies: keyword, else area, else category, else none.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Repository` if a query fails.
    #[instrument(skip(self), fields(page = query.page.page(), size = query.page.size()))]
    pub async fn list_stores(&self, query: &StoreQuery) -> Result<StoreListing, DirectoryError> {
        let filter = query.filter();
        let stores = self.stores.find_page(&filter, query.sort, query.page).await?;
        let categories = self.categories.find_all().await?;

        tracing::debug!(
            ?filter,
            total = stores.total_elements,
            returned = stores.content.len(),
            "Listed stores"
        );

        Ok(StoreListing { stores, categories })
    }

    /// Load a store with its reviews and the caller's favorite state.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::NotFound` if the store does not exist.
    /// Returns `DirectoryError::Repository` if a query fails.
    #[instrument(skip(self))]
    pub async fn get_store_detail(
        &self,
        store_id: StoreId,
        current_member: Option<MemberId>,
    ) -> Result<StoreDetail, DirectoryError> {
        let store = self
            .stores
            .find_by_id(store_id)
            .await?
            .ok_or(DirectoryError::NotFound(store_id))?;

        let reviews = self.reviews.reviews_for_store(store_id).await?;

        let has_favorited = match current_member {
            Some(member_id) => self.favorites.has_favorited(member_id, store_id).await?,
            None => false,
        };

        tracing::debug!(
            store = %store.name,
            reviews = reviews.len(),
            has_favorited,
            "Loaded store detail"
        );

        Ok(StoreDetail {
            store,
            reviews,
            has_favorited,
        })
    }

    /// Save a store for the caller. Repeated calls store repeated rows.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Unauthenticated` if there is no caller.
    /// Returns `DirectoryError::NotFound` if the store does not exist.
    /// Returns `DirectoryError::Repository` if a query fails.
    #[instrument(skip(self))]
    pub async fn add_favorite(
        &self,
        current_member: Option<MemberId>,
        store_id: StoreId,
    ) -> Result<Favorite, DirectoryError> {
        let member_id = current_member.ok_or(DirectoryError::Unauthenticated)?;

        if !self.stores.exists(store_id).await? {
            return Err(DirectoryError::NotFound(store_id));
        }

        let favorite = self.favorites.add_favorite(member_id, store_id).await?;
        tracing::info!(favorite_id = %favorite.id, "Favorite added");

        Ok(favorite)
    }

    /// Every favorite of the caller, ordered by favorite id.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Unauthenticated` if there is no caller.
    /// Returns `DirectoryError::Repository` if the query fails.
    #[instrument(skip(self))]
    pub async fn list_favorites(
        &self,
        current_member: Option<MemberId>,
    ) -> Result<Vec<Favorite>, DirectoryError> {
        let member_id = current_member.ok_or(DirectoryError::Unauthenticated)?;
        Ok(self.favorites.favorites_by_member(member_id).await?)
    }

    /// Names of the stores referenced by `favorites`, keyed by store id.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Repository` if the query fails.
    pub async fn favorite_store_names(
        &self,
        favorites: &[Favorite],
    ) -> Result<HashMap<StoreId, String>, DirectoryError> {
        let mut ids: Vec<StoreId> = favorites.iter().map(|f| f.store_id).collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(self.stores.find_names(&ids).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};

    use nagoyameshi_core::{FavoriteId, ReviewId};

    use super::*;
    use crate::db::categories::MockCategoryRepository;
    use crate::db::favorites::MockFavoriteRepository;
    use crate::db::reviews::MockReviewRepository;
    use crate::db::stores::MockStoreRepository;

    fn cafe_nagoya() -> Store {
        Store {
            id: StoreId::new(1),
            name: "Cafe Nagoya".to_owned(),
            address: "Naka-ku".to_owned(),
            categories: Vec::new(),
        }
    }

    fn service(
        stores: MockStoreRepository,
        categories: MockCategoryRepository,
        favorites: MockFavoriteRepository,
        reviews: MockReviewRepository,
    ) -> StoreDirectoryService {
        StoreDirectoryService::new(
            Arc::new(stores),
            Arc::new(categories),
            FavoriteService::new(Arc::new(favorites)),
            ReviewService::new(Arc::new(reviews)),
        )
    }

    #[tokio::test]
    async fn keyword_wins_over_area() {
        let mut stores = MockStoreRepository::new();
        let mut categories = MockCategoryRepository::new();

        stores
            .expect_find_page()
            .withf(|filter, _, _| matches!(filter, StoreFilter::Keyword(k) if k == "Nagoya"))
            .times(1)
            .returning(|_, _, page| Ok(Page::new(vec![cafe_nagoya()], page, 1)));
        categories.expect_find_all().returning(|| Ok(Vec::new()));

        let service = service(
            stores,
            categories,
            MockFavoriteRepository::new(),
            MockReviewRepository::new(),
        );

        let query = StoreQuery {
            keyword: Some("Nagoya".to_owned()),
            area: Some("Atsuta".to_owned()),
            ..StoreQuery::default()
        };
        let listing = service.list_stores(&query).await.unwrap();

        assert_eq!(listing.stores.content, vec![cafe_nagoya()]);
    }

    #[tokio::test]
    async fn listing_includes_every_category() {
        let mut stores = MockStoreRepository::new();
        let mut categories = MockCategoryRepository::new();

        stores
            .expect_find_page()
            .withf(|filter, _, _| matches!(filter, StoreFilter::All))
            .returning(|_, _, page| Ok(Page::empty(page)));
        categories.expect_find_all().returning(|| {
            Ok(vec![
                Category {
                    id: CategoryId::new(1),
                    name: "Miso katsu".to_owned(),
                },
                Category {
                    id: CategoryId::new(2),
                    name: "Hitsumabushi".to_owned(),
                },
            ])
        });

        let service = service(
            stores,
            categories,
            MockFavoriteRepository::new(),
            MockReviewRepository::new(),
        );

        let listing = service.list_stores(&StoreQuery::default()).await.unwrap();
        assert!(listing.stores.is_empty());
        assert_eq!(listing.categories.len(), 2);
    }

    #[tokio::test]
    async fn detail_of_missing_store_is_not_found() {
        let mut stores = MockStoreRepository::new();
        let mut reviews = MockReviewRepository::new();

        stores.expect_find_by_id().returning(|_| Ok(None));
        reviews.expect_find_by_store_newest_first().never();

        let service = service(
            stores,
            MockCategoryRepository::new(),
            MockFavoriteRepository::new(),
            reviews,
        );

        let err = service
            .get_store_detail(StoreId::new(404), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::NotFound(id) if id == StoreId::new(404)));
    }

    #[tokio::test]
    async fn anonymous_detail_skips_favorite_lookup() {
        let mut stores = MockStoreRepository::new();
        let mut favorites = MockFavoriteRepository::new();
        let mut reviews = MockReviewRepository::new();

        stores
            .expect_find_by_id()
            .returning(|_| Ok(Some(cafe_nagoya())));
        reviews.expect_find_by_store_newest_first().returning(|_| {
            Ok(vec![Review {
                id: ReviewId::new(9),
                store_id: StoreId::new(1),
                author_id: MemberId::new(3),
                author_name: "Taro".to_owned(),
                body: "Great tebasaki".to_owned(),
                created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            }])
        });
        favorites.expect_find_by_member_and_store().never();

        let service = service(stores, MockCategoryRepository::new(), favorites, reviews);

        let detail = service
            .get_store_detail(StoreId::new(1), None)
            .await
            .unwrap();
        assert!(!detail.has_favorited);
        assert_eq!(detail.reviews.len(), 1);
    }

    #[tokio::test]
    async fn member_detail_reports_favorite() {
        let mut stores = MockStoreRepository::new();
        let mut favorites = MockFavoriteRepository::new();
        let mut reviews = MockReviewRepository::new();

        stores
            .expect_find_by_id()
            .returning(|_| Ok(Some(cafe_nagoya())));
        reviews
            .expect_find_by_store_newest_first()
            .returning(|_| Ok(Vec::new()));
        favorites
            .expect_find_by_member_and_store()
            .withf(|member, store| *member == MemberId::new(7) && *store == StoreId::new(1))
            .returning(|member_id, store_id| {
                Ok(vec![Favorite {
                    id: FavoriteId::new(1),
                    member_id,
                    store_id,
                }])
            });

        let service = service(stores, MockCategoryRepository::new(), favorites, reviews);

        let detail = service
            .get_store_detail(StoreId::new(1), Some(MemberId::new(7)))
            .await
            .unwrap();
        assert!(detail.has_favorited);
        assert!(detail.reviews.is_empty());
    }

    #[tokio::test]
    async fn add_favorite_requires_member_and_writes_nothing() {
        let mut stores = MockStoreRepository::new();
        let mut favorites = MockFavoriteRepository::new();

        stores.expect_exists().never();
        favorites.expect_insert().never();

        let service = service(
            stores,
            MockCategoryRepository::new(),
            favorites,
            MockReviewRepository::new(),
        );

        let err = service
            .add_favorite(None, StoreId::new(1))
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::Unauthenticated));
    }

    #[tokio::test]
    async fn add_favorite_for_missing_store_writes_nothing() {
        let mut stores = MockStoreRepository::new();
        let mut favorites = MockFavoriteRepository::new();

        stores.expect_exists().returning(|_| Ok(false));
        favorites.expect_insert().never();

        let service = service(
            stores,
            MockCategoryRepository::new(),
            favorites,
            MockReviewRepository::new(),
        );

        let err = service
            .add_favorite(Some(MemberId::new(7)), StoreId::new(99))
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn add_favorite_inserts_every_time() {
        let mut stores = MockStoreRepository::new();
        let mut favorites = MockFavoriteRepository::new();

        stores.expect_exists().returning(|_| Ok(true));
        let mut next_id = 0;
        favorites
            .expect_insert()
            .times(2)
            .returning(move |member_id, store_id| {
                next_id += 1;
                Ok(Favorite {
                    id: FavoriteId::new(next_id),
                    member_id,
                    store_id,
                })
            });

        let service = service(
            stores,
            MockCategoryRepository::new(),
            favorites,
            MockReviewRepository::new(),
        );

        let member = Some(MemberId::new(7));
        let first = service.add_favorite(member, StoreId::new(1)).await.unwrap();
        let second = service.add_favorite(member, StoreId::new(1)).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.store_id, second.store_id);
    }

    #[tokio::test]
    async fn list_favorites_requires_member() {
        let mut favorites = MockFavoriteRepository::new();
        favorites.expect_find_by_member().never();

        let service = service(
            MockStoreRepository::new(),
            MockCategoryRepository::new(),
            favorites,
            MockReviewRepository::new(),
        );

        let err = service.list_favorites(None).await.unwrap_err();
        assert!(matches!(err, DirectoryError::Unauthenticated));
    }

    #[tokio::test]
    async fn list_favorites_empty_is_ok() {
        let mut favorites = MockFavoriteRepository::new();
        favorites
            .expect_find_by_member()
            .returning(|_| Ok(Vec::new()));

        let service = service(
            MockStoreRepository::new(),
            MockCategoryRepository::new(),
            favorites,
            MockReviewRepository::new(),
        );

        let favorites = service
            .list_favorites(Some(MemberId::new(7)))
            .await
            .unwrap();
        assert!(favorites.is_empty());
    }

    #[tokio::test]
    async fn favorite_store_names_looks_up_each_store_once() {
        let mut stores = MockStoreRepository::new();

        stores
            .expect_find_names()
            .withf(|ids| ids.to_vec() == vec![StoreId::new(1), StoreId::new(2)])
            .times(1)
            .returning(|_| {
                Ok(HashMap::from([
                    (StoreId::new(1), "Cafe Nagoya".to_owned()),
                    (StoreId::new(2), "Horaiken".to_owned()),
                ]))
            });

        let service = service(
            stores,
            MockCategoryRepository::new(),
            MockFavoriteRepository::new(),
            MockReviewRepository::new(),
        );

        let favorite = |id, store| Favorite {
            id: FavoriteId::new(id),
            member_id: MemberId::new(7),
            store_id: StoreId::new(store),
        };
        let names = service
            .favorite_store_names(&[favorite(1, 2), favorite(2, 1), favorite(3, 2)])
            .await
            .unwrap();
        assert_eq!(names[&StoreId::new(2)], "Horaiken");
    }
}
