//! Store directory route handlers.
//!
//! Every handler reads the caller through [`OptionalAuth`] and hands
//! `Option<MemberId>` to [`StoreDirectoryService`]; the service decides when a
//! member is required and the resulting [`AppError`] turns that into a
//! redirect to the login page.
//!
//! [`StoreDirectoryService`]: crate::services::StoreDirectoryService
//! [`AppError`]: crate::error::AppError

use std::fmt::Display;
use std::str::FromStr;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use serde::{Deserialize, Deserializer};
use url::form_urlencoded;

use nagoyameshi_core::{CategoryId, Page, PageRequest, StoreId};

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::{Category, CurrentMember, Favorite, Review, Store, StoreSort};
use crate::services::StoreQuery;
use crate::state::AppState;

/// Treat `?field=` the same as an absent field, otherwise parse with `FromStr`.
///
/// Values are passed through untouched, so `?keyword=%20` searches for a
/// space. A value that fails to parse rejects the whole query with `400`.
fn empty_string_as_none<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

// =============================================================================
// Query Types
// =============================================================================

/// Query string of `GET /storeinfo`.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub keyword: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub area: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub category: Option<CategoryId>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub size: Option<u32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub sort: Option<StoreSort>,
}

impl From<ListParams> for StoreQuery {
    fn from(params: ListParams) -> Self {
        Self {
            keyword: params.keyword,
            area: params.area,
            category: params.category,
            page: PageRequest::from_params(params.page, params.size),
            sort: params.sort.unwrap_or_default(),
        }
    }
}

// =============================================================================
// View Types
// =============================================================================

/// A category in the filter dropdown.
#[derive(Debug, Clone)]
pub struct CategoryOption {
    pub id: CategoryId,
    pub name: String,
    pub selected: bool,
}

/// A numbered link in the pagination bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    /// One-based label shown to the user.
    pub label: u32,
    pub url: String,
    pub current: bool,
}

/// Pagination bar for a listing.
#[derive(Debug, Clone, Default)]
pub struct Pagination {
    pub previous_url: Option<String>,
    pub next_url: Option<String>,
    pub pages: Vec<PageLink>,
}

impl Pagination {
    /// Build links for `page`, preserving every other parameter of `query`.
    #[must_use]
    pub fn new<T>(page: &Page<T>, query: &StoreQuery) -> Self {
        let link = |number: u32| listing_url(query, number);

        Self {
            previous_url: page.has_previous().then(|| link(page.number - 1)),
            next_url: page.has_next().then(|| link(page.number + 1)),
            pages: (0..page.total_pages())
                .map(|number| PageLink {
                    label: number + 1,
                    url: link(number),
                    current: number == page.number,
                })
                .collect(),
        }
    }

    /// Whether there is more than one page to navigate.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.pages.len() > 1
    }
}

/// `/storeinfo` URL for page `number` of `query`.
///
/// Defaults (size 10, sort by id ascending) are left out of the URL.
#[must_use]
pub fn listing_url(query: &StoreQuery, number: u32) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());

    if let Some(keyword) = &query.keyword {
        serializer.append_pair("keyword", keyword);
    }
    if let Some(area) = &query.area {
        serializer.append_pair("area", area);
    }
    if let Some(category) = query.category {
        serializer.append_pair("category", &category.to_string());
    }
    if query.sort != StoreSort::default() {
        serializer.append_pair("sort", &query.sort.to_string());
    }
    if query.page.size() != PageRequest::DEFAULT_SIZE {
        serializer.append_pair("size", &query.page.size().to_string());
    }
    serializer.append_pair("page", &number.to_string());

    format!("/storeinfo?{}", serializer.finish())
}

/// A review as shown on the store page.
#[derive(Debug, Clone)]
pub struct ReviewView {
    pub author_name: String,
    pub body: String,
    pub posted_on: String,
}

impl From<Review> for ReviewView {
    fn from(review: Review) -> Self {
        Self {
            posted_on: review.created_at.format("%Y-%m-%d").to_string(),
            author_name: review.author_name,
            body: review.body,
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Store listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "storeinfo/index.html")]
pub struct StoreIndexTemplate {
    pub member: Option<CurrentMember>,
    pub stores: Vec<Store>,
    pub total: u64,
    pub keyword: String,
    pub area: String,
    pub categories: Vec<CategoryOption>,
    pub sort: String,
    pub pagination: Pagination,
}

/// Store detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "storeinfo/show.html")]
pub struct StoreShowTemplate {
    pub member: Option<CurrentMember>,
    pub store: Store,
    pub reviews: Vec<ReviewView>,
    pub has_favorited: bool,
}

/// A saved store as listed on the favorites page.
#[derive(Debug, Clone)]
pub struct FavoriteView {
    pub store_id: StoreId,
    pub store_name: String,
}

/// Favorites page template.
#[derive(Template, WebTemplate)]
#[template(path = "storeinfo/favorites.html")]
pub struct FavoritesTemplate {
    pub member: Option<CurrentMember>,
    pub favorites: Vec<FavoriteView>,
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /storeinfo` - search and page through stores.
#[tracing::instrument(skip(state, auth))]
pub async fn index(
    State(state): State<AppState>,
    auth: OptionalAuth,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse> {
    let query = StoreQuery::from(params);
    let listing = state.directory().list_stores(&query).await?;

    let categories = listing
        .categories
        .into_iter()
        .map(|Category { id, name }| CategoryOption {
            selected: query.category == Some(id),
            id,
            name,
        })
        .collect();

    Ok(StoreIndexTemplate {
        member: auth.0,
        pagination: Pagination::new(&listing.stores, &query),
        total: listing.stores.total_elements,
        stores: listing.stores.content,
        keyword: query.keyword.clone().unwrap_or_default(),
        area: query.area.clone().unwrap_or_default(),
        categories,
        sort: query.sort.to_string(),
    })
}

/// `GET /storeinfo/{id}` - store detail with reviews.
#[tracing::instrument(skip(state, auth))]
pub async fn show(
    State(state): State<AppState>,
    auth: OptionalAuth,
    Path(id): Path<StoreId>,
) -> Result<impl IntoResponse> {
    let detail = state
        .directory()
        .get_store_detail(id, auth.member_id())
        .await?;

    Ok(StoreShowTemplate {
        member: auth.0,
        store: detail.store,
        reviews: detail.reviews.into_iter().map(ReviewView::from).collect(),
        has_favorited: detail.has_favorited,
    })
}

/// `POST /storeinfo/{id}/favorite` - save a store, then return to its page.
#[tracing::instrument(skip(state, auth))]
pub async fn add_favorite(
    State(state): State<AppState>,
    auth: OptionalAuth,
    Path(id): Path<StoreId>,
) -> Result<Redirect> {
    let favorite = state.directory().add_favorite(auth.member_id(), id).await?;

    let store_id = favorite.store_id.to_string();
    add_breadcrumb(
        "favorite",
        "Added favorite",
        Some(&[("store_id", store_id.as_str())]),
    );

    Ok(Redirect::to(&format!("/storeinfo/{id}")))
}

/// `GET /storeinfo/favorites` - the caller's saved stores.
#[tracing::instrument(skip(state, auth))]
pub async fn favorites(
    State(state): State<AppState>,
    auth: OptionalAuth,
) -> Result<impl IntoResponse> {
    let favorites = state.directory().list_favorites(auth.member_id()).await?;
    let names = state.directory().favorite_store_names(&favorites).await?;

    let favorites = favorites
        .into_iter()
        .map(|Favorite { store_id, .. }| FavoriteView {
            store_name: names
                .get(&store_id)
                .cloned()
                .unwrap_or_else(|| format!("Store #{store_id}")),
            store_id,
        })
        .collect();

    Ok(FavoritesTemplate {
        member: auth.0,
        favorites,
    })
}
