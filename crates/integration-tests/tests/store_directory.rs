//! Store directory behavior against in-memory repositories.
//!
//! Run with: cargo test -p nagoyameshi-integration-tests

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};

use nagoyameshi_core::{CategoryId, Direction, MemberId, PageRequest, StoreId};
use nagoyameshi_integration_tests::InMemoryDirectory;
use nagoyameshi_web::models::{StoreSort, StoreSortField};
use nagoyameshi_web::services::{DirectoryError, StoreDirectoryService, StoreQuery};

struct Fixture {
    directory: Arc<InMemoryDirectory>,
    service: StoreDirectoryService,
}

impl Fixture {
    fn new() -> Self {
        let directory = InMemoryDirectory::new();
        let service = StoreDirectoryService::from_repositories(&directory.repositories());
        Self { directory, service }
    }

    async fn member(&self) -> MemberId {
        self.directory
            .add_member("Taro", "taro@example.com", "correct-horse")
            .await
    }
}

fn names(listing: &nagoyameshi_web::services::StoreListing) -> Vec<&str> {
    listing
        .stores
        .content
        .iter()
        .map(|s| s.name.as_str())
        .collect()
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn cafe_nagoya_is_found_by_keyword_and_area_but_not_unlinked_category() {
    let fx = Fixture::new();
    for name in ["Cafe", "Unagi", "Misokatsu", "Kishimen", "Tebasaki"] {
        fx.directory.add_category(name).await;
    }
    let cafe = CategoryId::new(1);
    let store = fx
        .directory
        .add_store("Cafe Nagoya", "Naka-ku", &[cafe])
        .await;
    assert_eq!(store, StoreId::new(1));

    let by_keyword = fx
        .service
        .list_stores(&StoreQuery {
            keyword: Some("Nagoya".to_owned()),
            ..StoreQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(by_keyword.stores.content[0].id, store);

    let by_area = fx
        .service
        .list_stores(&StoreQuery {
            area: Some("Naka".to_owned()),
            ..StoreQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(by_area.stores.content[0].id, store);

    let by_category = fx
        .service
        .list_stores(&StoreQuery {
            category: Some(CategoryId::new(5)),
            ..StoreQuery::default()
        })
        .await
        .unwrap();
    assert!(by_category.stores.is_empty());
    assert_eq!(by_category.stores.total_pages(), 0);
}

#[tokio::test]
async fn keyword_matches_name_or_address() {
    let fx = Fixture::new();
    fx.directory.add_store("Cafe Nagoya", "Naka-ku", &[]).await;
    fx.directory.add_store("Yabaton", "Nagoya Station", &[]).await;
    fx.directory.add_store("Horaiken", "Atsuta-ku", &[]).await;

    let listing = fx
        .service
        .list_stores(&StoreQuery {
            keyword: Some("Nagoya".to_owned()),
            ..StoreQuery::default()
        })
        .await
        .unwrap();

    assert_eq!(names(&listing), vec!["Cafe Nagoya", "Yabaton"]);
    assert_eq!(listing.stores.total_elements, 2);
}

#[tokio::test]
async fn area_matches_address_only() {
    let fx = Fixture::new();
    fx.directory.add_store("Cafe Nagoya", "Naka-ku", &[]).await;
    fx.directory.add_store("Naka Ramen", "Chikusa-ku", &[]).await;

    let listing = fx
        .service
        .list_stores(&StoreQuery {
            area: Some("Naka".to_owned()),
            ..StoreQuery::default()
        })
        .await
        .unwrap();

    assert_eq!(names(&listing), vec!["Cafe Nagoya"]);
}

#[tokio::test]
async fn keyword_takes_precedence_over_area_and_category() {
    let fx = Fixture::new();
    let cafe = fx.directory.add_category("Cafe").await;
    fx.directory.add_store("Cafe Nagoya", "Naka-ku", &[cafe]).await;
    fx.directory.add_store("Komeda", "Meito-ku", &[cafe]).await;

    let listing = fx
        .service
        .list_stores(&StoreQuery {
            keyword: Some("Komeda".to_owned()),
            area: Some("Naka".to_owned()),
            category: Some(cafe),
            ..StoreQuery::default()
        })
        .await
        .unwrap();

    assert_eq!(names(&listing), vec!["Komeda"]);
}

#[tokio::test]
async fn category_filter_and_category_list() {
    let fx = Fixture::new();
    let cafe = fx.directory.add_category("Cafe").await;
    let unagi = fx.directory.add_category("Unagi").await;
    fx.directory.add_store("Cafe Nagoya", "Naka-ku", &[cafe]).await;
    fx.directory.add_store("Horaiken", "Atsuta-ku", &[unagi]).await;

    let listing = fx
        .service
        .list_stores(&StoreQuery {
            category: Some(unagi),
            ..StoreQuery::default()
        })
        .await
        .unwrap();

    assert_eq!(names(&listing), vec!["Horaiken"]);
    assert_eq!(listing.categories.len(), 2);
}

#[tokio::test]
async fn empty_keyword_lists_everything() {
    let fx = Fixture::new();
    fx.directory.add_store("Cafe Nagoya", "Naka-ku", &[]).await;
    fx.directory.add_store("Horaiken", "Atsuta-ku", &[]).await;

    let listing = fx
        .service
        .list_stores(&StoreQuery {
            keyword: Some(String::new()),
            ..StoreQuery::default()
        })
        .await
        .unwrap();

    assert_eq!(listing.stores.total_elements, 2);
}

#[tokio::test]
async fn matching_is_case_sensitive() {
    let fx = Fixture::new();
    fx.directory.add_store("Cafe Nagoya", "Naka-ku", &[]).await;

    let listing = fx
        .service
        .list_stores(&StoreQuery {
            keyword: Some("nagoya".to_owned()),
            ..StoreQuery::default()
        })
        .await
        .unwrap();

    assert!(listing.stores.is_empty());
}

#[tokio::test]
async fn pages_through_results() {
    let fx = Fixture::new();
    for i in 1..=25 {
        fx.directory
            .add_store(&format!("Store {i:02}"), "Naka-ku", &[])
            .await;
    }

    let last = fx
        .service
        .list_stores(&StoreQuery {
            page: PageRequest::new(2, 10),
            ..StoreQuery::default()
        })
        .await
        .unwrap();

    assert_eq!(last.stores.content.len(), 5);
    assert_eq!(last.stores.total_elements, 25);
    assert_eq!(last.stores.total_pages(), 3);
    assert!(last.stores.is_last());
    assert_eq!(last.stores.content[0].id, StoreId::new(21));

    let beyond = fx
        .service
        .list_stores(&StoreQuery {
            page: PageRequest::new(9, 10),
            ..StoreQuery::default()
        })
        .await
        .unwrap();

    assert!(beyond.stores.is_empty());
    assert_eq!(beyond.stores.total_elements, 25);
}

#[tokio::test]
async fn oversized_pages_are_clamped() {
    let fx = Fixture::new();
    for i in 1..=120 {
        fx.directory
            .add_store(&format!("Store {i}"), "Naka-ku", &[])
            .await;
    }

    let listing = fx
        .service
        .list_stores(&StoreQuery {
            page: PageRequest::from_params(None, Some(500)),
            ..StoreQuery::default()
        })
        .await
        .unwrap();

    assert_eq!(listing.stores.content.len(), 100);
}

#[tokio::test]
async fn sort_by_name_descending_breaks_ties_by_id() {
    let fx = Fixture::new();
    fx.directory.add_store("Atsuta", "A", &[]).await;
    fx.directory.add_store("Sakae", "B", &[]).await;
    fx.directory.add_store("Sakae", "C", &[]).await;

    let listing = fx
        .service
        .list_stores(&StoreQuery {
            sort: StoreSort {
                field: StoreSortField::Name,
                direction: Direction::Desc,
            },
            ..StoreQuery::default()
        })
        .await
        .unwrap();

    let addresses: Vec<&str> = listing
        .stores
        .content
        .iter()
        .map(|s| s.address.as_str())
        .collect();
    assert_eq!(addresses, vec!["B", "C", "A"]);
}

// ============================================================================
// Detail
// ============================================================================

#[tokio::test]
async fn detail_includes_reviews_newest_first() {
    let fx = Fixture::new();
    let member = fx.member().await;
    let store = fx.directory.add_store("Cafe Nagoya", "Naka-ku", &[]).await;
    let t0 = Utc.with_ymd_and_hms(2026, 4, 1, 12, 0, 0).unwrap();
    fx.directory.add_review(store, member, "first", t0).await;
    fx.directory
        .add_review(store, member, "second", t0 + Duration::days(1))
        .await;
    fx.directory.add_review(store, member, "same time", t0).await;

    let detail = fx.service.get_store_detail(store, None).await.unwrap();

    let bodies: Vec<&str> = detail.reviews.iter().map(|r| r.body.as_str()).collect();
    assert_eq!(bodies, vec!["second", "same time", "first"]);
    assert_eq!(detail.reviews[0].author_name, "Taro");
    assert!(!detail.has_favorited);
}

#[tokio::test]
async fn detail_of_missing_store_is_not_found() {
    let fx = Fixture::new();
    let member = fx.member().await;

    let err = fx
        .service
        .get_store_detail(StoreId::new(42), Some(member))
        .await
        .unwrap_err();

    assert!(matches!(err, DirectoryError::NotFound(id) if id == StoreId::new(42)));
}

// ============================================================================
// Favorites
// ============================================================================

#[tokio::test]
async fn favoriting_shows_on_detail_and_in_list() {
    let fx = Fixture::new();
    let member = fx.member().await;
    let store = fx.directory.add_store("Cafe Nagoya", "Naka-ku", &[]).await;

    let favorite = fx.service.add_favorite(Some(member), store).await.unwrap();
    assert_eq!(favorite.member_id, member);
    assert_eq!(favorite.store_id, store);

    let detail = fx.service.get_store_detail(store, Some(member)).await.unwrap();
    assert!(detail.has_favorited);

    let anonymous = fx.service.get_store_detail(store, None).await.unwrap();
    assert!(!anonymous.has_favorited);

    let favorites = fx.service.list_favorites(Some(member)).await.unwrap();
    assert_eq!(favorites, vec![favorite]);
}

#[tokio::test]
async fn favorites_are_per_member() {
    let fx = Fixture::new();
    let taro = fx.member().await;
    let hanako = fx
        .directory
        .add_member("Hanako", "hanako@example.com", "correct-horse")
        .await;
    let store = fx.directory.add_store("Cafe Nagoya", "Naka-ku", &[]).await;

    fx.service.add_favorite(Some(taro), store).await.unwrap();

    let detail = fx.service.get_store_detail(store, Some(hanako)).await.unwrap();
    assert!(!detail.has_favorited);
    assert!(fx.service.list_favorites(Some(hanako)).await.unwrap().is_empty());
}

#[tokio::test]
async fn adding_twice_stores_two_rows_in_id_order() {
    let fx = Fixture::new();
    let member = fx.member().await;
    let store = fx.directory.add_store("Cafe Nagoya", "Naka-ku", &[]).await;

    let first = fx.service.add_favorite(Some(member), store).await.unwrap();
    let second = fx.service.add_favorite(Some(member), store).await.unwrap();

    assert_ne!(first.id, second.id);
    let favorites = fx.service.list_favorites(Some(member)).await.unwrap();
    assert_eq!(favorites, vec![first, second]);
}

#[tokio::test]
async fn anonymous_add_is_rejected_without_writing() {
    let fx = Fixture::new();
    let store = fx.directory.add_store("Cafe Nagoya", "Naka-ku", &[]).await;

    let err = fx.service.add_favorite(None, store).await.unwrap_err();

    assert!(matches!(err, DirectoryError::Unauthenticated));
    assert_eq!(fx.directory.favorite_count().await, 0);
}

#[tokio::test]
async fn favoriting_missing_store_is_not_found_without_writing() {
    let fx = Fixture::new();
    let member = fx.member().await;

    let err = fx
        .service
        .add_favorite(Some(member), StoreId::new(7))
        .await
        .unwrap_err();

    assert!(matches!(err, DirectoryError::NotFound(_)));
    assert_eq!(fx.directory.favorite_count().await, 0);
}

#[tokio::test]
async fn anonymous_favorites_list_is_rejected() {
    let fx = Fixture::new();

    let err = fx.service.list_favorites(None).await.unwrap_err();

    assert!(matches!(err, DirectoryError::Unauthenticated));
}
