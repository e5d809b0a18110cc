//! Store repository.
//!
//! Listing queries are assembled with `sqlx::QueryBuilder` because the
//! `WHERE` clause depends on which [`StoreFilter`] was selected. Sort columns
//! come from a closed enum, never from user input.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use nagoyameshi_core::{CategoryId, Page, PageRequest, StoreId};

use super::{RepositoryError, contains_pattern};
use crate::models::{Category, Store, StoreFilter, StoreSort, StoreSortField};

/// Read access to stores and their categories.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoreRepository: Send + Sync {
    /// One page of stores passing `filter`, ordered by `sort` then id.
    async fn find_page(
        &self,
        filter: &StoreFilter,
        sort: StoreSort,
        page: PageRequest,
    ) -> Result<Page<Store>, RepositoryError>;

    /// A single store with its categories.
    async fn find_by_id(&self, id: StoreId) -> Result<Option<Store>, RepositoryError>;

    /// Names of the stores in `ids`. Unknown ids are left out.
    async fn find_names(&self, ids: &[StoreId])
        -> Result<HashMap<StoreId, String>, RepositoryError>;

    /// Whether a store with `id` exists.
    async fn exists(&self, id: StoreId) -> Result<bool, RepositoryError>;

    /// Cheap round trip used by the readiness probe.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

#[derive(sqlx::FromRow)]
struct StoreRow {
    id: i32,
    name: String,
    address: String,
}

#[derive(sqlx::FromRow)]
struct StoreCategoryRow {
    store_id: i32,
    category_id: i32,
    category_name: String,
}

/// `PostgreSQL` implementation of [`StoreRepository`].
#[derive(Clone)]
pub struct PgStoreRepository {
    pool: PgPool,
}

impl PgStoreRepository {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load the categories of every store in `store_ids`, keyed by store.
    async fn categories_for(
        &self,
        store_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<Category>>, RepositoryError> {
        if store_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, StoreCategoryRow>(
            r"
            SELECT sc.store_id, c.id AS category_id, c.name AS category_name
            FROM nagoyameshi.store_category sc
            JOIN nagoyameshi.category c ON c.id = sc.category_id
            WHERE sc.store_id = ANY($1)
            ORDER BY sc.store_id, c.id
            ",
        )
        .bind(store_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_store: HashMap<i32, Vec<Category>> = HashMap::new();
        for row in rows {
            by_store.entry(row.store_id).or_default().push(Category {
                id: CategoryId::new(row.category_id),
                name: row.category_name,
            });
        }
        Ok(by_store)
    }
}

/// Append the `WHERE` clause for `filter` to a query over `nagoyameshi.store s`.
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &StoreFilter) {
    match filter {
        StoreFilter::All => {}
        StoreFilter::Keyword(keyword) => {
            let pattern = contains_pattern(keyword);
            qb.push(" WHERE (s.name LIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR s.address LIKE ");
            qb.push_bind(pattern);
            qb.push(")");
        }
        StoreFilter::Area(area) => {
            qb.push(" WHERE s.address LIKE ");
            qb.push_bind(contains_pattern(area));
        }
        StoreFilter::Category(category_id) => {
            qb.push(
                " WHERE EXISTS (SELECT 1 FROM nagoyameshi.store_category sc \
                 WHERE sc.store_id = s.id AND sc.category_id = ",
            );
            qb.push_bind(category_id.as_i32());
            qb.push(")");
        }
    }
}

/// Append `ORDER BY` for `sort`, with `id` as the tiebreak.
fn push_order(qb: &mut QueryBuilder<'_, Postgres>, sort: StoreSort) {
    qb.push(" ORDER BY ");
    qb.push(sort.field.column());
    qb.push(" ");
    qb.push(sort.direction.as_sql());
    if sort.field != StoreSortField::Id {
        qb.push(", s.id ASC");
    }
}

#[async_trait]
impl StoreRepository for PgStoreRepository {
    async fn find_page(
        &self,
        filter: &StoreFilter,
        sort: StoreSort,
        page: PageRequest,
    ) -> Result<Page<Store>, RepositoryError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM nagoyameshi.store s");
        push_filter(&mut count, filter);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        let total = u64::try_from(total)
            .map_err(|_| RepositoryError::DataCorruption(format!("negative count: {total}")))?;

        if total == 0 {
            return Ok(Page::empty(page));
        }

        let mut select =
            QueryBuilder::<Postgres>::new("SELECT s.id, s.name, s.address FROM nagoyameshi.store s");
        push_filter(&mut select, filter);
        push_order(&mut select, sort);
        select.push(" LIMIT ");
        select.push_bind(page.limit());
        select.push(" OFFSET ");
        select.push_bind(page.offset());

        let rows = select
            .build_query_as::<StoreRow>()
            .fetch_all(&self.pool)
            .await?;

        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let mut categories = self.categories_for(&ids).await?;

        let stores = rows
            .into_iter()
            .map(|r| Store {
                id: StoreId::new(r.id),
                categories: categories.remove(&r.id).unwrap_or_default(),
                name: r.name,
                address: r.address,
            })
            .collect();

        Ok(Page::new(stores, page, total))
    }

    async fn find_by_id(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(
            r"
            SELECT s.id, s.name, s.address
            FROM nagoyameshi.store s
            WHERE s.id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let categories = self
            .categories_for(&[row.id])
            .await?
            .remove(&row.id)
            .unwrap_or_default();

        Ok(Some(Store {
            id: StoreId::new(row.id),
            name: row.name,
            address: row.address,
            categories,
        }))
    }

    async fn find_names(
        &self,
        ids: &[StoreId],
    ) -> Result<HashMap<StoreId, String>, RepositoryError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let raw_ids: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();
        let rows = sqlx::query_as::<_, (i32, String)>(
            "SELECT id, name FROM nagoyameshi.store WHERE id = ANY($1)",
        )
        .bind(&raw_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| (StoreId::new(id), name))
            .collect())
    }

    async fn exists(&self, id: StoreId) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM nagoyameshi.store WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
