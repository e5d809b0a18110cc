//! Store and category domain types, plus the listing filter and sort.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use nagoyameshi_core::{CategoryId, Direction, StoreId};

/// A restaurant shown in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    pub address: String,
    /// Categories linked to this store, ordered by category ID.
    pub categories: Vec<Category>,
}

impl Store {
    /// Whether the store is linked to `category`.
    #[must_use]
    pub fn has_category(&self, category: CategoryId) -> bool {
        self.categories.iter().any(|c| c.id == category)
    }
}

/// A cuisine or venue category used to filter the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// The single filter applied to a store listing.
///
/// Filters never combine: [`StoreFilter::select`] picks one by precedence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StoreFilter {
    /// Every store.
    #[default]
    All,
    /// Name or address contains the text (case-sensitive).
    Keyword(String),
    /// Address contains the text (case-sensitive).
    Area(String),
    /// Linked to the category.
    Category(CategoryId),
}

impl StoreFilter {
    /// Choose the filter for a listing request.
    ///
    /// Keyword wins over area, which wins over category. Empty strings count as
    /// absent.
    #[must_use]
    pub fn select(
        keyword: Option<&str>,
        area: Option<&str>,
        category: Option<CategoryId>,
    ) -> Self {
        if let Some(keyword) = keyword.filter(|k| !k.is_empty()) {
            return Self::Keyword(keyword.to_owned());
        }
        if let Some(area) = area.filter(|a| !a.is_empty()) {
            return Self::Area(area.to_owned());
        }
        category.map_or(Self::All, Self::Category)
    }

    /// Whether `store` passes this filter.
    ///
    /// Mirrors the SQL the `PostgreSQL` repository generates; used by
    /// in-memory repositories.
    #[must_use]
    pub fn matches(&self, store: &Store) -> bool {
        match self {
            Self::All => true,
            Self::Keyword(keyword) => {
                store.name.contains(keyword.as_str()) || store.address.contains(keyword.as_str())
            }
            Self::Area(area) => store.address.contains(area.as_str()),
            Self::Category(id) => store.has_category(*id),
        }
    }
}

/// Columns a store listing may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreSortField {
    #[default]
    Id,
    Name,
    Address,
}

impl StoreSortField {
    /// Query-string name of the field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Address => "address",
        }
    }

    /// Fully qualified column, safe to splice into SQL.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Id => "s.id",
            Self::Name => "s.name",
            Self::Address => "s.address",
        }
    }
}

/// Error returned for an unparseable `sort` parameter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid sort: {0}")]
pub struct SortError(pub String);

/// Ordering for a store listing, written `field[,direction]` in query strings.
///
/// Repositories always append `id ASC` as a tiebreak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreSort {
    pub field: StoreSortField,
    pub direction: Direction,
}

impl FromStr for StoreSort {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(',').map(str::trim);

        let field = match parts.next().unwrap_or_default() {
            "id" => StoreSortField::Id,
            "name" => StoreSortField::Name,
            "address" => StoreSortField::Address,
            _ => return Err(SortError(s.to_owned())),
        };

        let direction = match parts.next() {
            None | Some("") => Direction::Asc,
            Some(dir) => dir.parse().map_err(|_| SortError(s.to_owned()))?,
        };

        if parts.next().is_some() {
            return Err(SortError(s.to_owned()));
        }

        Ok(Self { field, direction })
    }
}

impl fmt::Display for StoreSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.field.as_str(), self.direction.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn cafe_nagoya() -> Store {
        Store {
            id: StoreId::new(1),
            name: "Cafe Nagoya".to_owned(),
            address: "Naka-ku".to_owned(),
            categories: vec![Category {
                id: CategoryId::new(2),
                name: "Cafe".to_owned(),
            }],
        }
    }

    #[test]
    fn test_select_precedence() {
        let category = Some(CategoryId::new(5));

        assert_eq!(
            StoreFilter::select(Some("miso"), Some("Naka"), category),
            StoreFilter::Keyword("miso".to_owned())
        );
        assert_eq!(
            StoreFilter::select(None, Some("Naka"), category),
            StoreFilter::Area("Naka".to_owned())
        );
        assert_eq!(
            StoreFilter::select(None, None, category),
            StoreFilter::Category(CategoryId::new(5))
        );
        assert_eq!(StoreFilter::select(None, None, None), StoreFilter::All);
    }

    #[test]
    fn test_select_treats_empty_strings_as_absent() {
        assert_eq!(
            StoreFilter::select(Some(""), Some("Naka"), None),
            StoreFilter::Area("Naka".to_owned())
        );
        assert_eq!(StoreFilter::select(Some(""), Some(""), None), StoreFilter::All);
    }

    #[test]
    fn test_matches() {
        let store = cafe_nagoya();

        assert!(StoreFilter::Keyword("Nagoya".to_owned()).matches(&store));
        assert!(StoreFilter::Keyword("Naka".to_owned()).matches(&store));
        assert!(!StoreFilter::Keyword("nagoya".to_owned()).matches(&store));
        assert!(StoreFilter::Area("Naka".to_owned()).matches(&store));
        assert!(!StoreFilter::Area("Cafe".to_owned()).matches(&store));
        assert!(StoreFilter::Category(CategoryId::new(2)).matches(&store));
        assert!(!StoreFilter::Category(CategoryId::new(5)).matches(&store));
    }

    #[test]
    fn test_sort_parse() {
        assert_eq!("id".parse::<StoreSort>().unwrap(), StoreSort::default());
        assert_eq!(
            "name,desc".parse::<StoreSort>().unwrap(),
            StoreSort {
                field: StoreSortField::Name,
                direction: Direction::Desc,
            }
        );
        assert_eq!(
            "address,ASC".parse::<StoreSort>().unwrap().field,
            StoreSortField::Address
        );
    }

    #[test]
    fn test_sort_parse_rejects_unknown() {
        assert!("password_hash".parse::<StoreSort>().is_err());
        assert!("name,up".parse::<StoreSort>().is_err());
        assert!("name,asc,extra".parse::<StoreSort>().is_err());
    }

    #[test]
    fn test_sort_display_round_trips() {
        let sort: StoreSort = "name,desc".parse().unwrap();
        assert_eq!(sort.to_string(), "name,desc");
    }
}
