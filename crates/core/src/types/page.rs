//! Offset pagination shared by listing queries and templates.
//!
//! Page numbers are zero-based on the wire and in these types; templates add
//! one when displaying them.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Sort direction for an ordered listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Smallest first.
    #[default]
    Asc,
    /// Largest first.
    Desc,
}

impl Direction {
    /// SQL keyword for this direction.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// Lowercase query-string form (`asc`/`desc`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Error returned when a sort direction is neither `asc` nor `desc`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort direction: {0}")]
pub struct DirectionError(pub String);

impl FromStr for Direction {
    type Err = DirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(DirectionError(s.to_owned())),
        }
    }
}

/// A request for one page of an ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    size: u32,
}

impl PageRequest {
    /// Page size used when the caller does not ask for one.
    pub const DEFAULT_SIZE: u32 = 10;

    /// Largest page size a caller may request.
    pub const MAX_SIZE: u32 = 100;

    /// Build a page request, clamping `size` into `1..=MAX_SIZE`.
    #[must_use]
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size: size.clamp(1, Self::MAX_SIZE),
        }
    }

    /// Build from optional query parameters, falling back to page 0 and
    /// [`Self::DEFAULT_SIZE`].
    #[must_use]
    pub fn from_params(page: Option<u32>, size: Option<u32>) -> Self {
        Self::new(page.unwrap_or(0), size.unwrap_or(Self::DEFAULT_SIZE))
    }

    /// Zero-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Maximum number of items on the page.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Row offset for `OFFSET`.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }

    /// Row count for `LIMIT`.
    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, Self::DEFAULT_SIZE)
    }
}

/// One page of results plus the metadata needed to render pagination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Items on this page, in query order.
    pub content: Vec<T>,
    /// Zero-based page number.
    pub number: u32,
    /// Requested page size.
    pub size: u32,
    /// Number of items across all pages.
    pub total_elements: u64,
}

impl<T> Page<T> {
    /// Assemble a page from the rows returned for `request`.
    #[must_use]
    pub const fn new(content: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        Self {
            content,
            number: request.page,
            size: request.size,
            total_elements,
        }
    }

    /// An empty page for `request`.
    #[must_use]
    pub const fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), request, 0)
    }

    /// Number of pages needed for `total_elements`.
    #[must_use]
    pub fn total_pages(&self) -> u32 {
        if self.size == 0 {
            return 0;
        }
        let pages = self.total_elements.div_ceil(u64::from(self.size));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Whether this page holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Whether this is the first page.
    #[must_use]
    pub const fn is_first(&self) -> bool {
        self.number == 0
    }

    /// Whether no page follows this one.
    #[must_use]
    pub fn is_last(&self) -> bool {
        !self.has_next()
    }

    /// Whether a later page exists.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.number.saturating_add(1) < self.total_pages()
    }

    /// Whether an earlier page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.number > 0
    }

    /// Transform the items while keeping the pagination metadata.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            content: self.content.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            total_elements: self.total_elements,
        }
    }
}
