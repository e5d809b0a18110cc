//! Review domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use nagoyameshi_core::{MemberId, ReviewId, StoreId};

/// Member-authored feedback attached to a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Review {
    pub id: ReviewId,
    pub store_id: StoreId,
    pub author_id: MemberId,
    /// Author's display name at read time.
    pub author_name: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}
