//! Favorite domain type.

use serde::Serialize;

use nagoyameshi_core::{FavoriteId, MemberId, StoreId};

/// A store a member has saved for later.
///
/// Rows are insert-only: nothing prevents the same (member, store) pair from
/// being stored more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Favorite {
    pub id: FavoriteId,
    pub member_id: MemberId,
    pub store_id: StoreId,
}
