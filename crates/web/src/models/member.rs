//! Member domain type.

use chrono::{DateTime, Utc};

use nagoyameshi_core::{Email, MemberId};

/// A registered member who can log in, favorite stores and write reviews.
#[derive(Debug, Clone)]
pub struct Member {
    /// Unique member ID.
    pub id: MemberId,
    /// Display name shown on reviews.
    pub name: String,
    /// Login email (normalized to lowercase).
    pub email: Email,
    /// When the member registered.
    pub created_at: DateTime<Utc>,
}
