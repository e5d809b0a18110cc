//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use nagoyameshi_core::{Email, MemberId};

use super::Member;

/// Session-stored member identity.
///
/// Minimal data stored in the session to identify the logged-in member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentMember {
    /// Member's database ID.
    pub id: MemberId,
    /// Member's display name.
    pub name: String,
    /// Member's email address.
    pub email: Email,
}

impl From<&Member> for CurrentMember {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id,
            name: member.name.clone(),
            email: member.email.clone(),
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in member.
    pub const CURRENT_MEMBER: &str = "current_member";
}
