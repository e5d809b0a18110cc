//! Domain models for the store directory.
//!
//! These are validated domain types, separate from the sqlx row types in
//! [`crate::db`].

pub mod favorite;
pub mod member;
pub mod review;
pub mod session;
pub mod store;

pub use favorite::Favorite;
pub use member::Member;
pub use review::Review;
pub use session::{CurrentMember, keys as session_keys};
pub use store::{Category, Store, StoreFilter, StoreSort, StoreSortField};
