//! Business logic services for the store directory.
//!
//! # Services
//!
//! - `directory` - Store listing, detail, and favorite operations (the façade
//!   route handlers call)
//! - `favorites` - Thin wrapper over the favorite repository
//! - `reviews` - Thin wrapper over the review repository
//! - `auth` - Member password login

pub mod auth;
pub mod directory;
pub mod favorites;
pub mod reviews;

pub use auth::{AuthError, AuthService};
pub use directory::{DirectoryError, StoreDetail, StoreDirectoryService, StoreListing, StoreQuery};
pub use favorites::FavoriteService;
pub use reviews::ReviewService;
