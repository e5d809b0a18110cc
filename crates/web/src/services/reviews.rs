//! Review service.

use std::sync::Arc;

use nagoyameshi_core::StoreId;

use crate::db::{RepositoryError, ReviewRepository};
use crate::models::Review;

/// Read-side access to store reviews.
#[derive(Clone)]
pub struct ReviewService {
    reviews: Arc<dyn ReviewRepository>,
}

impl ReviewService {
    /// Create a new review service.
    #[must_use]
    pub fn new(reviews: Arc<dyn ReviewRepository>) -> Self {
        Self { reviews }
    }

    /// Reviews for `store_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn reviews_for_store(&self, store_id: StoreId) -> Result<Vec<Review>, RepositoryError> {
        self.reviews.find_by_store_newest_first(store_id).await
    }
}
