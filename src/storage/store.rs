use crate::api::models::Review;
use tokio::sync::RwLock;
use tracing::info;

/// In-memory review store. Appends take the write lock so concurrent
/// submissions serialize; reads clone a consistent snapshot so a GET never
/// observes a partially mutated list.
pub struct ReviewStore {
    reviews: RwLock<Vec<Review>>,
}

impl ReviewStore {
    pub fn new(initial: Vec<Review>) -> Self {
        Self {
            reviews: RwLock::new(initial),
        }
    }

    /// Consistent snapshot of all stored reviews
    pub async fn snapshot(&self) -> Vec<Review> {
        self.reviews.read().await.clone()
    }

    /// Append a new review
    pub async fn append(&self, review: Review) {
        let mut reviews = self.reviews.write().await;
        info!(review_id = %review.review_id, total = reviews.len() + 1, "Review stored");
        reviews.push(review);
    }

    pub async fn count(&self) -> usize {
        self.reviews.read().await.len()
    }
}
