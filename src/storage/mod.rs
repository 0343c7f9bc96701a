pub mod dataset;
pub mod store;

pub use dataset::load_reviews;
pub use store::ReviewStore;
