use crate::api::models::{Review, is_valid_location};
use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use tracing::warn;

/// Load the startup review dataset from a CSV file.
///
/// Columns: `ReviewId`, `Location`, `Timestamp`, `ReviewBody`. A malformed
/// row (bad timestamp, missing column) aborts the load; a row with a
/// location outside the allow-list is skipped with a warning so the store
/// invariant holds from the first request.
pub fn load_reviews(path: &Path) -> Result<Vec<Review>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open review dataset {}", path.display()))?;
    parse_reviews(file).with_context(|| format!("failed to parse {}", path.display()))
}

fn parse_reviews<R: Read>(reader: R) -> Result<Vec<Review>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut reviews = Vec::new();

    for record in csv_reader.deserialize() {
        let review: Review = record.context("malformed dataset row")?;
        if !is_valid_location(&review.location) {
            warn!(
                review_id = %review.review_id,
                location = %review.location,
                "Skipping dataset row with unknown location"
            );
            continue;
        }
        reviews.push(review);
    }

    Ok(reviews)
}
