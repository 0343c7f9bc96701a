use crate::sentiment::{Sentiment, SentimentService};
use crate::storage::ReviewStore;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

/// The fixed set of locations reviews may reference. Requests naming any
/// other value are rejected.
pub const VALID_LOCATIONS: [&str; 18] = [
    "Albuquerque, New Mexico",
    "Carlsbad, California",
    "Chula Vista, California",
    "Colorado Springs, Colorado",
    "Denver, Colorado",
    "El Cajon, California",
    "El Paso, Texas",
    "Escondido, California",
    "Fresno, California",
    "La Mesa, California",
    "Las Vegas, Nevada",
    "Los Angeles, California",
    "Oceanside, California",
    "Phoenix, Arizona",
    "Sacramento, California",
    "Salt Lake City, Utah",
    "San Diego, California",
    "Tucson, Arizona",
];

pub fn is_valid_location(location: &str) -> bool {
    VALID_LOCATIONS.iter().any(|l| *l == location)
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ReviewStore>,
    pub sentiment: Arc<SentimentService>,
}

/// Timestamps use the fixed `YYYY-MM-DD HH:MM:SS` wire format in both the
/// CSV dataset and JSON responses.
pub mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&ts.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// A stored customer review
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Review {
    pub review_id: String,
    pub location: String,
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub review_body: String,
}

/// A review with its per-request sentiment annotation attached
#[derive(Debug, Clone, Serialize)]
pub struct AnnotatedReview {
    #[serde(flatten)]
    pub review: Review,
    pub sentiment: Sentiment,
}

/// Query parameters accepted by `GET /`
#[derive(Debug, Default, Deserialize)]
pub struct ReviewQuery {
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Validated filter derived from a [`ReviewQuery`]
#[derive(Debug, Default)]
pub struct ReviewFilter {
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ReviewQuery {
    /// Validate the query parameters into a filter
    pub fn validate(self) -> Result<ReviewFilter, String> {
        if let Some(location) = &self.location {
            if !is_valid_location(location) {
                return Err("invalid location".to_string());
            }
        }

        let start_date = self
            .start_date
            .map(|s| parse_query_date(&s, "start_date"))
            .transpose()?;
        let end_date = self
            .end_date
            .map(|s| parse_query_date(&s, "end_date"))
            .transpose()?;

        Ok(ReviewFilter {
            location: self.location,
            start_date,
            end_date,
        })
    }
}

fn parse_query_date(value: &str, param: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| format!("invalid {}", param))
}

impl ReviewFilter {
    /// Conjunction of the three optional predicates. Date bounds are
    /// inclusive on both ends and compare calendar dates.
    pub fn matches(&self, review: &Review) -> bool {
        if let Some(location) = &self.location {
            if review.location != *location {
                return false;
            }
        }

        let date = review.timestamp.date();
        if let Some(start) = self.start_date {
            if date < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if date > end {
                return false;
            }
        }

        true
    }
}

/// Form fields accepted by `POST /`. Both are optional at the serde level so
/// that missing fields reach validation instead of a generic rejection.
#[derive(Debug, Deserialize)]
pub struct SubmitReviewRequest {
    #[serde(default, rename = "Location")]
    pub location: Option<String>,
    #[serde(default, rename = "ReviewBody")]
    pub review_body: Option<String>,
}

impl SubmitReviewRequest {
    /// Validate the request, yielding the location and body
    pub fn validate(self) -> Result<(String, String), String> {
        let location = self.location.unwrap_or_default();
        let review_body = self.review_body.unwrap_or_default();

        if location.is_empty() || review_body.is_empty() {
            return Err("Location and ReviewBody are required".to_string());
        }
        if !is_valid_location(&location) {
            return Err("invalid location".to_string());
        }

        Ok((location, review_body))
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub total_reviews: usize,
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
