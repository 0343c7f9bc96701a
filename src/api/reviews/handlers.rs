use crate::api::models::*;
use axum::{
    Form, Json,
    extract::{Query, State, rejection::FormRejection},
    http::StatusCode,
};
use chrono::Local;
use tracing::info;
use uuid::Uuid;

/// List stored reviews, filtered by the optional query parameters and
/// annotated with sentiment scores, sorted by compound score descending.
pub async fn list_reviews_handler(
    State(state): State<AppState>,
    Query(query): Query<ReviewQuery>,
) -> Result<Json<Vec<AnnotatedReview>>, AppError> {
    // Validate
    let filter = query.validate().map_err(AppError::BadRequest)?;

    let reviews = state.store.snapshot().await;
    let total = reviews.len();

    // Filter & annotate
    let mut results: Vec<AnnotatedReview> = reviews
        .into_iter()
        .filter(|review| filter.matches(review))
        .map(|review| {
            let sentiment = state.sentiment.analyze(&review.review_body);
            AnnotatedReview { review, sentiment }
        })
        .collect();

    // Stable sort, so tie order is deterministic across identical requests
    results.sort_by(|a, b| b.sentiment.compound.total_cmp(&a.sentiment.compound));

    info!(matched = results.len(), total, "Review query complete");

    Ok(Json(results))
}

/// Accept a new review submission
pub async fn submit_review_handler(
    State(state): State<AppState>,
    form: Result<Form<SubmitReviewRequest>, FormRejection>,
) -> Result<(StatusCode, Json<Review>), AppError> {
    // A body that cannot be read or decoded as a form is an unexpected
    // failure, not a validation error
    let Form(request) = form.map_err(|e| AppError::Internal(e.body_text()))?;

    // Validate
    let (location, review_body) = request.validate().map_err(AppError::BadRequest)?;

    let review = Review {
        review_id: Uuid::new_v4().to_string(),
        location,
        timestamp: Local::now().naive_local(),
        review_body,
    };

    info!(
        review_id = %review.review_id,
        location = %review.location,
        "Review submitted"
    );

    state.store.append(review.clone()).await;

    Ok((StatusCode::CREATED, Json(review)))
}

#[cfg(test)]
mod tests {
    use crate::api;
    use crate::api::models::{AppState, ErrorResponse, Review, timestamp_format};
    use crate::sentiment::SentimentService;
    use crate::storage::ReviewStore;
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use chrono::NaiveDateTime;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn review(id: &str, location: &str, timestamp: &str, body: &str) -> Review {
        Review {
            review_id: id.to_string(),
            location: location.to_string(),
            timestamp: NaiveDateTime::parse_from_str(timestamp, timestamp_format::FORMAT)
                .unwrap(),
            review_body: body.to_string(),
        }
    }

    fn seeded_app() -> Router {
        let reviews = vec![
            review(
                "r1",
                "Denver, Colorado",
                "2023-01-04 09:15:42",
                "Fantastic experience, the team went above and beyond.",
            ),
            review(
                "r2",
                "Denver, Colorado",
                "2023-01-28 18:02:07",
                "Mediocre at best. Slow service and cold food.",
            ),
            review(
                "r3",
                "Phoenix, Arizona",
                "2023-02-10 16:55:01",
                "Terrible parking situation and rude staff.",
            ),
            review(
                "r4",
                "San Diego, California",
                "2022-06-15 12:40:33",
                "Lovely view of the harbor, we will definitely come back!",
            ),
        ];
        let state = AppState {
            store: Arc::new(ReviewStore::new(reviews)),
            sentiment: Arc::new(SentimentService::new()),
        };
        api::router(state)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        send(app, request).await
    }

    fn post_form(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn get_returns_all_reviews_sorted_by_sentiment() {
        let (status, body) = get(seeded_app(), "/").await;
        assert_eq!(status, StatusCode::OK);

        let reviews: Vec<serde_json::Value> = serde_json::from_slice(&body).unwrap();
        assert_eq!(reviews.len(), 4);

        for review in &reviews {
            let compound = review["sentiment"]["compound"].as_f64().unwrap();
            assert!((-1.0..=1.0).contains(&compound));
        }
        for pair in reviews.windows(2) {
            let a = pair[0]["sentiment"]["compound"].as_f64().unwrap();
            let b = pair[1]["sentiment"]["compound"].as_f64().unwrap();
            assert!(a >= b, "results not sorted: {} < {}", a, b);
        }
    }

    #[tokio::test]
    async fn get_filters_by_location() {
        let (status, body) = get(seeded_app(), "/?location=Denver,%20Colorado").await;
        assert_eq!(status, StatusCode::OK);

        let reviews: Vec<serde_json::Value> = serde_json::from_slice(&body).unwrap();
        assert_eq!(reviews.len(), 2);
        for review in &reviews {
            assert_eq!(review["Location"], "Denver, Colorado");
        }
    }

    #[tokio::test]
    async fn get_rejects_unknown_location() {
        let (status, body) = get(seeded_app(), "/?location=Atlantis,%20Nowhere").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.error, "invalid location");
    }

    #[tokio::test]
    async fn get_filters_by_inclusive_date_window() {
        let (status, body) =
            get(seeded_app(), "/?start_date=2023-01-01&end_date=2023-01-31").await;
        assert_eq!(status, StatusCode::OK);

        let reviews: Vec<serde_json::Value> = serde_json::from_slice(&body).unwrap();
        assert_eq!(reviews.len(), 2);
        for review in &reviews {
            let timestamp = review["Timestamp"].as_str().unwrap();
            assert!(timestamp.starts_with("2023-01-"));
        }
    }

    #[tokio::test]
    async fn get_rejects_malformed_dates() {
        let (status, body) = get(seeded_app(), "/?start_date=2023/01/01").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.error, "invalid start_date");

        let (status, body) = get(seeded_app(), "/?end_date=31-01-2023").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.error, "invalid end_date");
    }

    #[tokio::test]
    async fn repeated_gets_return_identical_content() {
        let app = seeded_app();
        let (_, first) = get(app.clone(), "/?location=Denver,%20Colorado").await;
        let (_, second) = get(app, "/?location=Denver,%20Colorado").await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn post_creates_review_visible_in_subsequent_get() {
        let app = seeded_app();

        let (status, body) = send(
            app.clone(),
            post_form("Location=Tucson%2C+Arizona&ReviewBody=Wonderful+staff%2C+great+visit!"),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let created: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(created["Location"], "Tucson, Arizona");
        assert_eq!(created["ReviewBody"], "Wonderful staff, great visit!");

        let review_id = created["ReviewId"].as_str().unwrap();
        assert!(!review_id.is_empty());

        let timestamp = created["Timestamp"].as_str().unwrap();
        NaiveDateTime::parse_from_str(timestamp, timestamp_format::FORMAT).unwrap();

        let (status, body) = get(app, "/").await;
        assert_eq!(status, StatusCode::OK);
        let reviews: Vec<serde_json::Value> = serde_json::from_slice(&body).unwrap();
        assert_eq!(reviews.len(), 5);
        assert!(reviews.iter().any(|r| r["ReviewId"] == review_id));
    }

    #[tokio::test]
    async fn post_missing_field_is_rejected() {
        let (status, body) =
            send(seeded_app(), post_form("Location=Denver%2C+Colorado")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.error, "Location and ReviewBody are required");
    }

    #[tokio::test]
    async fn post_unknown_location_is_rejected() {
        let (status, body) = send(
            seeded_app(),
            post_form("Location=Portland%2C+Oregon&ReviewBody=Nice+enough"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.error, "invalid location");
    }

    #[tokio::test]
    async fn unsupported_method_is_405() {
        let request = Request::builder()
            .method("DELETE")
            .uri("/")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(seeded_app(), request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn health_reports_review_count() {
        let (status, body) = get(seeded_app(), "/health").await;
        assert_eq!(status, StatusCode::OK);

        let health: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(health["status"], "healthy");
        assert_eq!(health["total_reviews"], 4);
    }
}
