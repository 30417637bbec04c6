use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use cineai::api::{create_router, AppState};
use cineai::models::{Catalog, Movie, MovieData, MovieMetadata, Rating, SimilarityMatrix};
use cineai::services::MetadataProvider;

/// Deterministic enrichment: poster named after the id, rating id / 10
struct StubProvider;

#[async_trait::async_trait]
impl MetadataProvider for StubProvider {
    async fn fetch_metadata(&self, movie_id: i64) -> MovieMetadata {
        MovieMetadata {
            poster_url: format!("https://posters.test/{}.jpg", movie_id),
            rating: Rating::Score(movie_id as f64 / 10.0),
        }
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

fn movie_data() -> MovieData {
    MovieData::new(
        Catalog::from(vec![
            Movie::new(19995, "Avatar"),
            Movie::new(597, "Titanic"),
            Movie::new(348, "Alien"),
        ]),
        SimilarityMatrix::new(vec![
            vec![1.0, 0.3, 0.6],
            vec![0.3, 1.0, 0.2],
            vec![0.6, 0.2, 1.0],
        ])
        .unwrap(),
    )
    .unwrap()
}

fn large_catalog(count: usize) -> MovieData {
    let movies = (0..count)
        .map(|i| Movie::new(i as i64, format!("Movie {:03}", i)))
        .collect::<Vec<_>>();
    let rows = (0..count)
        .map(|i| (0..count).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();
    MovieData::new(Catalog::from(movies), SimilarityMatrix::new(rows).unwrap()).unwrap()
}

fn loaded_server(data: MovieData) -> TestServer {
    let state = AppState::with_data(data, Arc::new(StubProvider));
    TestServer::new(create_router(state)).unwrap()
}

fn unloaded_server() -> TestServer {
    let state = AppState::unloaded(Arc::new(StubProvider));
    TestServer::new(create_router(state)).unwrap()
}

#[tokio::test]
async fn test_health_before_load() {
    let server = unloaded_server();
    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(
        body,
        json!({
            "status": "healthy",
            "movies_loaded": false,
            "similarity_loaded": false
        })
    );
}

#[tokio::test]
async fn test_health_when_loaded() {
    let server = loaded_server(movie_data());
    let body: Value = server.get("/health").await.json();
    assert_eq!(body["movies_loaded"], true);
    assert_eq!(body["similarity_loaded"], true);
    assert_eq!(body["total_movies"], 3);
}

#[tokio::test]
async fn test_endpoints_report_unloaded() {
    let server = unloaded_server();

    let response = server.get("/api/movies").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({ "error": "Movie data not loaded" }));

    let response = server
        .post("/api/recommend")
        .json(&json!({ "movie": "Avatar" }))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({ "error": "Movie data not loaded" }));
}

#[tokio::test]
async fn test_index_unloaded_renders_error_page() {
    let server = unloaded_server();
    let response = server.get("/").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let html = response.text();
    assert!(html.contains("System Error"));
    assert!(html.contains("Movie data not loaded. Please check server logs for details."));
}

#[tokio::test]
async fn test_index_loaded_renders_app() {
    let server = loaded_server(movie_data());
    let response = server.get("/").await;
    response.assert_status_ok();
    assert!(response.text().contains("Get Recommendations"));
}

#[tokio::test]
async fn test_list_movies_unfiltered_caps_at_fifty() {
    let server = loaded_server(large_catalog(60));
    let titles: Vec<String> = server.get("/api/movies").await.json();
    assert_eq!(titles.len(), 50);
    assert_eq!(titles[0], "Movie 000");
    assert_eq!(titles[49], "Movie 049");

    let titles: Vec<String> = server.get("/api/movies").add_query_param("q", "").await.json();
    assert_eq!(titles.len(), 50);
}

#[tokio::test]
async fn test_list_movies_filtered_caps_at_twenty() {
    let server = loaded_server(large_catalog(60));
    let titles: Vec<String> = server
        .get("/api/movies")
        .add_query_param("q", "MOVIE 0")
        .await
        .json();
    assert_eq!(titles.len(), 20);
    assert!(titles.iter().all(|t| t.to_lowercase().contains("movie 0")));
}

#[tokio::test]
async fn test_list_movies_filter_is_case_insensitive() {
    let server = loaded_server(movie_data());
    let titles: Vec<String> = server
        .get("/api/movies")
        .add_query_param("q", "TAN")
        .await
        .json();
    assert_eq!(titles, vec!["Titanic"]);
}

#[tokio::test]
async fn test_recommend_scenario() {
    let server = loaded_server(movie_data());
    let response = server
        .post("/api/recommend")
        .json(&json!({ "movie": "avatar" }))
        .await;
    response.assert_status_ok();

    response.assert_json(&json!({
        "selected_movie": "avatar",
        "recommendations": [
            { "title": "Alien", "poster": "https://posters.test/348.jpg", "rating": 34.8 },
            { "title": "Titanic", "poster": "https://posters.test/597.jpg", "rating": 59.7 }
        ]
    }));
}

#[tokio::test]
async fn test_recommend_no_match_is_empty_success() {
    let server = loaded_server(movie_data());
    let response = server
        .post("/api/recommend")
        .json(&json!({ "movie": "Zardoz" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["selected_movie"], "Zardoz");
    assert_eq!(body["recommendations"], json!([]));
}

#[tokio::test]
async fn test_recommend_requires_movie() {
    let server = loaded_server(movie_data());

    let response = server.post("/api/recommend").json(&json!({ "movie": "" })).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({ "error": "Movie name is required" }));

    let response = server.post("/api/recommend").json(&json!({})).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recommend_rejects_malformed_json() {
    let server = loaded_server(movie_data());
    let response = server
        .post("/api/recommend")
        .bytes("{not json".into())
        .content_type("application/json")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recommend_rejects_oversized_body() {
    let state = AppState::with_data(movie_data(), Arc::new(StubProvider)).with_body_limit(64);
    let server = TestServer::new(create_router(state)).unwrap();

    let response = server
        .post("/api/recommend")
        .json(&json!({ "movie": "a".repeat(256) }))
        .await;
    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = loaded_server(movie_data());
    let id = "6f1f6b1e-8a3c-4d4e-9a57-0d9f3c1b2a10";
    let response = server
        .get("/health")
        .add_header(
            axum::http::HeaderName::from_static("x-request-id"),
            axum::http::HeaderValue::from_static(id),
        )
        .await;
    assert_eq!(response.header("x-request-id"), id);
}

#[tokio::test]
async fn test_request_id_is_generated_per_request() {
    let server = unloaded_server();
    let first = server.get("/health").await.header("x-request-id");
    let second = server.get("/api/movies").await.header("x-request-id");

    let first = uuid::Uuid::parse_str(first.to_str().unwrap()).unwrap();
    let second = uuid::Uuid::parse_str(second.to_str().unwrap()).unwrap();
    assert_ne!(first, second);
}

#[tokio::test]
async fn test_malformed_request_id_is_replaced() {
    let server = loaded_server(movie_data());
    let response = server
        .get("/health")
        .add_header(
            axum::http::HeaderName::from_static("x-request-id"),
            axum::http::HeaderValue::from_static("not-a-uuid"),
        )
        .await;
    let echoed = response.header("x-request-id");
    assert!(uuid::Uuid::parse_str(echoed.to_str().unwrap()).is_ok());
}
