use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::request_id::RequestId;
use crate::models::Recommendation;
use crate::services::recommendations;

use super::pages;
use super::AppState;

/// Titles returned by an unfiltered `/api/movies`
pub const BROWSE_LIMIT: usize = 50;
/// Titles returned by a filtered `/api/movies`
pub const SEARCH_LIMIT: usize = 20;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct MoviesQuery {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub movie: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub selected_movie: String,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub movies_loaded: bool,
    pub similarity_loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_movies: Option<usize>,
}

// Handlers

/// Single-page UI, or an error page while the artifacts are missing
pub async fn index(State(state): State<AppState>) -> AppResult<Response> {
    if !state.is_loaded() {
        let html = pages::render_error(pages::UNLOADED_PAGE_MESSAGE)?;
        return Ok((StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response());
    }

    Ok(Html(pages::render_index()?).into_response())
}

/// Catalog titles, optionally filtered by a case-insensitive substring
pub async fn list_movies(
    State(state): State<AppState>,
    Query(params): Query<MoviesQuery>,
) -> AppResult<Json<Vec<String>>> {
    let data = state.require_data()?;

    let titles = match params.q.as_deref().filter(|q| !q.is_empty()) {
        Some(query) => data.catalog.search_titles(query, SEARCH_LIMIT),
        None => data.catalog.titles(BROWSE_LIMIT),
    };

    Ok(Json(titles.into_iter().map(str::to_string).collect()))
}

/// Top similar movies for a title or title fragment
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<RecommendRequest>, JsonRejection>,
) -> AppResult<Json<RecommendResponse>> {
    let data = state.require_data()?;
    let Json(request) = payload?;

    let movie = request.movie.unwrap_or_default();
    if movie.is_empty() {
        return Err(AppError::InvalidInput("Movie name is required".to_string()));
    }

    tracing::info!(request_id = %request_id, movie = %movie, "Processing recommendation request");

    let recommendations = recommendations::recommend(data, state.provider(), &movie).await;

    tracing::info!(
        request_id = %request_id,
        count = recommendations.len(),
        "Recommendation request completed"
    );

    Ok(Json(RecommendResponse {
        selected_movie: movie,
        recommendations,
    }))
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let data = state.data();

    Json(HealthResponse {
        status: "healthy",
        movies_loaded: data.is_some(),
        similarity_loaded: data.is_some(),
        total_movies: data.map(|d| d.total_movies()),
    })
}
