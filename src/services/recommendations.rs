use futures::future::join_all;

use crate::{
    error::{AppError, AppResult},
    models::{MovieData, Recommendation},
    services::providers::MetadataProvider,
};

/// Number of recommendations returned per query
pub const RECOMMENDATION_COUNT: usize = 5;

/// Catalog rows most similar to the first title matching `query`, best first.
///
/// The top-ranked entry is dropped before taking `limit`; for a well-formed matrix
/// that entry is the anchor itself. Returns an empty list when nothing matches.
pub fn similar_rows(data: &MovieData, query: &str, limit: usize) -> AppResult<Vec<usize>> {
    let Some(anchor) = data.catalog.first_match(query) else {
        return Ok(Vec::new());
    };

    let ranked = data.similarity.ranked(anchor).ok_or_else(|| {
        AppError::Internal(format!("no similarity row for catalog index {}", anchor))
    })?;

    Ok(ranked
        .into_iter()
        .skip(1)
        .take(limit)
        .map(|(index, _)| index)
        .collect())
}

/// Generates enriched recommendations for a free-text movie query
///
/// Failures never escape: an internal error yields an empty list, and a failed
/// metadata lookup degrades that one entry to placeholder artwork.
pub async fn recommend(
    data: &MovieData,
    provider: &dyn MetadataProvider,
    query: &str,
) -> Vec<Recommendation> {
    match try_recommend(data, provider, query).await {
        Ok(recommendations) => recommendations,
        Err(e) => {
            tracing::error!(query = %query, error = %e, "Recommendation failed");
            Vec::new()
        }
    }
}

async fn try_recommend(
    data: &MovieData,
    provider: &dyn MetadataProvider,
    query: &str,
) -> AppResult<Vec<Recommendation>> {
    let rows = similar_rows(data, query, RECOMMENDATION_COUNT)?;
    if rows.is_empty() {
        tracing::info!(query = %query, "No catalog title matches query");
        return Ok(Vec::new());
    }

    let movies = rows
        .into_iter()
        .map(|index| {
            data.catalog.get(index).ok_or_else(|| {
                AppError::Internal(format!("catalog index {} out of range", index))
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    // Lookups run concurrently; join_all keeps input order
    let metadata = join_all(movies.iter().map(|movie| provider.fetch_metadata(movie.movie_id))).await;

    let recommendations: Vec<Recommendation> = movies
        .into_iter()
        .zip(metadata)
        .map(|(movie, metadata)| Recommendation::new(movie.title.clone(), metadata))
        .collect();

    tracing::info!(
        query = %query,
        results = recommendations.len(),
        provider = provider.name(),
        "Recommendations generated"
    );

    Ok(recommendations)
}
