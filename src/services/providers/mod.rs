//! Movie metadata provider abstraction
//!
//! Enrichment is best-effort: a provider always answers, substituting placeholder
//! artwork and an unavailable rating when the upstream service cannot.

use crate::models::MovieMetadata;

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Poster shown when no API key is configured
pub const NO_API_KEY_POSTER: &str =
    "https://via.placeholder.com/500x750/1a1a1a/ffffff?text=No+API+Key";
/// Poster shown when the movie has no artwork upstream
pub const NO_POSTER: &str = "https://via.placeholder.com/500x750/1a1a1a/ffffff?text=No+Poster";
/// Poster shown when the lookup itself failed
pub const ERROR_POSTER: &str =
    "https://via.placeholder.com/500x750/1a1a1a/ffffff?text=Error+Loading";

/// Trait for movie metadata providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Poster URL and rating for a catalog movie id. Never fails.
    async fn fetch_metadata(&self, movie_id: i64) -> MovieMetadata;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
