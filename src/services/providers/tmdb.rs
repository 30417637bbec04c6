//! TMDB metadata provider
//!
//! Looks up `/movie/{id}` for poster artwork and the average vote. Every failure
//! mode collapses into a placeholder so a recommendation request never aborts on
//! enrichment.

use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::{Deserialize, Deserializer};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{MovieMetadata, Rating},
    services::providers::{MetadataProvider, ERROR_POSTER, NO_API_KEY_POSTER, NO_POSTER},
};

const LANGUAGE: &str = "en-US";

#[derive(Debug, Deserialize)]
struct TmdbMovie {
    #[serde(default)]
    poster_path: Option<String>,
    /// Outer `None` when the field is absent, `Some(None)` when it is `null`
    #[serde(default, deserialize_with = "present")]
    vote_average: Option<Option<f64>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: Option<String>,
    api_url: String,
    image_base_url: String,
}

impl TmdbProvider {
    pub fn new(
        api_key: Option<String>,
        api_url: String,
        image_base_url: String,
        timeout: Duration,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            api_url,
            image_base_url,
        })
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::new(
            config.tmdb_api_key.clone(),
            config.tmdb_api_url.clone(),
            config.tmdb_image_base_url.clone(),
            Duration::from_secs(config.metadata_timeout_secs),
        )
    }

    fn poster_url(&self, poster_path: &str) -> String {
        format!(
            "{}/{}",
            self.image_base_url.trim_end_matches('/'),
            poster_path.trim_start_matches('/')
        )
    }

    /// A missing `vote_average` reads as "N/A"; an explicit `null` is not a
    /// rating at all and fails the lookup.
    fn convert_api_response(&self, movie: TmdbMovie) -> AppResult<MovieMetadata> {
        let rating = match movie.vote_average {
            None => Rating::NotAvailable,
            Some(Some(vote_average)) => Rating::from_vote_average(vote_average),
            Some(None) => {
                return Err(AppError::ExternalApi(
                    "TMDB returned a null vote_average".to_string(),
                ))
            }
        };

        let poster_url = match movie.poster_path.as_deref() {
            Some(path) if !path.is_empty() => self.poster_url(path),
            _ => NO_POSTER.to_string(),
        };

        Ok(MovieMetadata { poster_url, rating })
    }

    async fn lookup(&self, api_key: &str, movie_id: i64) -> AppResult<MovieMetadata> {
        let url = format!("{}/movie/{}", self.api_url.trim_end_matches('/'), movie_id);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", api_key), ("language", LANGUAGE)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}",
                response.status()
            )));
        }

        let movie: TmdbMovie = response.json().await?;
        self.convert_api_response(movie)
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn fetch_metadata(&self, movie_id: i64) -> MovieMetadata {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!(movie_id, "TMDB_API_KEY not set, using placeholder images");
            return MovieMetadata::placeholder(NO_API_KEY_POSTER);
        };

        match self.lookup(api_key, movie_id).await {
            Ok(metadata) => {
                tracing::debug!(movie_id, provider = self.name(), "Metadata fetched");
                metadata
            }
            Err(e) => {
                tracing::warn!(movie_id, error = %e, provider = self.name(), "Metadata lookup failed");
                MovieMetadata::placeholder(ERROR_POSTER)
            }
        }
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
