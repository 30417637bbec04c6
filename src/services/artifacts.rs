//! Artifact acquisition and loading
//!
//! The catalog and similarity matrix are read from local files. Missing files are
//! fetched once from the remote blob store, which answers large downloads with an
//! HTML confirmation page instead of the payload. A response is treated as that
//! page when it is labelled `text/html` or its first chunk looks like markup. The
//! confirmation token is scraped from at most [`MAX_INTERSTITIAL_BYTES`] of it and
//! the request reissued with the token.

use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
    time::Duration,
};

use regex::Regex;
use reqwest::{header::CONTENT_TYPE, Client as HttpClient, Response};
use serde::de::DeserializeOwned;
use tokio::{
    fs::{self, File},
    io::{AsyncWriteExt, BufWriter},
};
use tracing::instrument;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{Catalog, MovieData, SimilarityMatrix},
};

const CHUNK_SIZE: usize = 32 * 1024;
/// Upper bound on how much of a confirmation page is buffered
pub const MAX_INTERSTITIAL_BYTES: usize = 1024 * 1024;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

static CONFIRM_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"confirm=([^&"'\s<>]+)"#).expect("valid confirm regex"));
static CONFIRM_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"name="confirm"\s+value="([^"]+)""#).expect("valid confirm field regex")
});

/// A named artifact: where it lives locally and its id in the remote store
#[derive(Debug, Clone)]
pub struct ArtifactSpec {
    pub name: String,
    pub remote_id: String,
    pub local_path: PathBuf,
}

impl ArtifactSpec {
    pub fn new(
        name: impl Into<String>,
        remote_id: impl Into<String>,
        local_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            remote_id: remote_id.into(),
            local_path: local_path.into(),
        }
    }
}

/// What the first response of a download turned out to be
enum FirstResponse {
    /// `head` is the chunk already pulled off `response` while sniffing it
    Payload { head: Vec<u8>, response: Response },
    Interstitial { token: String },
}

#[derive(Clone)]
pub struct ArtifactLoader {
    http_client: HttpClient,
    download_base_url: String,
    catalog: ArtifactSpec,
    similarity: ArtifactSpec,
}

impl ArtifactLoader {
    pub fn new(
        download_base_url: String,
        catalog: ArtifactSpec,
        similarity: ArtifactSpec,
    ) -> AppResult<Self> {
        // No overall timeout: artifacts can be large
        let http_client = HttpClient::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            http_client,
            download_base_url,
            catalog,
            similarity,
        })
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::new(
            config.download_base_url.clone(),
            ArtifactSpec::new(
                "movie_list",
                config.movie_list_remote_id.clone(),
                &config.movie_list_path,
            ),
            ArtifactSpec::new(
                "similarity",
                config.similarity_remote_id.clone(),
                &config.similarity_path,
            ),
        )
    }

    /// Makes sure the artifact exists locally, downloading it if absent.
    /// An existing file is trusted as-is.
    pub async fn ensure_local(&self, artifact: &ArtifactSpec) -> bool {
        if fs::try_exists(&artifact.local_path).await.unwrap_or(false) {
            tracing::debug!(artifact = %artifact.name, path = %artifact.local_path.display(), "Artifact present locally");
            return true;
        }

        match self.download(artifact).await {
            Ok(bytes) => {
                tracing::info!(
                    artifact = %artifact.name,
                    path = %artifact.local_path.display(),
                    bytes,
                    "Artifact downloaded"
                );
                true
            }
            Err(e) => {
                tracing::error!(artifact = %artifact.name, error = %e, "Artifact download failed");
                false
            }
        }
    }

    /// Ensures both artifacts are present and deserializes them
    #[instrument(name = "load_artifacts", skip(self))]
    pub async fn load_data(&self) -> AppResult<MovieData> {
        for artifact in [&self.catalog, &self.similarity] {
            if !self.ensure_local(artifact).await {
                return Err(AppError::Artifact(format!(
                    "{} unavailable at {}",
                    artifact.name,
                    artifact.local_path.display()
                )));
            }
        }

        tracing::info!("Loading movie data...");
        let catalog: Catalog = read_json(&self.catalog.local_path).await?;

        tracing::info!("Loading similarity data...");
        let similarity: SimilarityMatrix = read_json(&self.similarity.local_path).await?;

        let data = MovieData::new(catalog, similarity)?;
        tracing::info!(total_movies = data.total_movies(), "Movie data loaded");
        Ok(data)
    }

    #[instrument(name = "artifact_download", skip(self, artifact), fields(artifact = %artifact.name, remote_id = %artifact.remote_id))]
    async fn download(&self, artifact: &ArtifactSpec) -> AppResult<u64> {
        tracing::info!(path = %artifact.local_path.display(), "Downloading artifact");

        let (head, response) = match self.request(&artifact.remote_id, None).await? {
            FirstResponse::Payload { head, response } => (head, response),
            FirstResponse::Interstitial { token } => {
                tracing::info!("Confirmation page received, retrying with token");
                match self.request(&artifact.remote_id, Some(&token)).await? {
                    FirstResponse::Payload { head, response } => (head, response),
                    FirstResponse::Interstitial { .. } => {
                        return Err(AppError::ExternalApi(
                            "download still asks for confirmation after token retry".to_string(),
                        ));
                    }
                }
            }
        };

        let partial = part_path(&artifact.local_path);
        match write_body(head, response, &partial).await {
            Ok(bytes) => {
                fs::rename(&partial, &artifact.local_path).await?;
                Ok(bytes)
            }
            Err(e) => {
                let _ = fs::remove_file(&partial).await;
                Err(e)
            }
        }
    }

    async fn request(&self, remote_id: &str, confirm: Option<&str>) -> AppResult<FirstResponse> {
        let mut query = vec![("id", remote_id), ("export", "download")];
        if let Some(token) = confirm {
            query.push(("confirm", token));
        }

        let mut response = self
            .http_client
            .get(&self.download_base_url)
            .query(&query)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "blob store returned status {}",
                response.status()
            )));
        }

        let labelled_html = is_html(&response);
        let head = response
            .chunk()
            .await?
            .map(|chunk| chunk.to_vec())
            .unwrap_or_default();

        if !labelled_html && !looks_like_markup(&head) {
            return Ok(FirstResponse::Payload { head, response });
        }

        let body = read_capped(head, response, MAX_INTERSTITIAL_BYTES).await?;
        match extract_confirm_token(&body) {
            Some(token) => Ok(FirstResponse::Interstitial { token }),
            None => Err(AppError::ExternalApi(
                "blob store returned an HTML page without a confirmation token".to_string(),
            )),
        }
    }
}

fn is_html(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_ascii_lowercase().starts_with("text/html"))
        .unwrap_or(false)
}

/// Content sniffing for servers that mislabel the confirmation page
fn looks_like_markup(head: &[u8]) -> bool {
    let start = head
        .iter()
        .position(|byte| !byte.is_ascii_whitespace())
        .unwrap_or(head.len());
    let prefix: Vec<u8> = head[start..]
        .iter()
        .take(16)
        .map(u8::to_ascii_lowercase)
        .collect();

    prefix.starts_with(b"<!doctype html") || prefix.starts_with(b"<html")
}

async fn read_capped(mut buffer: Vec<u8>, mut response: Response, cap: usize) -> AppResult<String> {
    while buffer.len() < cap {
        match response.chunk().await? {
            Some(chunk) => buffer.extend_from_slice(&chunk),
            None => break,
        }
    }
    buffer.truncate(cap);

    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Pulls the confirmation token out of an interstitial page
pub fn extract_confirm_token(body: &str) -> Option<String> {
    CONFIRM_PARAM
        .captures(body)
        .or_else(|| CONFIRM_FIELD.captures(body))
        .map(|captures| captures[1].to_string())
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

async fn write_body(head: Vec<u8>, mut response: Response, path: &Path) -> AppResult<u64> {
    let file = File::create(path).await?;
    let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);

    writer.write_all(&head).await?;
    let mut written = head.len() as u64;

    while let Some(chunk) = response.chunk().await? {
        writer.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    writer.flush().await?;
    Ok(written)
}

async fn read_json<T>(path: &Path) -> AppResult<T>
where
    T: DeserializeOwned + Send + 'static,
{
    let bytes = fs::read(path).await?;
    let display = path.display().to_string();

    tokio::task::spawn_blocking(move || serde_json::from_slice::<T>(&bytes))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(|e| AppError::Artifact(format!("failed to parse {}: {}", display, e)))
}
