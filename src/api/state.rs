use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::error::{AppError, AppResult};
use crate::models::MovieData;
use crate::services::{ArtifactLoader, MetadataProvider};

/// Default request body cap
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    max_body_bytes: usize,
}

/// Artifacts are written at most once; an empty cell is the unloaded state
struct AppStateInner {
    data: OnceCell<MovieData>,
    loader: Option<ArtifactLoader>,
    provider: Arc<dyn MetadataProvider>,
}

impl AppState {
    /// Creates an unloaded state that loads through `loader`
    pub fn new(loader: ArtifactLoader, provider: Arc<dyn MetadataProvider>) -> Self {
        Self::build(OnceCell::new(), Some(loader), provider)
    }

    /// Creates a state around already-loaded artifacts
    pub fn with_data(data: MovieData, provider: Arc<dyn MetadataProvider>) -> Self {
        Self::build(OnceCell::from(data), None, provider)
    }

    /// Creates a state with no artifacts and no way to load them
    pub fn unloaded(provider: Arc<dyn MetadataProvider>) -> Self {
        Self::build(OnceCell::new(), None, provider)
    }

    fn build(
        data: OnceCell<MovieData>,
        loader: Option<ArtifactLoader>,
        provider: Arc<dyn MetadataProvider>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                data,
                loader,
                provider,
            }),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Overrides the request body cap
    pub fn with_body_limit(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// Loads the artifacts once. Concurrent callers wait on the same attempt;
    /// after a success every call returns `true` without touching disk.
    /// A failed attempt leaves the state unloaded.
    pub async fn load(&self) -> bool {
        let Some(loader) = self.inner.loader.as_ref() else {
            return self.is_loaded();
        };

        match self
            .inner
            .data
            .get_or_try_init(|| loader.load_data())
            .await
        {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load movie data");
                false
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.data.initialized()
    }

    pub fn data(&self) -> Option<&MovieData> {
        self.inner.data.get()
    }

    /// Loaded artifacts, or `AppError::Unloaded`
    pub fn require_data(&self) -> AppResult<&MovieData> {
        self.data().ok_or(AppError::Unloaded)
    }

    pub fn provider(&self) -> &dyn MetadataProvider {
        self.inner.provider.as_ref()
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }
}
