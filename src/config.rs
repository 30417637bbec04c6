use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// TMDB API key; enrichment falls back to placeholders when unset
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Base URL that poster paths are appended to
    #[serde(default = "default_tmdb_image_base_url")]
    pub tmdb_image_base_url: String,

    /// Per-call timeout for metadata lookups, in seconds
    #[serde(default = "default_metadata_timeout_secs")]
    pub metadata_timeout_secs: u64,

    /// Remote blob store download endpoint
    #[serde(default = "default_download_base_url")]
    pub download_base_url: String,

    #[serde(default = "default_movie_list_path")]
    pub movie_list_path: String,

    #[serde(default = "default_movie_list_remote_id")]
    pub movie_list_remote_id: String,

    #[serde(default = "default_similarity_path")]
    pub similarity_path: String,

    #[serde(default = "default_similarity_remote_id")]
    pub similarity_remote_id: String,

    /// Request body cap in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_base_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_metadata_timeout_secs() -> u64 {
    10
}

fn default_download_base_url() -> String {
    "https://drive.google.com/uc".to_string()
}

fn default_movie_list_path() -> String {
    "movie_list.json".to_string()
}

fn default_movie_list_remote_id() -> String {
    "1oQzIf4RWUnDG43zannvii74BIYDH-aK5".to_string()
}

fn default_similarity_path() -> String {
    "similarity.json".to_string()
}

fn default_similarity_remote_id() -> String {
    "1kbIwDxIk6OGgNrrEJbG3Tvis3F3OTM5Q".to_string()
}

fn default_max_body_bytes() -> usize {
    16 * 1024 * 1024
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Address the listener binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
