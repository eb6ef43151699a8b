//! Loaders for the pre-built local index.

use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;

use flux_core::config::LocalIndexConfig;
use flux_core::error::{Result, SearchError};
use flux_core::search::IndexLoader;
use flux_core::SearchIndex;

/// Fetches the index over HTTP from the site that published it.
#[derive(Clone)]
pub struct HttpIndexLoader {
    client: Client,
    url: String,
}

impl HttpIndexLoader {
    /// Creates a loader for a full index URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    /// Reuses an existing HTTP client (connection pool, timeouts).
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl IndexLoader for HttpIndexLoader {
    async fn load(&self) -> Result<SearchIndex> {
        tracing::debug!(url = %self.url, "Fetching search index");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| SearchError::load(format!("Failed to fetch {}: {}", self.url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::load(format!(
                "Failed to load local index ({}) from {}",
                status, self.url
            )));
        }

        response
            .json::<SearchIndex>()
            .await
            .map_err(|e| SearchError::load(format!("Malformed index at {}: {}", self.url, e)))
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Reads the index from a JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileIndexLoader {
    path: PathBuf,
}

impl FileIndexLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl IndexLoader for FileIndexLoader {
    async fn load(&self) -> Result<SearchIndex> {
        tracing::debug!(path = %self.path.display(), "Reading search index");

        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            SearchError::load(format!("Failed to read {}: {}", self.path.display(), e))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            SearchError::load(format!("Malformed index at {}: {}", self.path.display(), e))
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Builds the loader selected by the `[local]` configuration section.
///
/// A file path takes precedence over a base URL.
pub fn loader_from_config(config: &LocalIndexConfig) -> Result<Box<dyn IndexLoader>> {
    if let Some(path) = &config.index_path {
        return Ok(Box::new(FileIndexLoader::new(path.clone())));
    }

    config
        .index_url()
        .map(|url| Box::new(HttpIndexLoader::new(url)) as Box<dyn IndexLoader>)
        .ok_or_else(|| SearchError::config("local mode requires [local] base_url or index_path"))
}
