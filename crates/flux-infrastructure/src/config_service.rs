//! Configuration service implementation.
//!
//! This module provides a ConfigService that loads the search configuration
//! from a TOML file (~/.config/flux/search.toml by default) and layers
//! secrets from the environment on top.

use flux_core::config::SearchConfig;
use flux_core::error::{Result, SearchError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Environment variable overriding the configured mode.
pub const ENV_MODE: &str = "FLUX_SEARCH_MODE";
/// Environment variable supplying the hash-scan bearer token.
pub const ENV_HASH_SCAN_TOKEN: &str = "FLUX_HASH_SCAN_TOKEN";
/// Environment variable supplying the REST table API key.
pub const ENV_REST_TABLE_KEY: &str = "FLUX_REST_TABLE_KEY";

/// Returns the default configuration file: `<config_dir>/flux/search.toml`.
pub fn default_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| SearchError::config("Could not determine config directory"))?;
    Ok(config_dir.join("flux").join("search.toml"))
}

/// Configuration service that loads and caches the search configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<SearchConfig>>>,
}

impl ConfigService {
    /// Creates a service reading the given file.
    ///
    /// The file is read lazily on first access.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a service reading the platform default location.
    pub fn with_default_path() -> Result<Self> {
        Ok(Self::new(default_config_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the configuration, loading from file if not cached.
    ///
    /// A missing file yields the default configuration; environment
    /// overrides are applied in both cases.
    pub async fn get_config(&self) -> Result<SearchConfig> {
        // Check if already cached
        {
            let cached = self.config.read().await;
            if let Some(ref config) = *cached {
                return Ok(config.clone());
            }
        }

        let mut loaded = self.load_file().await?;
        apply_env_overrides(&mut loaded, |name| std::env::var(name).ok())?;

        let mut cached = self.config.write().await;
        *cached = Some(loaded.clone());
        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub async fn invalidate_cache(&self) {
        let mut cached = self.config.write().await;
        *cached = None;
    }

    async fn load_file(&self) -> Result<SearchConfig> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                tracing::debug!(path = %self.path.display(), "Loaded search configuration");
                SearchConfig::from_toml_str(&content).map_err(|e| {
                    SearchError::config(format!("{}: {}", self.path.display(), e))
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    path = %self.path.display(),
                    "No search configuration file, using defaults"
                );
                Ok(SearchConfig::default())
            }
            Err(e) => Err(SearchError::config(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

/// Layers environment values over a loaded configuration.
///
/// Secrets only fill empty fields, so a value in the file wins. The mode
/// override always wins.
pub fn apply_env_overrides<F>(config: &mut SearchConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(mode) = lookup(ENV_MODE) {
        config.mode = mode.parse()?;
    }

    if let Some(hash_scan) = config.hash_scan.as_mut()
        && hash_scan.token.is_empty()
        && let Some(token) = lookup(ENV_HASH_SCAN_TOKEN)
    {
        hash_scan.token = token;
    }

    if let Some(rest_table) = config.rest_table.as_mut()
        && rest_table.key.is_empty()
        && let Some(key) = lookup(ENV_REST_TABLE_KEY)
    {
        rest_table.key = key;
    }

    Ok(())
}
