//! Remote backend selection.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use flux_core::config::{SearchConfig, SearchMode};
use flux_core::error::{Result, SearchError};
use flux_core::search::{IdSet, RemoteQueryStrategy};
use flux_core::Document;

use crate::hash_scan::HashScanStore;
use crate::rest_table::RestTableStore;

/// The fixed set of remote stores, chosen once from configuration.
#[derive(Clone)]
pub enum RemoteBackend {
    HashScan(HashScanStore),
    RestTable(RestTableStore),
}

impl RemoteBackend {
    /// Builds the backend for a remote mode.
    ///
    /// Fails for local mode and when the mode's section is missing.
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        match config.mode {
            SearchMode::Local => Err(SearchError::config(
                "local mode has no remote backend",
            )),
            SearchMode::HashScan => config
                .hash_scan
                .clone()
                .map(|section| Self::HashScan(HashScanStore::new(section)))
                .ok_or_else(|| {
                    SearchError::config("remote-a mode requires a [hash_scan] section")
                }),
            SearchMode::RestTable => config
                .rest_table
                .clone()
                .map(|section| Self::RestTable(RestTableStore::new(section)))
                .ok_or_else(|| {
                    SearchError::config("remote-b mode requires a [rest_table] section")
                }),
        }
    }

    pub fn mode(&self) -> SearchMode {
        match self {
            Self::HashScan(_) => SearchMode::HashScan,
            Self::RestTable(_) => SearchMode::RestTable,
        }
    }
}

#[async_trait]
impl RemoteQueryStrategy for RemoteBackend {
    async fn fetch_ids(&self, tokens: &[String], cancel: &CancellationToken) -> Result<Vec<IdSet>> {
        match self {
            Self::HashScan(store) => store.fetch_ids(tokens, cancel).await,
            Self::RestTable(store) => store.fetch_ids(tokens, cancel).await,
        }
    }

    async fn fetch_docs(&self, ids: &[String], cancel: &CancellationToken) -> Result<Vec<Document>> {
        match self {
            Self::HashScan(store) => store.fetch_docs(ids, cancel).await,
            Self::RestTable(store) => store.fetch_docs(ids, cancel).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_resolves_variant() {
        let config = SearchConfig::from_toml_str(
            r#"
            mode = "remote-b"

            [rest_table]
            url = "https://db.example.com"
            key = "anon"
            "#,
        )
        .unwrap();

        let backend = RemoteBackend::from_config(&config).unwrap();
        assert_eq!(backend.mode(), SearchMode::RestTable);
    }

    #[test]
    fn test_from_config_rejects_local_and_missing_section() {
        assert!(RemoteBackend::from_config(&SearchConfig::default()).is_err());

        let config = SearchConfig {
            mode: SearchMode::HashScan,
            ..Default::default()
        };
        assert!(matches!(
            RemoteBackend::from_config(&config),
            Err(SearchError::Config(_))
        ));
    }
}
