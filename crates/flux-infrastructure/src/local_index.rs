//! In-memory store for the pre-built local index.

use std::sync::Arc;
use tokio::sync::OnceCell;

use flux_core::error::{Result, SearchError};
use flux_core::search::{IndexLoader, MAX_RESULTS};
use flux_core::Document;

/// Lazily loaded, cached document index.
///
/// The index is fetched at most once. A failed load leaves the store empty
/// so the next query retries; concurrent callers wait on the same fetch.
pub struct LocalIndexStore {
    loader: Arc<dyn IndexLoader>,
    docs: OnceCell<Vec<Document>>,
}

impl LocalIndexStore {
    pub fn new(loader: Arc<dyn IndexLoader>) -> Self {
        Self {
            loader,
            docs: OnceCell::new(),
        }
    }

    /// Loads the index unless it is already cached.
    ///
    /// # Returns
    ///
    /// The cached documents, or a load error when the fetch failed.
    pub async fn ensure_loaded(&self) -> Result<&[Document]> {
        let docs = self
            .docs
            .get_or_try_init(|| async {
                let index = self.loader.load().await.inspect_err(|e| {
                    tracing::warn!(source = %self.loader.describe(), "Search index load failed: {}", e);
                })?;
                tracing::info!(
                    source = %self.loader.describe(),
                    documents = index.docs.len(),
                    "Search index loaded"
                );
                Ok::<_, SearchError>(index.docs)
            })
            .await?;

        Ok(docs.as_slice())
    }

    pub fn is_loaded(&self) -> bool {
        self.docs.initialized()
    }

    /// Number of cached documents (0 before the first successful load).
    pub fn len(&self) -> usize {
        self.docs.get().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Filters the cached index with AND semantics over `tokens`.
    ///
    /// Keeps index order, stops at [`MAX_RESULTS`]. An empty token list or
    /// an unloaded store yields no results.
    pub fn search(&self, tokens: &[String]) -> Vec<Document> {
        if tokens.is_empty() {
            return Vec::new();
        }

        let Some(docs) = self.docs.get() else {
            return Vec::new();
        };

        docs.iter()
            .filter(|doc| doc.matches_all(tokens))
            .take(MAX_RESULTS)
            .cloned()
            .collect()
    }
}
