//! Search backend trait definitions.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::document::{Document, SearchIndex};
use crate::error::Result;
use crate::search::IdSet;

/// Source of the pre-built local index.
#[async_trait]
pub trait IndexLoader: Send + Sync {
    /// Fetches and decodes the whole index.
    ///
    /// Any failure (unreachable resource, bad status, malformed JSON) must be
    /// reported as [`crate::SearchError::Load`].
    async fn load(&self) -> Result<SearchIndex>;

    /// Short description of the source for log lines.
    fn describe(&self) -> String;
}

/// A remote keyword/document store.
///
/// Implementations are stateless across calls; credentials and resource names
/// are fixed at construction.
#[async_trait]
pub trait RemoteQueryStrategy: Send + Sync {
    /// Resolves each token to the set of ids whose keyword contains it.
    ///
    /// # Arguments
    /// * `tokens` - Normalized query tokens
    /// * `cancel` - Token of the round-trip this call belongs to
    ///
    /// # Returns
    /// One set per token, in token order. Returns `SearchError::Cancelled`
    /// without touching the network when `cancel` is already cancelled.
    async fn fetch_ids(&self, tokens: &[String], cancel: &CancellationToken)
    -> Result<Vec<IdSet>>;

    /// Retrieves the documents for an ordered id list.
    ///
    /// Ids without a stored record are dropped silently.
    async fn fetch_docs(&self, ids: &[String], cancel: &CancellationToken)
    -> Result<Vec<Document>>;
}
