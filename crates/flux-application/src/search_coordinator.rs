//! Search coordinator: owns the query session and drives the backends.

use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tokio_util::sync::CancellationToken;

use flux_core::config::{SearchConfig, SearchMode};
use flux_core::error::Result;
use flux_core::search::{MAX_RESULTS, RemoteQueryStrategy, SearchState, SearchStatus};
use flux_core::tokenizer::tokenize;
use flux_core::Document;
use flux_infrastructure::{LocalIndexStore, loader_from_config};
use flux_interaction::RemoteBackend;

use crate::intersection::intersect_id_sets;

/// Where queries are answered, resolved once at construction.
pub enum SearchBackend {
    /// Pre-built index filtered in memory
    Local(Arc<LocalIndexStore>),
    /// External keyword/document store
    Remote(Arc<dyn RemoteQueryStrategy>),
}

/// A search that has been started but whose results are not applied yet.
#[derive(Debug)]
pub struct PendingSearch {
    query: String,
    tokens: Vec<String>,
    cancel: CancellationToken,
}

impl PendingSearch {
    pub fn query(&self) -> &str {
        &self.query
    }

    /// True once a newer search or a reset superseded this one.
    pub fn is_superseded(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Mutable part of the coordinator, guarded by one lock.
#[derive(Default)]
struct QuerySession {
    state: SearchState,
    /// Token of the most recent search; at most one is live
    inflight: Option<CancellationToken>,
}

impl QuerySession {
    fn cancel_inflight(&mut self) {
        if let Some(previous) = self.inflight.take() {
            previous.cancel();
        }
    }
}

/// Coordinates one search box.
///
/// Every search gets a fresh [`CancellationToken`]; starting a search cancels
/// the previous token, and a search only writes state if its own token is
/// still live. State changes are published on a `watch` channel.
pub struct SearchCoordinator {
    backend: SearchBackend,
    session: Mutex<QuerySession>,
    notifier: watch::Sender<SearchState>,
}

impl SearchCoordinator {
    pub fn new(backend: SearchBackend) -> Self {
        let (notifier, _) = watch::channel(SearchState::default());
        Self {
            backend,
            session: Mutex::new(QuerySession::default()),
            notifier,
        }
    }

    /// Coordinator answering from a local index store.
    pub fn local(store: Arc<LocalIndexStore>) -> Self {
        Self::new(SearchBackend::Local(store))
    }

    /// Coordinator answering from a remote store.
    pub fn remote(strategy: Arc<dyn RemoteQueryStrategy>) -> Self {
        Self::new(SearchBackend::Remote(strategy))
    }

    /// Builds the coordinator selected by `config.mode`.
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        config.validate()?;

        match config.mode {
            SearchMode::Local => {
                let loader = loader_from_config(&config.local)?;
                let store = LocalIndexStore::new(Arc::from(loader));
                Ok(Self::local(Arc::new(store)))
            }
            SearchMode::HashScan | SearchMode::RestTable => {
                let backend = RemoteBackend::from_config(config)?;
                tracing::info!(mode = %backend.mode(), "Using remote search backend");
                Ok(Self::remote(Arc::new(backend)))
            }
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self.backend, SearchBackend::Remote(_))
    }

    /// Latest published state.
    pub fn state(&self) -> SearchState {
        self.notifier.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.notifier.subscribe()
    }

    /// Records a new query text and re-evaluates.
    ///
    /// Blank text resets the session without any fetch.
    pub async fn set_query(&self, text: &str) {
        self.run_search(text).await;
    }

    /// Runs a search for `text`, superseding any search still in flight.
    ///
    /// Never fails: errors end up in the published state.
    pub async fn run_search(&self, text: &str) {
        if let Some(pending) = self.begin_search(text).await {
            self.finish_search(pending).await;
        }
    }

    /// First half of [`run_search`](Self::run_search): cancels the previous
    /// search and marks the session as loading.
    ///
    /// Callers that start searches from several tasks call this in query
    /// order and hand the returned [`PendingSearch`] to
    /// [`finish_search`](Self::finish_search). Blank text resets the session
    /// and returns `None`.
    pub async fn begin_search(&self, text: &str) -> Option<PendingSearch> {
        if text.trim().is_empty() {
            self.reset(text).await;
            return None;
        }

        let cancel = self.begin(text).await;
        Some(PendingSearch {
            query: text.to_string(),
            tokens: tokenize(text),
            cancel,
        })
    }

    /// Fetches the results of a begun search and applies them, unless a
    /// newer search started in the meantime.
    pub async fn finish_search(&self, pending: PendingSearch) {
        let PendingSearch {
            query,
            tokens,
            cancel,
        } = pending;

        let outcome = if tokens.is_empty() {
            Ok(Vec::new())
        } else {
            match &self.backend {
                SearchBackend::Local(store) => search_local(store, &tokens).await,
                SearchBackend::Remote(strategy) => {
                    search_remote(strategy.as_ref(), &tokens, &cancel).await
                }
            }
        };

        self.complete(&query, &cancel, outcome).await;
    }

    /// Resets query, results, error and loading state.
    pub async fn clear(&self) {
        self.reset("").await;
    }

    async fn reset(&self, text: &str) {
        let mut session = self.session.lock().await;
        session.cancel_inflight();
        session.state = SearchState {
            query: text.to_string(),
            ..SearchState::default()
        };
        self.publish(&session.state);
    }

    /// Cancels the previous search and marks the session as loading.
    async fn begin(&self, text: &str) -> CancellationToken {
        let mut session = self.session.lock().await;
        session.cancel_inflight();

        let cancel = CancellationToken::new();
        session.inflight = Some(cancel.clone());
        session.state.query = text.to_string();
        session.state.status = SearchStatus::Loading;
        self.publish(&session.state);

        cancel
    }

    /// Applies an outcome unless the search was superseded meanwhile.
    async fn complete(&self, text: &str, cancel: &CancellationToken, outcome: Result<Vec<Document>>) {
        let mut session = self.session.lock().await;
        if cancel.is_cancelled() {
            tracing::debug!(query = %text, "Discarding superseded search");
            return;
        }
        session.inflight = None;

        match outcome {
            Ok(mut docs) => {
                docs.truncate(MAX_RESULTS);
                tracing::debug!(query = %text, results = docs.len(), "Search completed");
                session.state.results = docs;
                session.state.status = SearchStatus::Success;
            }
            Err(e) => match e.user_message() {
                Some(message) => {
                    tracing::error!(query = %text, "Search failed: {}", e);
                    session.state.results.clear();
                    session.state.status = SearchStatus::Error(message.to_string());
                }
                None => {
                    // Cancelled by something other than a newer search
                    tracing::debug!(query = %text, "Search cancelled");
                    session.state.status = SearchStatus::Idle;
                }
            },
        }

        self.publish(&session.state);
    }

    fn publish(&self, state: &SearchState) {
        self.notifier.send_replace(state.clone());
    }
}

async fn search_local(store: &LocalIndexStore, tokens: &[String]) -> Result<Vec<Document>> {
    store.ensure_loaded().await?;
    Ok(store.search(tokens))
}

/// Per-token id lookup, intersection, then hydration of at most
/// [`MAX_RESULTS`] ids.
async fn search_remote(
    strategy: &dyn RemoteQueryStrategy,
    tokens: &[String],
    cancel: &CancellationToken,
) -> Result<Vec<Document>> {
    let sets = strategy.fetch_ids(tokens, cancel).await?;

    let mut ids = intersect_id_sets(&sets);
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    ids.truncate(MAX_RESULTS);

    strategy.fetch_docs(&ids, cancel).await
}
