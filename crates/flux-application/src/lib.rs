//! Application layer for Flux search.
//!
//! [`SearchCoordinator`] owns the query session: it tokenizes queries, runs
//! them against the configured backend, discards superseded results and
//! publishes the resulting [`flux_core::search::SearchState`].

pub mod intersection;
pub mod search_coordinator;

pub use intersection::intersect_id_sets;
pub use search_coordinator::{PendingSearch, SearchBackend, SearchCoordinator};
