//! Remote search backends.
//!
//! Two interchangeable stores implement
//! [`flux_core::search::RemoteQueryStrategy`]: a hash-scan key-value store and
//! a REST table store. [`RemoteBackend`] selects one of them from
//! configuration.

pub mod backend;
pub mod hash_scan;
mod http;
pub mod rest_table;

pub use backend::RemoteBackend;
pub use hash_scan::HashScanStore;
pub use rest_table::RestTableStore;
