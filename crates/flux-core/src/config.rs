//! Search configuration model.
//!
//! The configuration selects the search mode once and carries the static
//! credentials and resource names of every backend. Loading from disk lives in
//! `flux-infrastructure`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Result, SearchError};

/// Default key prefix of the hash-scan store (`<prefix>:index`, `<prefix>:docs`).
pub const DEFAULT_HASH_SCAN_PREFIX: &str = "flux";

/// Default base table name of the REST store (`<table>_index`, `<table>_docs`).
pub const DEFAULT_REST_TABLE: &str = "flux_search";

/// Well-known path of the pre-built index relative to the site root.
pub const LOCAL_INDEX_PATH: &str = "/search/index.json";

/// Which backend answers queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Pre-built index fetched once and filtered in memory
    #[default]
    #[serde(rename = "local")]
    Local,
    /// Key-value store queried with hash scans
    #[serde(rename = "remote-a", alias = "hash-scan", alias = "upstash")]
    HashScan,
    /// REST table store queried with filtered reads
    #[serde(rename = "remote-b", alias = "rest-table", alias = "supabase")]
    RestTable,
}

impl SearchMode {
    pub fn is_remote(&self) -> bool {
        !matches!(self, Self::Local)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::HashScan => "remote-a",
            Self::RestTable => "remote-b",
        }
    }
}

impl std::str::FromStr for SearchMode {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "remote-a" | "hash-scan" | "upstash" => Ok(Self::HashScan),
            "remote-b" | "rest-table" | "supabase" => Ok(Self::RestTable),
            other => Err(SearchError::config(format!("unknown search mode '{other}'"))),
        }
    }
}

impl std::fmt::Display for SearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the local index is read from.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LocalIndexConfig {
    /// Site root; the index is fetched from `<base_url>/search/index.json`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Index file on disk, takes precedence over `base_url`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_path: Option<PathBuf>,
}

impl LocalIndexConfig {
    /// Full index URL derived from `base_url`.
    pub fn index_url(&self) -> Option<String> {
        self.base_url
            .as_ref()
            .map(|base| format!("{}{}", base.trim_end_matches('/'), LOCAL_INDEX_PATH))
    }
}

/// Hash-scan key-value store settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HashScanConfig {
    pub url: String,

    #[serde(default)]
    pub token: String,

    /// Key prefix
    #[serde(default = "default_hash_scan_prefix")]
    pub index: String,
}

impl HashScanConfig {
    /// Hash mapping keyword → comma-joined id list.
    pub fn index_key(&self) -> String {
        format!("{}:index", self.index)
    }

    /// Hash mapping id → serialized document.
    pub fn docs_key(&self) -> String {
        format!("{}:docs", self.index)
    }
}

fn default_hash_scan_prefix() -> String {
    DEFAULT_HASH_SCAN_PREFIX.to_string()
}

/// REST table store settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RestTableConfig {
    pub url: String,

    #[serde(default)]
    pub key: String,

    /// Base table name
    #[serde(default = "default_rest_table")]
    pub table: String,
}

impl RestTableConfig {
    /// Keyword index table: rows of `{word, doc_ids}`.
    pub fn index_table(&self) -> String {
        format!("{}_index", self.table)
    }

    /// Document table keyed by `id`.
    pub fn docs_table(&self) -> String {
        format!("{}_docs", self.table)
    }
}

fn default_rest_table() -> String {
    DEFAULT_REST_TABLE.to_string()
}

/// Root search configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SearchConfig {
    #[serde(default)]
    pub mode: SearchMode,

    #[serde(default)]
    pub local: LocalIndexConfig,

    #[serde(default, alias = "upstash", skip_serializing_if = "Option::is_none")]
    pub hash_scan: Option<HashScanConfig>,

    #[serde(default, alias = "supabase", skip_serializing_if = "Option::is_none")]
    pub rest_table: Option<RestTableConfig>,
}

impl SearchConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Checks that the selected mode has everything it needs.
    pub fn validate(&self) -> Result<()> {
        match self.mode {
            SearchMode::Local => {
                if self.local.base_url.is_none() && self.local.index_path.is_none() {
                    return Err(SearchError::config(
                        "local mode requires [local] base_url or index_path",
                    ));
                }
            }
            SearchMode::HashScan => {
                let section = self.hash_scan.as_ref().ok_or_else(|| {
                    SearchError::config("remote-a mode requires a [hash_scan] section")
                })?;
                if section.url.trim().is_empty() {
                    return Err(SearchError::config("[hash_scan] url must not be empty"));
                }
            }
            SearchMode::RestTable => {
                let section = self.rest_table.as_ref().ok_or_else(|| {
                    SearchError::config("remote-b mode requires a [rest_table] section")
                })?;
                if section.url.trim().is_empty() {
                    return Err(SearchError::config("[rest_table] url must not be empty"));
                }
            }
        }
        Ok(())
    }
}
