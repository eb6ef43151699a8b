//! Error types for Flux search.

use thiserror::Error;

/// Message shown when the local index could not be loaded.
pub const LOAD_ERROR_MESSAGE: &str = "Could not load search results.";

/// Message shown when a remote search backend failed.
pub const SERVICE_UNAVAILABLE_MESSAGE: &str = "Search service unavailable.";

/// A shared error type for every Flux search layer.
///
/// Cancellation is modelled as a variant so that it can travel through `?`,
/// but it is never surfaced to users: the coordinator drops it silently.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// The local index resource was unreachable or malformed
    #[error("Index load error: {0}")]
    Load(String),

    /// A remote backend was unreachable or answered with a failure
    #[error("Network error{}: {message}", status_suffix(.status))]
    Network {
        status: Option<u16>,
        message: String,
    },

    /// A stored record could not be decoded
    #[error("Parse error: {format} - {message}")]
    Parse {
        format: String, // "JSON", "TOML", etc.
        message: String,
    },

    /// The operation was superseded by a newer query
    #[error("Search cancelled")]
    Cancelled,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SearchError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Load error
    pub fn load(message: impl Into<String>) -> Self {
        Self::Load(message.into())
    }

    /// Creates a Network error without a status code
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            status: None,
            message: message.into(),
        }
    }

    /// Creates a Network error for a non-success HTTP status
    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self::Network {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this error is a cancellation signal rather than a failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Check if this is a load error
    pub fn is_load(&self) -> bool {
        matches!(self, Self::Load(_))
    }

    /// Check if this is a network error
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Returns the generic message presented to users for this error.
    ///
    /// Returns `None` for cancellation, which is not reported at all.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            Self::Cancelled => None,
            Self::Load(_) => Some(LOAD_ERROR_MESSAGE),
            _ => Some(SERVICE_UNAVAILABLE_MESSAGE),
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({s})")).unwrap_or_default()
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for SearchError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid TOML: {err}"))
    }
}

/// A type alias for `Result<T, SearchError>`.
pub type Result<T> = std::result::Result<T, SearchError>;
