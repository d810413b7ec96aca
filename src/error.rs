//! Error types for tiercache
//!
//! All modules use `TierResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for tiercache operations
pub type TierResult<T> = Result<T, TierError>;

/// All errors that can occur in tiercache
#[derive(Error, Debug)]
pub enum TierError {
    // Storage errors
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation not supported by {store}: {operation}")]
    Unsupported {
        store: String,
        operation: &'static str,
    },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Remote request failed: {url}: {reason}")]
    Http { url: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No remote store configured")]
    RemoteNotConfigured,

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl TierError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an unsupported-operation error for a store
    pub fn unsupported(store: impl Into<String>, operation: &'static str) -> Self {
        Self::Unsupported {
            store: store.into(),
            operation,
        }
    }

    /// Whether the error reports a missing identifier
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether the error reports an operation the store does not implement
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::RemoteNotConfigured => {
                Some("Set [remote] in the config file or pass --remote <PATH|URL>")
            }
            Self::ConfigInvalid { .. } => Some("Run: tiercache config show"),
            Self::NotFound(_) => Some("Check the identifier with: tiercache status <ID>"),
            _ => None,
        }
    }
}

impl From<TierError> for std::io::Error {
    fn from(err: TierError) -> Self {
        match err {
            TierError::Io { source, .. } => source,
            TierError::NotFound(id) => {
                std::io::Error::new(std::io::ErrorKind::NotFound, format!("not found: {}", id))
            }
            TierError::Unsupported { .. } => {
                std::io::Error::new(std::io::ErrorKind::Unsupported, err.to_string())
            }
            other => std::io::Error::other(other.to_string()),
        }
    }
}
