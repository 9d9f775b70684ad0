//! # Design
//!
//! - Keep error messages constant while carrying context fields for debugging.
//! - Structural failures wrap [`TokenError`] so callers can inspect the field.
//! - Storage failures are absorbed by the engine during apply; they only
//!   surface from explicit storage calls.

use std::io;
use std::path::PathBuf;

use livery_tokens::TokenError;
use thiserror::Error;

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Result alias for storage backends.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors produced by the theme engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The theme document failed structural validation.
    #[error("theme document failed validation")]
    Structural {
        /// Underlying token error.
        #[from]
        source: TokenError,
    },
    /// A theme could not be fetched from its source.
    #[error("theme source operation failed")]
    Source {
        /// Operation identifier.
        operation: &'static str,
        /// Theme name requested.
        theme: String,
        /// Underlying IO error.
        source: io::Error,
    },
    /// A theme name was unusable for the configured source.
    #[error("invalid theme name")]
    InvalidThemeName {
        /// Offending name.
        name: String,
        /// Static reason for the failure.
        reason: &'static str,
    },
    /// An explicit storage call failed.
    #[error("theme storage operation failed")]
    Storage {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying storage error.
        source: StorageError,
    },
    /// Writing to a style surface failed.
    #[error("style surface operation failed")]
    Surface {
        /// Operation identifier.
        operation: &'static str,
        /// Style node identifier.
        node: String,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Engine configuration was invalid.
    #[error("invalid engine configuration")]
    Config {
        /// Setting that failed validation.
        field: &'static str,
        /// Static reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
}

impl EngineError {
    pub(crate) const fn storage(operation: &'static str, source: StorageError) -> Self {
        Self::Storage { operation, source }
    }

    pub(crate) fn config(field: &'static str, reason: &'static str, value: Option<String>) -> Self {
        Self::Config {
            field,
            reason,
            value,
        }
    }

    /// Whether this error came from document validation.
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(self, Self::Structural { .. })
    }
}

/// Errors produced by theme storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend cannot be used at all.
    #[error("theme storage unavailable")]
    Unavailable {
        /// Static reason for the failure.
        reason: &'static str,
    },
    /// Filesystem access failed.
    #[error("theme storage io failure")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path involved.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// A stored payload could not be encoded or decoded.
    #[error("theme storage serialization failure")]
    Serialize {
        /// Storage key involved.
        key: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn token_errors_convert_to_structural() {
        let err: EngineError = TokenError::MissingField { field: "palette" }.into();
        assert!(err.is_structural());
        assert_eq!(err.to_string(), "theme document failed validation");
        assert!(err.source().is_some());
    }

    #[test]
    fn storage_errors_keep_context() {
        let err = EngineError::storage(
            "storage.write",
            StorageError::Unavailable {
                reason: "read-only",
            },
        );
        assert!(!err.is_structural());
        let source = err.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("theme storage unavailable"));
    }
}
