//! Error types for token document operations.
//!
//! # Design
//! - Keep error messages constant while carrying context fields for debugging.
//! - Only structural and malformed-input failures surface here; unresolved
//!   references are diagnostics, not errors.

use thiserror::Error;

/// Primary error type for token document operations.
#[derive(Debug, Error)]
pub enum TokenError {
    /// A required top-level field was absent from the document.
    #[error("missing required document field")]
    MissingField {
        /// Name of the missing field.
        field: &'static str,
    },
    /// A field was present but carried an unusable value.
    #[error("invalid document field")]
    InvalidField {
        /// Dotted location of the offending field.
        field: String,
        /// Machine-readable reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
    /// A color string could not be parsed as six hex digits.
    #[error("malformed color value")]
    MalformedColor {
        /// Color payload provided by the caller.
        value: String,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// JSON text could not be parsed.
    #[error("invalid token document json")]
    Json {
        /// Source JSON error.
        #[from]
        source: serde_json::Error,
    },
}

impl TokenError {
    pub(crate) fn invalid_field(
        field: impl Into<String>,
        reason: &'static str,
        value: Option<String>,
    ) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason,
            value,
        }
    }

    /// Whether the error stems from the document's structure rather than its
    /// encoding or a color value.
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(self, Self::MissingField { .. } | Self::InvalidField { .. })
    }

    /// Human-readable detail combining the constant message with its context.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::MissingField { field } => format!("{self}: '{field}'"),
            Self::InvalidField {
                field,
                reason,
                value,
            } => match value {
                Some(value) => format!("{self}: '{field}' {reason} (got {value})"),
                None => format!("{self}: '{field}' {reason}"),
            },
            Self::MalformedColor { value, reason } => format!("{self}: '{value}' {reason}"),
            Self::Json { source } => format!("{self}: {source}"),
        }
    }
}

/// Convenience alias for token results.
pub type TokenResult<T> = Result<T, TokenError>;
