//! CLI error type and its mapping onto process exit codes.

use livery_engine::EngineError;
use livery_tokens::TokenError;

/// Failure raised by a command handler.
#[derive(Debug)]
pub(crate) enum CliError {
    /// A check ran to completion and reported a failing result.
    Check(String),
    /// Input was rejected before any work happened.
    Validation(String),
    /// The command could not be carried out.
    Failure(anyhow::Error),
}

pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn check(message: impl Into<String>) -> Self {
        Self::Check(message.into())
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Check(_) => 1,
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Check(message) | Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl From<TokenError> for CliError {
    fn from(error: TokenError) -> Self {
        Self::Validation(error.detail())
    }
}

impl From<EngineError> for CliError {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::Structural { source } => Self::from(source),
            EngineError::InvalidThemeName { ref name, reason } => {
                Self::Validation(format!("{error}: '{name}' {reason}"))
            }
            EngineError::Config {
                field,
                reason,
                ref value,
            } => match value {
                Some(value) => {
                    Self::Validation(format!("{error}: {field} {reason} (got {value})"))
                }
                None => Self::Validation(format!("{error}: {field} {reason}")),
            },
            EngineError::Source { ref theme, .. } => {
                let context = format!("failed to load theme '{theme}'");
                Self::Failure(anyhow::Error::new(error).context(context))
            }
            other => Self::Failure(anyhow::Error::new(other)),
        }
    }
}
