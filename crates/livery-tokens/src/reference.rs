//! Reference resolution for `{layer.path}` token values.
//!
//! # Design
//! - The brace syntax is recognised here and nowhere else.
//! - Resolution is lenient: failures return the original string plus a
//!   diagnostic instead of an error, so one bad token never blocks a theme.
//! - A visited-path set and a hop limit guarantee termination.

use std::fmt::{self, Display, Formatter};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::defaults::MAX_REFERENCE_DEPTH;
use crate::model::{TokenDocument, TokenNode, TokenPath};

static REFERENCE_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^\{(.+)\}$").ok());

/// Extract the dotted path from a whole-string reference.
///
/// Returns `None` for anything that is not exactly `{...}`; inline
/// interpolation such as `"pad {x}"` is not a reference.
#[must_use]
pub fn reference_target(text: &str) -> Option<&str> {
    let pattern = REFERENCE_PATTERN.as_ref()?;
    pattern
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|target| target.as_str())
}

/// Whether `value` is a reference string.
#[must_use]
pub fn is_reference(value: &Value) -> bool {
    value.as_str().and_then(reference_target).is_some()
}

/// Why a reference could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// A path segment did not exist.
    Missing {
        /// Path that failed to resolve.
        path: String,
    },
    /// The first segment did not name a layer.
    UnknownLayer {
        /// Offending first segment.
        segment: String,
    },
    /// The chain revisited a path it had already followed.
    Cycle {
        /// Path that closed the cycle.
        path: String,
    },
    /// The chain exceeded the hop limit.
    DepthExceeded {
        /// Hop limit in force.
        limit: usize,
    },
    /// The path addressed a group rather than a leaf.
    NotALeaf {
        /// Path of the group.
        path: String,
    },
}

impl Display for UnresolvedReason {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { path } => write!(formatter, "'{path}' does not exist"),
            Self::UnknownLayer { segment } => write!(formatter, "'{segment}' is not a token layer"),
            Self::Cycle { path } => write!(formatter, "cycle detected at '{path}'"),
            Self::DepthExceeded { limit } => write!(formatter, "more than {limit} hops"),
            Self::NotALeaf { path } => write!(formatter, "'{path}' is a group, not a value"),
        }
    }
}

/// Diagnostic describing a reference that was left unresolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedReference {
    /// Original reference string as written in the document.
    pub reference: String,
    /// Failure cause.
    pub reason: UnresolvedReason,
}

impl Display for UnresolvedReference {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}: {}", self.reference, self.reason)
    }
}

/// Outcome of resolving one value.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Final literal, or the original value when resolution failed.
    pub value: Value,
    /// Diagnostic when the value was left unresolved.
    pub unresolved: Option<UnresolvedReference>,
}

impl Resolution {
    const fn resolved(value: Value) -> Self {
        Self {
            value,
            unresolved: None,
        }
    }
}

/// Resolves references against a single document.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    document: &'a TokenDocument,
    max_depth: usize,
}

impl<'a> Resolver<'a> {
    /// Resolver using the default hop limit.
    #[must_use]
    pub const fn new(document: &'a TokenDocument) -> Self {
        Self {
            document,
            max_depth: MAX_REFERENCE_DEPTH,
        }
    }

    /// Override the hop limit (minimum one hop).
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = if max_depth == 0 { 1 } else { max_depth };
        self
    }

    /// Resolve `value`, following reference chains through the document.
    #[must_use]
    pub fn resolve(&self, value: &Value) -> Resolution {
        let mut visited: Vec<String> = Vec::new();
        let mut current = value;

        loop {
            let Some(target) = current.as_str().and_then(reference_target) else {
                return Resolution::resolved(current.clone());
            };
            if visited.len() >= self.max_depth {
                return self.fail(
                    value,
                    UnresolvedReason::DepthExceeded {
                        limit: self.max_depth,
                    },
                );
            }
            let path = match TokenPath::parse(target) {
                Ok(path) => path,
                Err(segment) => {
                    return self.fail(value, UnresolvedReason::UnknownLayer { segment });
                }
            };
            let dotted = path.to_string();
            if visited.contains(&dotted) {
                return self.fail(value, UnresolvedReason::Cycle { path: dotted });
            }
            match self.document.lookup(&path) {
                None => return self.fail(value, UnresolvedReason::Missing { path: dotted }),
                Some(TokenNode::Group(_)) => {
                    return self.fail(value, UnresolvedReason::NotALeaf { path: dotted });
                }
                Some(TokenNode::Value(next)) => {
                    visited.push(dotted);
                    current = next;
                }
            }
        }
    }

    fn fail(&self, original: &Value, reason: UnresolvedReason) -> Resolution {
        let reference = original
            .as_str()
            .map_or_else(|| original.to_string(), str::to_string);
        warn!(
            theme = %self.document.name,
            reference = %reference,
            reason = %reason,
            "unresolved token reference"
        );
        Resolution {
            value: original.clone(),
            unresolved: Some(UnresolvedReference { reference, reason }),
        }
    }
}

/// Resolve `value` against `document` with the default hop limit.
///
/// Non-strings and non-reference strings come back unchanged; unresolvable
/// references come back as the original string.
#[must_use]
pub fn resolve(value: &Value, document: &TokenDocument) -> Value {
    Resolver::new(document).resolve(value).value
}
