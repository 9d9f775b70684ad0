//! Command handlers grouped by concern, plus the file readers they share.

pub(crate) mod engine;
pub(crate) mod legacy;
pub(crate) mod tokens;

use std::path::Path;

use anyhow::Context;
use livery_tokens::{OverrideDocument, TokenDocument, parse_document, parse_overrides};
use serde_json::Value;

use crate::error::{CliError, CliResult};

/// Read a JSON file; unreadable files are failures, malformed JSON is a
/// validation error.
pub(crate) fn read_json(path: &Path) -> CliResult<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))
        .map_err(CliError::failure)?;
    serde_json::from_str(&text).map_err(|err| {
        CliError::validation(format!("{} is not valid JSON: {err}", path.display()))
    })
}

pub(crate) fn load_document(path: &Path) -> CliResult<TokenDocument> {
    Ok(parse_document(read_json(path)?)?)
}

pub(crate) fn load_overrides(path: Option<&Path>) -> CliResult<Option<OverrideDocument>> {
    path.map(|path| -> CliResult<OverrideDocument> { Ok(parse_overrides(read_json(path)?)?) })
        .transpose()
}
