use std::collections::BTreeSet;

use anyhow::anyhow;
use livery_tokens::{LegacyColorMap, from_legacy, to_legacy};
use serde_json::Value;
use tracing::{info, warn};

use crate::cli::{LegacyExportArgs, LegacyImportArgs, OutputFormat};
use crate::commands::{load_document, read_json};
use crate::error::{CliError, CliResult};
use crate::output::{render_document, render_legacy_map};

pub(crate) fn handle_legacy_import(
    args: &LegacyImportArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let payload = read_json(&args.file)?;
    let Value::Object(map) = payload else {
        return Err(CliError::validation(format!(
            "{} must contain a JSON object of legacy color keys",
            args.file.display()
        )));
    };
    let legacy = LegacyColorMap::from(map);
    let unknown = unmapped_color_keys(&legacy);
    if !unknown.is_empty() {
        warn!(keys = ?unknown, "legacy keys without a token mapping were ignored");
    }

    let document = from_legacy(&legacy);
    info!(theme = %document.name, keys = legacy.len(), "imported legacy color map");
    render_document(&document, format)
}

fn unmapped_color_keys(legacy: &LegacyColorMap) -> Vec<&str> {
    let mapped: BTreeSet<&str> = legacy.color_keys().collect();
    legacy
        .0
        .keys()
        .map(String::as_str)
        .filter(|key| key.starts_with("color_") && !mapped.contains(key))
        .collect()
}

pub(crate) fn handle_legacy_export(
    args: &LegacyExportArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let document = load_document(&args.document)?;
    let legacy = to_legacy(&document);
    if legacy.is_empty() {
        return Err(CliError::failure(anyhow!(
            "theme '{}' has no tokens that map onto legacy keys",
            document.name
        )));
    }
    render_legacy_map(&legacy, format)
}
