//! Output renderers and formatting helpers for CLI commands.

use std::path::Path;

use anyhow::anyhow;
use livery_engine::CompiledTheme;
use livery_tokens::{
    AuditEntry, ContrastReport, FlatTokenMap, FlattenReport, LegacyColorMap, TokenDocument,
    flatten,
};
use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::error::{CliError, CliResult};

fn print_json<T: Serialize + ?Sized>(payload: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(payload)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

pub(crate) fn render_flatten(report: &FlattenReport, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&report.tokens)?,
        OutputFormat::Table => {
            print_token_rows(&report.tokens);
            for entry in &report.unresolved {
                println!("unresolved: {} -> {}", entry.token, entry.reference);
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct CssPayload<'a> {
    theme: &'a str,
    css: &'a str,
}

pub(crate) fn render_css(theme: &str, css: &str, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&CssPayload { theme, css })?,
        OutputFormat::Table => print!("{css}"),
    }
    Ok(())
}

pub(crate) fn render_contrast(report: &ContrastReport, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(report)?,
        OutputFormat::Table => {
            println!("foreground: {}", report.foreground);
            println!("background: {}", report.background);
            println!("ratio: {:.2}:1", report.ratio);
            println!("size: {} (minimum {:.1}:1)", report.size, report.threshold);
            println!("result: {}", verdict(report.passes));
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct AuditPayload<'a> {
    theme: &'a str,
    pairs: &'a [AuditEntry],
}

pub(crate) fn render_audit(
    theme: &str,
    entries: &[AuditEntry],
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&AuditPayload {
            theme,
            pairs: entries,
        })?,
        OutputFormat::Table => {
            println!(
                "{:<14} {:<9} {:<9} {:>8} {:<7} RESULT",
                "PAIR", "FG", "BG", "RATIO", "SIZE"
            );
            for entry in entries {
                let report = &entry.report;
                println!(
                    "{:<14} {:<9} {:<9} {:>8} {:<7} {}",
                    entry.label,
                    report.foreground,
                    report.background,
                    format!("{:.2}", report.ratio),
                    report.size.as_str(),
                    verdict(report.passes)
                );
            }
            if entries.is_empty() {
                println!("no auditable slot pairs in {theme}");
            }
        }
    }
    Ok(())
}

pub(crate) fn render_legacy_map(map: &LegacyColorMap, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(map)?,
        OutputFormat::Table => {
            let width = key_width(map.0.keys());
            for (key, value) in &map.0 {
                println!("{key:<width$} {}", display_value(value));
            }
        }
    }
    Ok(())
}

pub(crate) fn render_document(document: &TokenDocument, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&document.to_json())?,
        OutputFormat::Table => {
            println!("name: {}", document.name);
            println!("version: {}", document.version);
            if let Some(origin) = document.meta.get("migrated_from").and_then(Value::as_str) {
                println!("migrated from: {origin}");
            }
            print_token_rows(&flatten(document));
        }
    }
    Ok(())
}

pub(crate) fn render_compiled(
    compiled: &CompiledTheme,
    stylesheet: &Path,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(compiled)?,
        OutputFormat::Table => {
            println!("theme: {}", compiled.name());
            println!("tokens: {}", compiled.flat.len());
            println!("unresolved: {}", compiled.unresolved.len());
            println!("applied: {}", compiled.applied_at.to_rfc3339());
            println!("stylesheet: {}", stylesheet.display());
        }
    }
    Ok(())
}

pub(crate) fn render_nothing_restored(format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&Value::Null)?,
        OutputFormat::Table => println!("no persisted theme to restore"),
    }
    Ok(())
}

fn print_token_rows(tokens: &FlatTokenMap) {
    let width = key_width(tokens.iter().map(|(key, _)| key));
    for (key, value) in tokens {
        println!("{key:<width$} {}", display_value(value));
    }
}

fn key_width<'a>(keys: impl Iterator<Item = &'a String>) -> usize {
    keys.map(String::len).max().unwrap_or(0)
}

pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

pub(crate) const fn verdict(passes: bool) -> &'static str {
    if passes { "pass" } else { "FAIL" }
}
