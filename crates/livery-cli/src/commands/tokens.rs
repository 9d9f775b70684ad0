use livery_engine::EngineConfig;
use livery_tokens::{
    FlattenReport, SizeClass, TokenDocument, audit_contrast, emit_css_with, flatten_with_depth,
    merge, validate_contrast,
};
use tracing::warn;

use crate::cli::{AuditArgs, ContrastArgs, DocumentArgs, OutputFormat};
use crate::commands::{load_document, load_overrides};
use crate::error::{CliError, CliResult};
use crate::output::{render_audit, render_contrast, render_css, render_flatten};

fn compile(
    config: &EngineConfig,
    args: &DocumentArgs,
) -> CliResult<(TokenDocument, FlattenReport)> {
    let base = load_document(&args.document)?;
    let document = match load_overrides(args.overrides.as_deref())? {
        Some(overrides) => merge(&base, &overrides),
        None => base,
    };
    let report = flatten_with_depth(&document, config.max_reference_depth);
    for entry in &report.unresolved {
        warn!(token = %entry.token, reference = %entry.reference, "unresolved reference");
    }
    Ok((document, report))
}

pub(crate) fn handle_flatten(
    config: &EngineConfig,
    args: &DocumentArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let (_, report) = compile(config, args)?;
    render_flatten(&report, format)
}

pub(crate) fn handle_css(
    config: &EngineConfig,
    args: &DocumentArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let (document, report) = compile(config, args)?;
    let css = emit_css_with(&document.name, &report.tokens, &config.css);
    render_css(&document.name, &css, format)
}

pub(crate) fn handle_contrast(args: &ContrastArgs, format: OutputFormat) -> CliResult<()> {
    let report = validate_contrast(
        &args.foreground,
        &args.background,
        SizeClass::from(args.size),
    )?;
    render_contrast(&report, format)?;
    match report.note {
        Some(note) if !report.passes => Err(CliError::check(note)),
        _ => Ok(()),
    }
}

pub(crate) fn handle_audit(
    config: &EngineConfig,
    args: &AuditArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let document = load_document(&args.document)?;
    let report = flatten_with_depth(&document, config.max_reference_depth);
    let entries = audit_contrast(&report.tokens);
    render_audit(&document.name, &entries, format)?;

    let failing: Vec<&str> = entries
        .iter()
        .filter(|entry| !entry.report.passes)
        .map(|entry| entry.label)
        .collect();
    if failing.is_empty() {
        Ok(())
    } else {
        Err(CliError::check(format!(
            "{} of {} pairs below the contrast minimum: {}",
            failing.len(),
            entries.len(),
            failing.join(", ")
        )))
    }
}
