use std::path::{Path, PathBuf};

use anyhow::Context;
use livery_engine::{EngineConfig, FileStorage, FileSurface, ThemeEngine};
use tracing::info;

use crate::cli::{ApplyArgs, OutputFormat, RestoreArgs};
use crate::commands::load_overrides;
use crate::error::{CliError, CliResult};
use crate::output::{render_compiled, render_nothing_restored};

/// Subdirectory of the state directory holding persisted keys.
pub(crate) const STORAGE_DIR: &str = "storage";
/// Subdirectory of the state directory holding emitted stylesheets.
pub(crate) const STYLES_DIR: &str = "styles";

fn open_engine(config: EngineConfig, state: &Path) -> CliResult<(ThemeEngine, PathBuf)> {
    let storage_root = state.join(STORAGE_DIR);
    let storage = FileStorage::open(&storage_root)
        .with_context(|| format!("failed to open theme storage at {}", storage_root.display()))
        .map_err(CliError::failure)?;
    let surface = FileSurface::new(state.join(STYLES_DIR));
    let stylesheet = surface.path_for(&config.style_node_id);
    let engine = ThemeEngine::new(config, Box::new(storage), Box::new(surface))?;
    Ok((engine, stylesheet))
}

pub(crate) async fn handle_apply(
    mut config: EngineConfig,
    args: ApplyArgs,
    format: OutputFormat,
) -> CliResult<()> {
    config.theme_root = Some(args.themes);
    let overrides = load_overrides(args.overrides.as_deref())?;
    let (mut engine, stylesheet) = open_engine(config, &args.state)?;

    let document = engine.load_theme(&args.name).await?;
    let compiled = engine.apply_theme(&document, overrides.as_ref())?;
    info!(theme = %compiled.name(), stylesheet = %stylesheet.display(), "stylesheet written");
    render_compiled(compiled, &stylesheet, format)
}

pub(crate) fn handle_restore(
    config: EngineConfig,
    args: &RestoreArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let (mut engine, stylesheet) = open_engine(config, &args.state)?;
    match engine.restore_theme()? {
        Some(compiled) => render_compiled(compiled, &stylesheet, format),
        None => render_nothing_restored(format),
    }
}
