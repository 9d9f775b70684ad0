//! Argument parsing, logging setup and command dispatch.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use livery_engine::EngineConfig;
use livery_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging};
use livery_tokens::SizeClass;
use tracing::debug;

use crate::commands::engine::{handle_apply, handle_restore};
use crate::commands::legacy::{handle_legacy_export, handle_legacy_import};
use crate::commands::tokens::{handle_audit, handle_contrast, handle_css, handle_flatten};
use crate::error::{CliError, CliResult};

/// Parses CLI arguments, executes the requested command, and reports any
/// failure on stderr. Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let command_name = command_label(&cli.command);

    if let Err(err) = install_logging(&cli) {
        eprintln!("error: {}", err.display_message());
        return err.exit_code();
    }

    match dispatch(cli).await {
        Ok(()) => {
            debug!(command = command_name, "command completed");
            0
        }
        Err(err) => {
            let exit_code = err.exit_code();
            debug!(command = command_name, exit_code, "command failed");
            eprintln!("error: {}", err.display_message());
            exit_code
        }
    }
}

fn install_logging(cli: &Cli) -> CliResult<()> {
    let format = match cli.log_format.as_deref() {
        Some(raw) => raw
            .parse::<LogFormat>()
            .map_err(|_| CliError::validation(format!("unknown log format '{raw}'")))?,
        None => LogFormat::Pretty,
    };
    let config = LoggingConfig {
        level: &cli.log_level,
        format,
        ..LoggingConfig::default()
    };
    init_logging(&config).map_err(CliError::failure)
}

async fn dispatch(cli: Cli) -> CliResult<()> {
    let config = engine_config(cli.config.as_ref())?;
    let format = cli.output;

    match cli.command {
        Command::Flatten(args) => handle_flatten(&config, &args, format),
        Command::Css(args) => handle_css(&config, &args, format),
        Command::Contrast(args) => handle_contrast(&args, format),
        Command::Audit(args) => handle_audit(&config, &args, format),
        Command::Legacy(legacy) => match legacy {
            LegacyCommand::Import(args) => handle_legacy_import(&args, format),
            LegacyCommand::Export(args) => handle_legacy_export(&args, format),
        },
        Command::Apply(args) => handle_apply(config, args, format).await,
        Command::Restore(args) => handle_restore(config, &args, format),
    }
}

fn engine_config(path: Option<&PathBuf>) -> CliResult<EngineConfig> {
    let config = match path {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::from_env()?,
    };
    Ok(config)
}

#[derive(Parser)]
#[command(name = "livery", about = "Compile, check and apply design-token themes")]
struct Cli {
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    output: OutputFormat,
    #[arg(long, global = true, env = "LIVERY_LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,
    #[arg(
        long,
        global = true,
        env = "LIVERY_LOG_FORMAT",
        help = "Log format on stderr: json or pretty"
    )]
    log_format: Option<String>,
    #[arg(
        long,
        global = true,
        env = "LIVERY_CONFIG",
        help = "Engine settings file (JSON); environment variables are used otherwise"
    )]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the flattened token map of a theme.
    Flatten(DocumentArgs),
    /// Print the CSS rule block of a theme.
    Css(DocumentArgs),
    /// Check the contrast of two colors.
    Contrast(ContrastArgs),
    /// Check the contrast of every known slot pair in a theme.
    Audit(AuditArgs),
    /// Convert between legacy flat color maps and theme documents.
    #[command(subcommand)]
    Legacy(LegacyCommand),
    /// Load a theme by name, apply it and persist it.
    Apply(ApplyArgs),
    /// Re-apply the last persisted theme.
    Restore(RestoreArgs),
}

#[derive(Subcommand)]
pub(crate) enum LegacyCommand {
    /// Migrate a legacy color map into a theme document.
    Import(LegacyImportArgs),
    /// Render a theme document as a legacy color map.
    Export(LegacyExportArgs),
}

#[derive(Args)]
pub(crate) struct DocumentArgs {
    /// Theme document (JSON).
    pub(crate) document: PathBuf,
    /// Partial document deep-merged over the theme before compiling.
    #[arg(long)]
    pub(crate) overrides: Option<PathBuf>,
}

#[derive(Args)]
pub(crate) struct ContrastArgs {
    /// Text color, `#rrggbb`.
    pub(crate) foreground: String,
    /// Background color, `#rrggbb`.
    pub(crate) background: String,
    #[arg(long, value_enum, default_value_t = SizeArg::Normal)]
    pub(crate) size: SizeArg,
}

#[derive(Args)]
pub(crate) struct AuditArgs {
    /// Theme document (JSON).
    pub(crate) document: PathBuf,
}

#[derive(Args)]
pub(crate) struct LegacyImportArgs {
    /// Legacy color map (JSON object of flat keys).
    pub(crate) file: PathBuf,
}

#[derive(Args)]
pub(crate) struct LegacyExportArgs {
    /// Theme document (JSON).
    pub(crate) document: PathBuf,
}

#[derive(Args)]
pub(crate) struct ApplyArgs {
    /// Theme name; resolved to `<themes>/<name>.json`.
    pub(crate) name: String,
    /// Directory holding theme documents.
    #[arg(long, env = "LIVERY_THEME_ROOT")]
    pub(crate) themes: PathBuf,
    /// Directory holding persisted state and the emitted stylesheet.
    #[arg(long, env = "LIVERY_STATE_DIR")]
    pub(crate) state: PathBuf,
    /// Partial document deep-merged over the theme before applying.
    #[arg(long)]
    pub(crate) overrides: Option<PathBuf>,
}

#[derive(Args)]
pub(crate) struct RestoreArgs {
    /// Directory holding persisted state and the emitted stylesheet.
    #[arg(long, env = "LIVERY_STATE_DIR")]
    pub(crate) state: PathBuf,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum SizeArg {
    #[default]
    Normal,
    Large,
    Header,
}

impl From<SizeArg> for SizeClass {
    fn from(size: SizeArg) -> Self {
        match size {
            SizeArg::Normal => Self::Normal,
            SizeArg::Large => Self::Large,
            SizeArg::Header => Self::Header,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Flatten(_) => "flatten",
        Command::Css(_) => "css",
        Command::Contrast(_) => "contrast",
        Command::Audit(_) => "audit",
        Command::Legacy(LegacyCommand::Import(_)) => "legacy_import",
        Command::Legacy(LegacyCommand::Export(_)) => "legacy_export",
        Command::Apply(_) => "apply",
        Command::Restore(_) => "restore",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_output_after_subcommand() {
        let cli = Cli::try_parse_from(["livery", "flatten", "theme.json", "--output", "json"])
            .expect("valid arguments");
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(command_label(&cli.command), "flatten");
    }

    #[test]
    fn contrast_size_defaults_to_normal() {
        let cli = Cli::try_parse_from(["livery", "contrast", "#ffffff", "#000000"])
            .expect("valid arguments");
        let Command::Contrast(args) = cli.command else {
            panic!("expected contrast command");
        };
        assert_eq!(args.size, SizeArg::Normal);
        assert_eq!(SizeClass::from(SizeArg::Header), SizeClass::Header);
    }

    #[test]
    fn legacy_subcommands_have_distinct_labels() {
        let import = Cli::try_parse_from(["livery", "legacy", "import", "colors.json"])
            .expect("valid arguments");
        let export = Cli::try_parse_from(["livery", "legacy", "export", "theme.json"])
            .expect("valid arguments");
        assert_eq!(command_label(&import.command), "legacy_import");
        assert_eq!(command_label(&export.command), "legacy_export");
    }

    #[test]
    fn apply_accepts_theme_and_state_directories() {
        let cli = Cli::try_parse_from([
            "livery", "apply", "dark", "--themes", "themes", "--state", "state",
        ])
        .expect("valid arguments");
        assert_eq!(command_label(&cli.command), "apply");
    }
}
