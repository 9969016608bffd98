// moodgrid CLI - chart views of significant-moment workbooks

mod charts;
mod exit_codes;
mod util;
mod vega;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use moodgrid_analysis::{AnalysisError, SummaryTable, SummaryValue};
use moodgrid_config::{Config, ConfigError, ConfigSource};
use moodgrid_io::{ExportError, LoadError, NamedTables};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use exit_codes::{EXIT_FILE_ACCESS, EXIT_FORMAT, EXIT_SCHEMA, EXIT_SUCCESS, EXIT_USAGE, EXIT_WRITE};

#[derive(Parser)]
#[command(name = "mgrid")]
#[command(about = "Charts of internal/external causes, daily PANAS scores and affect words")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.config/moodgrid/config.toml if present)
    #[arg(long, global = true, env = "MOODGRID_CONFIG")]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace). Without -v, RUST_LOG applies.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress stderr notes (e.g. "wrote ...")
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the tables the sheet layout reads from a workbook
    #[command(after_help = "\
Examples:
  mgrid sheets moments.xlsx
  mgrid sheets moments.xlsx --all
  mgrid sheets moments.xlsx --json")]
    Sheets {
        /// Workbook file (xlsx, xls, xlsb, ods)
        workbook: PathBuf,

        /// List every sheet in the workbook, mapped or not
        #[arg(long)]
        all: bool,

        /// Output JSON instead of a text table
        #[arg(long)]
        json: bool,
    },

    /// Pie chart of internal versus external causes
    #[command(after_help = "\
Examples:
  mgrid sources moments.xlsx --sheet marela
  mgrid sources moments.xlsx --sheet marela --all-moments -f csv
  mgrid sources moments.xlsx --sheet marela -f html -o sources.html")]
    Sources {
        #[command(flatten)]
        chart: ChartArgs,
    },

    /// Bar chart of summed PANAS score per date
    #[command(after_help = "\
Examples:
  mgrid daily moments.xlsx --sheet daniel
  mgrid daily moments.xlsx --sheet daniel --combined -f vega -o daily.vl.json")]
    Daily {
        #[command(flatten)]
        chart: ChartArgs,

        /// Do not split each date by source
        #[arg(long)]
        combined: bool,
    },

    /// Bar chart of relevant PANAS word frequency
    #[command(after_help = "\
Examples:
  mgrid words moments.xlsx --sheet rainer
  mgrid words moments.xlsx --sheet rainer --combined -f json")]
    Words {
        #[command(flatten)]
        chart: ChartArgs,

        /// Do not split each word by source
        #[arg(long)]
        combined: bool,
    },

    /// Write all three charts and an HTML page for one table
    #[command(after_help = "\
Examples:
  mgrid report moments.xlsx --sheet melissa -o report/")]
    Report {
        /// Workbook file (xlsx, xls, xlsb, ods)
        workbook: PathBuf,

        /// Table name from the sheet layout (e.g. marela)
        #[arg(long, short = 's')]
        sheet: String,

        /// Include moments with a score <= 0
        #[arg(long)]
        all_moments: bool,

        /// Do not split daily and word charts by source
        #[arg(long)]
        combined: bool,

        /// Output directory (created if missing)
        #[arg(long, short = 'o')]
        output: PathBuf,
    },

    /// Show the effective configuration
    Config {
        /// Print the default config file path and exit
        #[arg(long)]
        path: bool,
    },
}

#[derive(Args)]
pub(crate) struct ChartArgs {
    /// Workbook file (xlsx, xls, xlsb, ods)
    pub workbook: PathBuf,

    /// Table name from the sheet layout (e.g. marela)
    #[arg(long, short = 's')]
    pub sheet: String,

    /// Include moments with a score <= 0
    #[arg(long)]
    pub all_moments: bool,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Output file (omit for stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Aligned text columns
    Table,
    Csv,
    Json,
    /// Vega-Lite v5 document
    Vega,
    /// Standalone page rendering the Vega-Lite chart
    Html,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  moodgrid-analysis ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let ctx = Context { config_path: cli.config, quiet: cli.quiet };

    let result = match cli.command {
        Commands::Sheets { workbook, all, json } => cmd_sheets(&ctx, &workbook, all, json),
        Commands::Sources { chart } => charts::cmd_sources(&ctx, chart),
        Commands::Daily { chart, combined } => charts::cmd_daily(&ctx, chart, combined),
        Commands::Words { chart, combined } => charts::cmd_words(&ctx, chart, combined),
        Commands::Report { workbook, sheet, all_moments, combined, output } => {
            charts::cmd_report(&ctx, &workbook, &sheet, all_moments, combined, &output)
        }
        Commands::Config { path } => cmd_config(&ctx, path),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

// ============================================================================
// Shared context + errors
// ============================================================================

pub(crate) struct Context {
    pub config_path: Option<PathBuf>,
    pub quiet: bool,
}

impl Context {
    pub fn config(&self) -> Result<Config, CliError> {
        let (config, source) = Config::resolve(self.config_path.as_deref())?;
        match source {
            ConfigSource::Explicit(p) | ConfigSource::UserDefault(p) => {
                info!(path = %p.display(), "using config");
            }
            ConfigSource::BuiltIn => info!("using built-in config"),
        }
        Ok(config)
    }

    /// Stderr note, unless --quiet.
    pub fn note(&self, msg: impl AsRef<str>) {
        if !self.quiet {
            eprintln!("{}", msg.as_ref());
        }
    }
}

#[derive(Debug)]
pub(crate) struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn write(msg: impl Into<String>) -> Self {
        Self { code: EXIT_WRITE, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<LoadError> for CliError {
    fn from(err: LoadError) -> Self {
        let message = err.to_string();
        match err {
            LoadError::NotFound(_) => Self { code: EXIT_FILE_ACCESS, message, hint: None },
            LoadError::MissingSheet { .. } => Self {
                code: EXIT_FORMAT,
                message,
                hint: Some("adjust [sheets] in the config, or check with `mgrid sheets --all`".into()),
            },
            LoadError::Open { .. } | LoadError::ReadSheet { .. } => {
                Self { code: EXIT_FORMAT, message, hint: None }
            }
        }
    }
}

impl From<AnalysisError> for CliError {
    fn from(err: AnalysisError) -> Self {
        let hint = match err {
            AnalysisError::MissingColumn { .. } => {
                Some("questionnaire sheets have no moment columns; column names are set under [columns]".into())
            }
            _ => None,
        };
        Self { code: EXIT_SCHEMA, message: err.to_string(), hint }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        let code = match err {
            ConfigError::Read { .. } => EXIT_FILE_ACCESS,
            ConfigError::Parse(_) | ConfigError::Invalid(_) => EXIT_USAGE,
        };
        Self { code, message: err.to_string(), hint: None }
    }
}

impl From<ExportError> for CliError {
    fn from(err: ExportError) -> Self {
        Self::write(err.to_string())
    }
}

/// Write to a file, or stdout when no path is given.
pub(crate) fn emit(ctx: &Context, output: Option<&Path>, body: &str) -> Result<(), CliError> {
    match output {
        Some(path) => {
            std::fs::write(path, body)
                .map_err(|e| CliError::write(format!("cannot write {}: {e}", path.display())))?;
            wrote(ctx, path);
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(body.as_bytes())
                .and_then(|_| if body.ends_with('\n') { Ok(()) } else { writeln!(handle) })
                .map_err(|e| CliError::write(e.to_string()))?;
        }
    }
    Ok(())
}

pub(crate) fn wrote(ctx: &Context, path: &Path) {
    info!(path = %path.display(), "wrote output");
    ctx.note(format!("wrote {}", path.display()));
}

pub(crate) fn load_tables(config: &Config, workbook: &Path) -> Result<NamedTables, CliError> {
    Ok(moodgrid_io::load_workbook(workbook, &config.layout())?)
}

// ============================================================================
// sheets
// ============================================================================

#[derive(serde::Serialize)]
struct SheetRow {
    index: usize,
    sheet: Option<String>,
    table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
}

fn cmd_sheets(ctx: &Context, workbook: &Path, all: bool, json: bool) -> Result<(), CliError> {
    let config = ctx.config()?;
    let sheet_names = moodgrid_io::list_sheets(workbook)?;
    let layout = config.layout();

    let rows: Vec<SheetRow> = if all {
        sheet_names
            .iter()
            .enumerate()
            .map(|(index, sheet)| SheetRow {
                index,
                sheet: Some(sheet.clone()),
                table: layout.sheets.iter().find(|e| e.index == index).map(|e| e.name.clone()),
                rows: None,
                kind: None,
            })
            .collect()
    } else {
        let tables = load_tables(&config, workbook)?;
        let columns = &config.columns;
        layout
            .sheets
            .iter()
            .zip(tables.iter())
            .map(|(entry, table)| {
                let moments = [&columns.date, &columns.score, &columns.cause, &columns.reason_and_word]
                    .iter()
                    .all(|c| table.column(c).is_ok());
                SheetRow {
                    index: entry.index,
                    sheet: sheet_names.get(entry.index).cloned(),
                    table: Some(table.name.clone()),
                    rows: Some(table.len()),
                    kind: Some(if moments { "moments" } else { "other" }),
                }
            })
            .collect()
    };

    if json {
        return emit(ctx, None, &to_json(&rows)?);
    }

    let text = |v: &Option<String>| SummaryValue::Text(v.clone().unwrap_or_else(|| "-".into()));
    let mut t = if all {
        SummaryTable::new(&["index", "sheet", "table"])
    } else {
        SummaryTable::new(&["table", "index", "sheet", "rows", "kind"])
    };
    for r in &rows {
        if all {
            t.push(vec![SummaryValue::Count(r.index), text(&r.sheet), text(&r.table)]);
        } else {
            t.push(vec![
                text(&r.table),
                SummaryValue::Count(r.index),
                text(&r.sheet),
                SummaryValue::Count(r.rows.unwrap_or(0)),
                SummaryValue::Text(r.kind.unwrap_or("-").to_string()),
            ]);
        }
    }
    emit(ctx, None, &util::format_table(&t))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value).map_err(|e| CliError::write(format!("JSON serialization error: {e}")))
}

// ============================================================================
// config
// ============================================================================

fn cmd_config(ctx: &Context, path_only: bool) -> Result<(), CliError> {
    if path_only {
        return emit(ctx, None, &Config::config_path().display().to_string());
    }
    let config = ctx.config()?;
    emit(ctx, None, &config.to_toml()?)
}
