// Chart commands: sources, daily, words, report

use std::path::Path;

use moodgrid_analysis::chart::ChartRenderer;
use moodgrid_analysis::{
    daily, sources, words, AnalysisPolicy, Breakdown, ChartSpec, MomentFilter, SummaryTable, Table,
};
use moodgrid_config::Config;
use moodgrid_io::NamedTables;
use serde_json::Value;
use tracing::info;

use crate::vega::{self, VegaLite};
use crate::{emit, load_tables, util, wrote, ChartArgs, CliError, Context, OutputFormat};

/// Workbook plus config, resolved once per command.
struct Loaded {
    config: Config,
    tables: NamedTables,
}

impl Loaded {
    fn open(ctx: &Context, workbook: &Path) -> Result<Self, CliError> {
        let config = ctx.config()?;
        let tables = load_tables(&config, workbook)?;
        Ok(Self { config, tables })
    }

    fn table(&self, name: &str) -> Result<&Table, CliError> {
        self.tables.get(name).ok_or_else(|| {
            let known: Vec<&str> = self.tables.names().collect();
            CliError::usage(format!("unknown sheet '{name}'"))
                .with_hint(format!("known sheets: {}", known.join(", ")))
        })
    }

    fn policy(&self, all_moments: bool, breakdown: Breakdown) -> AnalysisPolicy {
        let policy = self.config.analysis_policy().with_breakdown(breakdown);
        if all_moments {
            policy.with_filter(MomentFilter::All)
        } else {
            policy
        }
    }
}

fn breakdown(combined: bool) -> Breakdown {
    if combined {
        Breakdown::Combined
    } else {
        Breakdown::BySource
    }
}

fn render(spec: &ChartSpec) -> Value {
    match VegaLite.render(spec) {
        Ok(doc) => doc,
        Err(never) => match never {},
    }
}

fn write_output(
    ctx: &Context,
    args: &ChartArgs,
    summary: &SummaryTable,
    spec: &ChartSpec,
) -> Result<(), CliError> {
    match (args.format, args.output.as_deref()) {
        (OutputFormat::Csv, Some(path)) => {
            moodgrid_io::csv::export(summary, path)?;
            wrote(ctx, path);
            return Ok(());
        }
        (OutputFormat::Json, Some(path)) => {
            moodgrid_io::json::export(summary, path)?;
            wrote(ctx, path);
            return Ok(());
        }
        _ => {}
    }

    let body = match args.format {
        OutputFormat::Table => util::format_table(summary),
        OutputFormat::Csv => moodgrid_io::csv::to_string(summary)?,
        OutputFormat::Json => moodgrid_io::json::to_string(summary)?,
        OutputFormat::Vega => pretty(&render(spec))?,
        OutputFormat::Html => vega::to_html(&spec.title, &[render(spec)]),
    };
    emit(ctx, args.output.as_deref(), &body)
}

fn pretty(doc: &Value) -> Result<String, CliError> {
    serde_json::to_string_pretty(doc).map_err(|e| CliError::write(format!("JSON serialization error: {e}")))
}

// ============================================================================
// Commands
// ============================================================================

pub(crate) fn cmd_sources(ctx: &Context, args: ChartArgs) -> Result<(), CliError> {
    let loaded = Loaded::open(ctx, &args.workbook)?;
    let table = loaded.table(&args.sheet)?;
    let policy = loaded.policy(args.all_moments, Breakdown::default());

    let counts = sources::source_counts(table, &loaded.config.columns, &policy)?;
    info!(sheet = %args.sheet, moments = counts.total(), "counted sources");

    write_output(ctx, &args, &counts.to_table(), &sources::chart(&counts, policy.filter))
}

pub(crate) fn cmd_daily(ctx: &Context, args: ChartArgs, combined: bool) -> Result<(), CliError> {
    let loaded = Loaded::open(ctx, &args.workbook)?;
    let table = loaded.table(&args.sheet)?;
    let policy = loaded.policy(args.all_moments, breakdown(combined));

    let scores = daily::daily_scores(table, &loaded.config.columns, &policy)?;
    info!(sheet = %args.sheet, groups = scores.len(), "summed daily scores");

    write_output(ctx, &args, &scores.to_table(policy.breakdown), &daily::chart(&scores, policy.breakdown))
}

pub(crate) fn cmd_words(ctx: &Context, args: ChartArgs, combined: bool) -> Result<(), CliError> {
    let loaded = Loaded::open(ctx, &args.workbook)?;
    let table = loaded.table(&args.sheet)?;
    let policy = loaded.policy(args.all_moments, breakdown(combined));

    let freqs = words::word_frequencies(table, &loaded.config.columns, &policy)?;
    info!(sheet = %args.sheet, words = freqs.len(), total = freqs.total(), "counted words");

    write_output(ctx, &args, &freqs.to_table(policy.breakdown), &words::chart(&freqs, policy.breakdown))
}

/// All three charts for one table, as Vega-Lite files plus an index page.
pub(crate) fn cmd_report(
    ctx: &Context,
    workbook: &Path,
    sheet: &str,
    all_moments: bool,
    combined: bool,
    output: &Path,
) -> Result<(), CliError> {
    let loaded = Loaded::open(ctx, workbook)?;
    let table = loaded.table(sheet)?;
    let columns = &loaded.config.columns;

    let source_policy = loaded.policy(all_moments, Breakdown::default());
    let policy = loaded.policy(all_moments, breakdown(combined));

    let counts = sources::source_counts(table, columns, &source_policy)?;
    let scores = daily::daily_scores(table, columns, &policy)?;
    let freqs = words::word_frequencies(table, columns, &policy)?;

    let charts = [
        ("sources.vl.json", render(&sources::chart(&counts, source_policy.filter))),
        ("daily.vl.json", render(&daily::chart(&scores, policy.breakdown))),
        ("words.vl.json", render(&words::chart(&freqs, policy.breakdown))),
    ];

    std::fs::create_dir_all(output)
        .map_err(|e| CliError::write(format!("cannot create {}: {e}", output.display())))?;

    for (file, doc) in &charts {
        emit(ctx, Some(&output.join(file)), &pretty(doc)?)?;
    }

    let docs: Vec<Value> = charts.into_iter().map(|(_, doc)| doc).collect();
    let page = vega::to_html(&format!("moodgrid: {sheet}"), &docs);
    emit(ctx, Some(&output.join("index.html")), &page)?;

    info!(sheet, dir = %output.display(), "report written");
    Ok(())
}
