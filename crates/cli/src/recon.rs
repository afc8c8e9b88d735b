//! `trainrecon run | validate | views`: load the input tables, reconcile,
//! and report.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use serde::Serialize;

use trainrecon_config::Settings;
use trainrecon_io::tracker::update_tracker;
use trainrecon_io::{
    default_report_name, export_records, load_table, CsvTrackerStore, NewReport, ReportFormat,
    ReportHistory,
};
use trainrecon_recon::aggregate::{category_breakdown, monthly_completion, status_by_role, status_counts};
use trainrecon_recon::ingest;
use trainrecon_recon::model::{ReconMeta, ReconSummary};
use trainrecon_recon::{ReconConfig, ReconInput, ReconResult, ReconciledRecord, ReportFilter, Table};

use crate::exit_codes::{EXIT_INCONSISTENT, EXIT_SCHEMA};
use crate::CliError;

#[derive(Args)]
pub struct InputArgs {
    /// Team roster (identity, position, nationality columns)
    #[arg(long)]
    pub team: PathBuf,

    /// Training requirements matrix
    #[arg(long)]
    pub requirements: PathBuf,

    /// Completion/control log
    #[arg(long)]
    pub control: PathBuf,

    /// Training-type table (code A, code B, category)
    #[arg(long)]
    pub training_types: Option<PathBuf>,

    /// E-learning export; enables revision checks
    #[arg(long)]
    pub elearning: Option<PathBuf>,

    /// Engine config (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Minimum fuzzy name score to accept a match (0-100)
    #[arg(long)]
    pub threshold: Option<u8>,
}

#[derive(Args)]
pub struct FilterArgs {
    /// Keep only this role (position, second line)
    #[arg(long)]
    pub role: Option<String>,

    /// Keep only this final status ("OK", "Retreinamento", "Not started")
    #[arg(long)]
    pub status: Option<String>,

    /// Keep completions on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Keep completions on or before this date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

impl FilterArgs {
    fn to_filter(&self) -> ReportFilter {
        ReportFilter {
            role: self.role.clone(),
            status: self.status.clone(),
            from: self.from,
            to: self.to,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Xlsx,
    Csv,
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(f: OutputFormat) -> Self {
        match f {
            OutputFormat::Xlsx => ReportFormat::Xlsx,
            OutputFormat::Csv => ReportFormat::Csv,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Report file (default: Status_Treinamento_<date>.<format> in the output directory)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Directory for the default report file name
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Report format (default: from --output extension, then settings, then xlsx)
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Print the result as JSON to stdout; no report file unless --output is given
    #[arg(long)]
    pub json: bool,

    /// Exit 1 when any record is unmatched or matched only fuzzily
    #[arg(long)]
    pub strict: bool,

    /// Do not log the report in the history database
    #[arg(long)]
    pub no_history: bool,

    /// Save the run into the compliance tracker, keeping existing notes
    #[arg(long)]
    pub update_tracker: bool,

    /// Tracker CSV (default from settings)
    #[arg(long)]
    pub tracker_file: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Shared loading
// ---------------------------------------------------------------------------

/// Engine config, lowest to highest precedence: engine defaults, settings,
/// the `--config` TOML file (only the keys it sets), `--threshold`.
fn load_config(input: &InputArgs, settings: &Settings) -> Result<ReconConfig, CliError> {
    let mut config = ReconConfig::default();
    if let Some(threshold) = settings.fuzzy_threshold {
        config.fuzzy_threshold = threshold;
    }
    if let Some(ref nationality) = settings.domestic_nationality {
        config.domestic_nationality = nationality.clone();
    }

    if let Some(ref path) = input.config {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CliError::io(format!("cannot read config {}: {e}", path.display())))?;
        config = ReconConfig::from_toml_over(&config, &text)?;
    }

    if let Some(threshold) = input.threshold {
        config.fuzzy_threshold = threshold;
    }

    config.validate()?;
    Ok(config)
}

fn load_input(input: &InputArgs) -> Result<ReconInput, CliError> {
    let optional = |path: &Option<PathBuf>| -> Result<Option<Table>, CliError> {
        path.as_deref().map(load_table).transpose().map_err(CliError::from)
    };

    Ok(ReconInput {
        team: load_table(&input.team)?,
        requirements: load_table(&input.requirements)?,
        control: load_table(&input.control)?,
        training_types: optional(&input.training_types)?,
        elearning: optional(&input.elearning)?,
    })
}

fn reconcile(input: &InputArgs, settings: &Settings) -> Result<ReconResult, CliError> {
    let config = load_config(input, settings)?;
    let tables = load_input(input)?;
    Ok(trainrecon_recon::run(&config, &tables)?)
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct JsonReport<'a> {
    meta: &'a ReconMeta,
    summary: &'a ReconSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<&'a ReportFilter>,
    records: &'a [&'a ReconciledRecord],
}

fn parse_report_format(name: &str) -> Option<ReportFormat> {
    match name.trim().to_ascii_lowercase().as_str() {
        "xlsx" => Some(ReportFormat::Xlsx),
        "csv" => Some(ReportFormat::Csv),
        "json" => Some(ReportFormat::Json),
        _ => None,
    }
}

fn resolve_format(args: &RunArgs, settings: &Settings) -> Result<ReportFormat, CliError> {
    if let Some(format) = args.format {
        return Ok(format.into());
    }
    if let Some(format) = args.output.as_deref().and_then(ReportFormat::from_path) {
        return Ok(format);
    }
    parse_report_format(&settings.output_format).ok_or_else(|| {
        CliError::config(format!("unknown output format in settings: '{}'", settings.output_format))
            .with_hint("use xlsx, csv or json")
    })
}

fn resolve_output(args: &RunArgs, settings: &Settings, format: ReportFormat) -> PathBuf {
    if let Some(ref path) = args.output {
        return path.clone();
    }
    let dir = args
        .output_dir
        .clone()
        .or_else(|| settings.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    dir.join(default_report_name(chrono::Local::now().date_naive(), format))
}

pub fn cmd_run(args: RunArgs, settings: &Settings) -> Result<(), CliError> {
    let result = reconcile(&args.input, settings)?;
    let format = resolve_format(&args, settings)?;

    let filter = args.filter.to_filter();
    let rows = filter.apply(&result.records);

    if args.json {
        let report = JsonReport {
            meta: &result.meta,
            summary: &result.summary,
            filter: (!filter.is_empty()).then_some(&filter),
            records: &rows,
        };
        let json_str = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    }

    if !args.json || args.output.is_some() {
        let path = resolve_output(&args, settings, format);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| CliError::io(format!("cannot create {}: {e}", parent.display())))?;
        }
        export_records(&result, &rows, format, &path)?;
        eprintln!("wrote {} ({} records)", path.display(), rows.len());

        if !args.no_history {
            log_history(settings, &path, format, &filter);
        }
    }

    if args.update_tracker {
        let tracker_path = args
            .tracker_file
            .clone()
            .unwrap_or_else(|| settings.tracker_file_path());
        let store = CsvTrackerStore::new(&tracker_path);
        let saved = update_tracker(&store, &result.records)?;
        eprintln!("tracker: {} rows saved to {}", saved.len(), store.path().display());
    }

    print_summary(&result);

    if args.strict && result.summary.inconsistent > 0 {
        return Err(CliError::new(
            EXIT_INCONSISTENT,
            format!("{} inconsistent records", result.summary.inconsistent),
        ));
    }

    Ok(())
}

/// History is best-effort: the report is already on disk.
fn log_history(settings: &Settings, report: &Path, format: ReportFormat, filter: &ReportFilter) {
    let db_path = settings.history_db_path();
    let entry = NewReport {
        report_type: format.to_string(),
        file_name: report
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        filter_options: Some(filter.describe()),
        user: settings.effective_user(),
    };
    let logged = ReportHistory::open(&db_path).and_then(|history| history.log(&entry));
    if let Err(e) = logged {
        tracing::warn!(db = %db_path.display(), error = %e, "report not logged in history");
    }
}

fn print_summary(result: &ReconResult) {
    let s = &result.summary;
    eprintln!(
        "reconciled {} records: {} exact, {} fuzzy, {} unmatched ({} inconsistent)",
        s.total_records, s.exact, s.fuzzy, s.unmatched, s.inconsistent,
    );
    let statuses: Vec<String> = s
        .status_counts
        .iter()
        .map(|(status, count)| format!("{status}: {count}"))
        .collect();
    if !statuses.is_empty() {
        eprintln!("status: {}", statuses.join(", "));
    }
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

pub fn cmd_validate(input: InputArgs, settings: &Settings) -> Result<(), CliError> {
    let config = load_config(&input, settings)?;
    let tables = load_input(&input)?;

    let mut checks: Vec<(&str, &Table, Result<usize, trainrecon_recon::ReconError>)> = vec![
        (
            ingest::TEAM,
            &tables.team,
            ingest::read_roster(&tables.team, &config.columns).map(|r| r.len()),
        ),
        (
            ingest::REQUIREMENTS,
            &tables.requirements,
            ingest::read_requirements(&tables.requirements).map(|r| r.len()),
        ),
        (
            ingest::CONTROL,
            &tables.control,
            ingest::read_control(&tables.control).map(|r| r.len()),
        ),
    ];
    if let Some(ref table) = tables.training_types {
        checks.push((ingest::TRAINING_TYPES, table, ingest::read_training_types(table).map(|r| r.len())));
    }
    if let Some(ref table) = tables.elearning {
        checks.push((ingest::ELEARNING, table, ingest::read_elearning(table).map(|r| r.len())));
    }

    let mut failures = 0;
    for (role, table, check) in &checks {
        match check {
            Ok(rows) => eprintln!("ok     {role:<14} {} ({rows} rows)", table.name),
            Err(e) => {
                failures += 1;
                eprintln!("error  {role:<14} {e}");
            }
        }
    }

    if failures > 0 {
        return Err(CliError::new(EXIT_SCHEMA, format!("{failures} table(s) failed validation")));
    }
    eprintln!("config ok (fuzzy threshold {})", config.fuzzy_threshold);
    Ok(())
}

// ---------------------------------------------------------------------------
// views
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct Views<'a> {
    summary: &'a ReconSummary,
    status_counts: Vec<trainrecon_recon::aggregate::StatusCount>,
    status_by_role: std::collections::BTreeMap<String, std::collections::BTreeMap<String, usize>>,
    monthly: Vec<trainrecon_recon::aggregate::MonthlyRollup>,
    categories: Vec<trainrecon_recon::aggregate::CategoryBreakdown>,
}

pub fn cmd_views(input: InputArgs, json: bool, settings: &Settings) -> Result<(), CliError> {
    let result = reconcile(&input, settings)?;
    let records = &result.records;

    let views = Views {
        summary: &result.summary,
        status_counts: status_counts(records),
        status_by_role: status_by_role(records),
        monthly: monthly_completion(records),
        categories: category_breakdown(records),
    };

    if json {
        let json_str = serde_json::to_string_pretty(&views)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
        return Ok(());
    }

    println!("STATUS");
    for c in &views.status_counts {
        println!("  {:<16} {:>6}", c.status, c.count);
    }

    println!("\nSTATUS BY ROLE");
    for (role, counts) in &views.status_by_role {
        let parts: Vec<String> = counts.iter().map(|(s, n)| format!("{s}: {n}")).collect();
        println!("  {role:<24} {}", parts.join(", "));
    }

    println!("\nMONTHLY COMPLETION");
    for m in &views.monthly {
        println!(
            "  {}  {:>5} records  {:>5} completed  {:>5.1}%",
            m.month,
            m.records,
            m.completed,
            m.completion_rate * 100.0
        );
    }

    if result.meta.categories_applied {
        println!("\nCATEGORIES");
        for c in &views.categories {
            let parts: Vec<String> = c.by_status.iter().map(|(s, n)| format!("{s}: {n}")).collect();
            println!("  {:<24} {:>5}  {}", c.category, c.total, parts.join(", "));
        }
    }

    Ok(())
}
