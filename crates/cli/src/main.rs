// trainrecon CLI - training-compliance reconciliation

mod exit_codes;
mod logging;
mod recon;
mod settings_cmd;
mod store;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use exit_codes::{io_exit_code, recon_exit_code, EXIT_CONFIG, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};
use trainrecon_config::Settings;

#[derive(Parser)]
#[command(name = "trainrecon")]
#[command(about = "Reconcile training requirements against completion records")]
#[command(version, long_version = long_version())]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format (default from settings, else pretty)
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormatArg>,

    /// Settings file (default: <config dir>/trainrecon/settings.json)
    #[arg(long, global = true, env = "TRAINRECON_SETTINGS")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile the input tables and write the compliance report
    #[command(after_help = "\
Examples:
  trainrecon run --team team.xlsx --requirements matrix.xlsx --control control.xlsx
  trainrecon run --team team.xlsx --requirements matrix.xlsx --control control.xlsx \\
      --elearning elearning.xlsx --training-types types.xlsx --strict
  trainrecon run ... --role Operador --from 2024-01-01 --format csv --output operators.csv
  trainrecon run ... --json > result.json")]
    Run(recon::RunArgs),

    /// Check that every input table has the columns the engine reads
    Validate(recon::InputArgs),

    /// Print status, role, monthly and category views of a run
    Views {
        #[command(flatten)]
        input: recon::InputArgs,

        /// Output JSON to stdout instead of tables
        #[arg(long)]
        json: bool,
    },

    /// List previously written reports, newest first
    History {
        /// Show at most this many entries
        #[arg(long, short = 'n')]
        limit: Option<usize>,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Compliance tracker operations
    #[command(subcommand)]
    Tracker(store::TrackerCommands),

    /// Settings file operations
    #[command(subcommand)]
    Config(settings_cmd::ConfigCommands),
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormatArg> for logging::LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Compact => Self::Compact,
            LogFormatArg::Json => Self::Json,
        }
    }
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("TRAINRECON_GIT_HASH"), ")",
        "\nengine:  trainrecon-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TRAINRECON_TARGET"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match cli.settings {
        Some(ref path) => Settings::load_from(path),
        None => Settings::load(),
    };

    let format = cli.log_format.map(Into::into).unwrap_or(settings.log_format);
    logging::init_logging(&logging::LogConfig::from_verbosity(cli.verbose).with_format(format));

    let result = match cli.command {
        Commands::Run(args) => recon::cmd_run(args, &settings),
        Commands::Validate(input) => recon::cmd_validate(input, &settings),
        Commands::Views { input, json } => recon::cmd_views(input, json, &settings),
        Commands::History { limit, json } => store::cmd_history(limit, json, &settings),
        Commands::Tracker(cmd) => store::cmd_tracker(cmd, &settings),
        Commands::Config(cmd) => settings_cmd::cmd_config(cmd, cli.settings.as_deref(), &settings),
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

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(EXIT_IO, msg)
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(EXIT_CONFIG, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<trainrecon_recon::ReconError> for CliError {
    fn from(err: trainrecon_recon::ReconError) -> Self {
        let code = recon_exit_code(&err);
        let error = Self::new(code, err.to_string());
        match err {
            trainrecon_recon::ReconError::MissingColumn { .. } => {
                error.with_hint("check the sheet layout; run `trainrecon validate` to see every table's status")
            }
            _ => error,
        }
    }
}

impl From<trainrecon_io::IoError> for CliError {
    fn from(err: trainrecon_io::IoError) -> Self {
        Self::new(io_exit_code(&err), err.to_string())
    }
}
