//! `trainrecon history` and `trainrecon tracker`: read back what earlier
//! runs persisted.

use std::path::PathBuf;

use clap::Subcommand;

use trainrecon_config::Settings;
use trainrecon_io::{CsvTrackerStore, ReportHistory, TrackerStore};

use crate::CliError;

#[derive(Subcommand)]
pub enum TrackerCommands {
    /// Print the current tracker rows
    #[command(after_help = "\
Examples:
  trainrecon tracker show
  trainrecon tracker show --status Retreinamento --json")]
    Show {
        /// Tracker CSV (default from settings)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Keep only rows with this final status
        #[arg(long)]
        status: Option<String>,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },
}

pub fn cmd_history(limit: Option<usize>, json: bool, settings: &Settings) -> Result<(), CliError> {
    let db_path = settings.history_db_path();
    if !db_path.exists() {
        return Err(CliError::io(format!("no report history at {}", db_path.display()))
            .with_hint("history is recorded by `trainrecon run` unless --no-history is given"));
    }

    let entries = ReportHistory::open(&db_path)?.entries(limit)?;

    if json {
        let json_str = serde_json::to_string_pretty(&entries)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
        return Ok(());
    }

    for e in &entries {
        println!(
            "{:>4}  {}  {:<5} {:<40} {:<12} {}",
            e.id,
            e.timestamp,
            e.report_type,
            e.file_name,
            e.user.as_deref().unwrap_or("-"),
            e.filter_options.as_deref().unwrap_or(""),
        );
    }
    eprintln!("{} report(s)", entries.len());
    Ok(())
}

pub fn cmd_tracker(cmd: TrackerCommands, settings: &Settings) -> Result<(), CliError> {
    match cmd {
        TrackerCommands::Show { file, status, json } => {
            let path = file.unwrap_or_else(|| settings.tracker_file_path());
            let mut rows = CsvTrackerStore::new(&path).load_current_state()?;
            if let Some(ref status) = status {
                rows.retain(|r| r.final_status.as_deref() == Some(status.as_str()));
            }

            if json {
                let json_str = serde_json::to_string_pretty(&rows)
                    .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
                println!("{json_str}");
                return Ok(());
            }

            for r in &rows {
                println!(
                    "{:<30} {:<14} {:<16} {:<19} {}",
                    r.employee_id,
                    r.assigned_code.as_deref().unwrap_or("-"),
                    r.final_status.as_deref().unwrap_or("-"),
                    r.completed_at.as_deref().unwrap_or("-"),
                    r.note.as_deref().unwrap_or(""),
                );
            }
            eprintln!("{} row(s) in {}", rows.len(), path.display());
            Ok(())
        }
    }
}
