use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use trainrecon_recon::ReconResult;
use trainrecon_recon::ReconciledRecord;

use crate::error::IoError;

pub const REPORT_PREFIX: &str = "Status_Treinamento";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Xlsx,
    Csv,
    Json,
}

impl ReportFormat {
    /// Format implied by the output file extension, if recognized.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" => Some(Self::Xlsx),
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// `Status_Treinamento_<YYYY-MM-DD>.<ext>` for the given day.
pub fn default_report_name(day: NaiveDate, format: ReportFormat) -> String {
    format!("{REPORT_PREFIX}_{}.{}", day.format("%Y-%m-%d"), format.extension())
}

/// Write `records` (already filtered) in `format`. JSON output also carries
/// the run's meta and summary. Returns the number of records written.
pub fn export_records(
    result: &ReconResult,
    records: &[&ReconciledRecord],
    format: ReportFormat,
    path: &Path,
) -> Result<usize, IoError> {
    let written = match format {
        ReportFormat::Xlsx => crate::xlsx::export(records.iter().copied(), path)?,
        ReportFormat::Csv => crate::csv::export(records.iter().copied(), path)?,
        ReportFormat::Json => crate::json::export(
            records.iter().copied(),
            Some(&result.meta),
            Some(&result.summary),
            path,
        )?,
    };
    tracing::info!(path = %path.display(), %format, records = written, "report written");
    Ok(written)
}
