use std::path::Path;

use trainrecon_recon::Table;

use crate::error::IoError;

/// Spreadsheet extensions handed to calamine.
const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// Load the first sheet of a spreadsheet, or a delimited text file, as a
/// [`Table`]. The format is chosen by file extension.
pub fn load_table(path: &Path) -> Result<Table, IoError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let table = if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
        crate::xlsx::import(path)?
    } else if matches!(ext.as_str(), "csv" | "tsv" | "txt") {
        crate::csv::import(path)?
    } else {
        return Err(IoError::UnsupportedFormat(path.to_path_buf()));
    };

    tracing::info!(file = %table.name, rows = table.len(), "table loaded");
    Ok(table)
}
