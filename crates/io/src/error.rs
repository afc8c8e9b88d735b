use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("{}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: unsupported file type (expected .xlsx, .xls, .xlsb, .ods or .csv)", .0.display())]
    UnsupportedFormat(PathBuf),
    #[error("{}: no header row", .0.display())]
    NoHeader(PathBuf),
    #[error("{}: {message}", .path.display())]
    Spreadsheet { path: PathBuf, message: String },
    #[error("{}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: ::csv::Error,
    },
    #[error("xlsx export: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("history database: {0}")]
    History(#[from] rusqlite::Error),
}

impl IoError {
    pub(crate) fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IoError::File {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: ::csv::Error) -> Self {
        IoError::Csv {
            path: path.into(),
            source,
        }
    }
}
