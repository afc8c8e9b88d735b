// File I/O operations

pub mod csv;
pub mod error;
pub mod export;
pub mod history;
pub mod json;
pub mod table;
pub mod tracker;
pub mod xlsx;

pub use error::IoError;
pub use export::{default_report_name, export_records, ReportFormat};
pub use history::{HistoryEntry, NewReport, ReportHistory};
pub use table::load_table;
pub use tracker::{CsvTrackerStore, TrackerRecord, TrackerStore};
