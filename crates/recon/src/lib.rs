//! `trainrecon-recon`: training-compliance reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded tables, returns one reconciled
//! record per (employee, required procedure). No CLI or IO dependencies.

pub mod aggregate;
pub mod category;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod ingest;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod projector;
pub mod revision;
pub mod roster;
pub mod summary;
pub mod table;

pub use config::ReconConfig;
pub use engine::{run, validate_input};
pub use error::ReconError;
pub use filter::ReportFilter;
pub use model::{FinalStatus, ReconInput, ReconResult, ReconciledRecord};
pub use table::{CellValue, Table};
