//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                                   |
//! |------|-----------------------------------------------------------|
//! | 0    | Success                                                   |
//! | 1    | Inconsistent records found (only with `--strict`)         |
//! | 2    | CLI usage error (bad args, unknown output format)         |
//! | 3    | Schema error (input table missing a required column)      |
//! | 4    | I/O error (unreadable input, unwritable report, database) |
//! | 5    | Config error (bad TOML, threshold out of range)           |

use trainrecon_io::IoError;
use trainrecon_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Reconciliation finished but some records did not match exactly.
/// Like `diff(1)`, exit 1 means "not clean." Only raised with `--strict`.
pub const EXIT_INCONSISTENT: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// An input table lacks a column the engine reads.
pub const EXIT_SCHEMA: u8 = 3;

/// File, spreadsheet or database failure.
pub const EXIT_IO: u8 = 4;

/// Engine config could not be parsed or failed validation.
pub const EXIT_CONFIG: u8 = 5;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::MissingColumn { .. } => EXIT_SCHEMA,
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_CONFIG,
    }
}

/// Map an IO error to its exit code.
pub fn io_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::UnsupportedFormat(_) => EXIT_USAGE,
        _ => EXIT_IO,
    }
}
