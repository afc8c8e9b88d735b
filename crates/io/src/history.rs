// Report history log (SQLite)

use std::path::Path;

use rusqlite::{params, Connection};
use serde::Serialize;

use crate::error::IoError;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS report_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL,       -- local time, %Y-%m-%d %H:%M:%S
    report_type TEXT NOT NULL,     -- xlsx, csv, json
    file_name TEXT NOT NULL,
    filter_options TEXT,           -- NULL when unfiltered
    user TEXT
);
"#;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One report about to be logged.
#[derive(Debug, Clone, Default)]
pub struct NewReport {
    pub report_type: String,
    pub file_name: String,
    pub filter_options: Option<String>,
    pub user: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub timestamp: String,
    pub report_type: String,
    pub file_name: String,
    pub filter_options: Option<String>,
    pub user: Option<String>,
}

pub struct ReportHistory {
    conn: Connection,
}

impl ReportHistory {
    /// Open (creating if needed) the history database at `path`.
    pub fn open(path: &Path) -> Result<Self, IoError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| IoError::file(parent, e))?;
        }
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, IoError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, IoError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Record a produced report, stamped with the current local time.
    pub fn log(&self, report: &NewReport) -> Result<i64, IoError> {
        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.conn.execute(
            "INSERT INTO report_history (timestamp, report_type, file_name, filter_options, user)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                timestamp,
                report.report_type,
                report.file_name,
                report.filter_options.as_deref().filter(|s| !s.is_empty()),
                report.user,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, file = %report.file_name, "report logged");
        Ok(id)
    }

    /// Logged reports, newest first. `limit` of `None` returns everything.
    pub fn entries(&self, limit: Option<usize>) -> Result<Vec<HistoryEntry>, IoError> {
        let limit = limit.map(|n| n as i64).unwrap_or(-1);
        let mut stmt = self.conn.prepare(
            "SELECT id, timestamp, report_type, file_name, filter_options, user
             FROM report_history ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok(HistoryEntry {
                id: row.get(0)?,
                timestamp: row.get(1)?,
                report_type: row.get(2)?,
                file_name: row.get(3)?,
                filter_options: row.get(4)?,
                user: row.get(5)?,
            })
        })?;

        let mut entries = Vec::new();
        for entry in rows {
            entries.push(entry?);
        }
        Ok(entries)
    }
}
