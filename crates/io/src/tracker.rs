//! Compliance tracker: the per-(employee, procedure) status list that
//! survives between runs, with a free-text note column for manual edits.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use trainrecon_recon::ReconciledRecord;

use crate::error::IoError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerRecord {
    pub employee_id: String,
    pub role: Option<String>,
    pub procedure_name: Option<String>,
    pub assigned_code: Option<String>,
    pub final_status: Option<String>,
    /// `%Y-%m-%d %H:%M:%S`
    pub completed_at: Option<String>,
    pub note: Option<String>,
}

impl TrackerRecord {
    pub fn from_record(record: &ReconciledRecord) -> Self {
        Self {
            employee_id: record.employee_id.clone(),
            role: record.role_b.clone(),
            procedure_name: record.procedure_name.clone(),
            assigned_code: record.assigned_code.clone(),
            final_status: record.final_status.as_ref().map(|s| s.to_string()),
            completed_at: record
                .control_completed_at
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            note: None,
        }
    }

    fn key(&self) -> (&str, Option<&str>) {
        (self.employee_id.as_str(), self.assigned_code.as_deref())
    }
}

/// Where tracker state lives between runs.
pub trait TrackerStore {
    /// Current tracker rows; an absent store is an empty tracker.
    fn load_current_state(&self) -> Result<Vec<TrackerRecord>, IoError>;
    fn save_state(&self, records: &[TrackerRecord]) -> Result<(), IoError>;
}

/// Replace the tracker contents with `fresh`, carrying over the note of every
/// (employee, assigned code) key already present. Rows absent from `fresh`
/// are dropped.
pub fn merge_notes(current: &[TrackerRecord], fresh: Vec<TrackerRecord>) -> Vec<TrackerRecord> {
    let mut notes: HashMap<(&str, Option<&str>), &str> = HashMap::new();
    for record in current {
        if let Some(note) = record.note.as_deref().filter(|n| !n.trim().is_empty()) {
            notes.entry(record.key()).or_insert(note);
        }
    }

    fresh
        .into_iter()
        .map(|mut record| {
            if record.note.is_none() {
                record.note = notes.get(&record.key()).map(|n| n.to_string());
            }
            record
        })
        .collect()
}

/// Load, merge and save in one step. Returns the saved rows.
pub fn update_tracker(
    store: &dyn TrackerStore,
    records: &[ReconciledRecord],
) -> Result<Vec<TrackerRecord>, IoError> {
    let current = store.load_current_state()?;
    let fresh = records.iter().map(TrackerRecord::from_record).collect();
    let merged = merge_notes(&current, fresh);
    store.save_state(&merged)?;
    tracing::info!(previous = current.len(), saved = merged.len(), "tracker updated");
    Ok(merged)
}

/// Tracker kept as a CSV file with a header row.
pub struct CsvTrackerStore {
    path: PathBuf,
}

impl CsvTrackerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TrackerStore for CsvTrackerStore {
    fn load_current_state(&self) -> Result<Vec<TrackerRecord>, IoError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = ::csv::Reader::from_path(&self.path).map_err(|e| IoError::csv(&self.path, e))?;
        let mut records = Vec::new();
        for row in reader.deserialize() {
            records.push(row.map_err(|e| IoError::csv(&self.path, e))?);
        }
        Ok(records)
    }

    fn save_state(&self, records: &[TrackerRecord]) -> Result<(), IoError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| IoError::file(parent, e))?;
        }
        let mut writer = ::csv::Writer::from_path(&self.path).map_err(|e| IoError::csv(&self.path, e))?;
        for record in records {
            writer
                .serialize(record)
                .map_err(|e| IoError::csv(&self.path, e))?;
        }
        writer.flush().map_err(|e| IoError::file(&self.path, e))?;
        Ok(())
    }
}
