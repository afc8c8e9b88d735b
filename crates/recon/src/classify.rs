//! Final compliance status from the matched control status and revisions.

use std::collections::HashMap;

use crate::model::{ElearningRow, FinalStatus};
use crate::normalize::normalize_text;
use crate::revision::{extract_revision, revision_digits};
use crate::table::CellValue;

const COMPLETED: &str = "completed";

/// Current e-learning revision per procedure code. When a code appears more
/// than once, the first row is authoritative.
#[derive(Debug, Default)]
pub struct ElearningRevisions {
    by_code: HashMap<String, CellValue>,
}

impl ElearningRevisions {
    pub fn new(rows: Vec<ElearningRow>) -> Self {
        let mut by_code = HashMap::new();
        for row in rows {
            if row.code.is_empty() {
                continue;
            }
            by_code.entry(row.code).or_insert(row.revision);
        }
        Self { by_code }
    }

    pub fn get(&self, code: Option<&str>) -> Option<&CellValue> {
        self.by_code.get(code?.trim())
    }
}

/// Cross-check a completion against the current e-learning revision.
///
/// - Control status other than "completed" (case/accent-insensitive) is
///   `NotStarted`, whatever the revisions say.
/// - A revision that cannot be extracted on either side is `Ok`.
/// - Equal digit-only revisions are `Ok`, different ones `Retraining`.
pub fn classify_revision(
    control_status: Option<&str>,
    control_revision: Option<&str>,
    elearning_revision: Option<&CellValue>,
) -> FinalStatus {
    let completed = control_status
        .map(|s| normalize_text(s) == COMPLETED)
        .unwrap_or(false);
    if !completed {
        return FinalStatus::NotStarted;
    }

    let control = control_revision.and_then(revision_digits);
    let current = elearning_revision.and_then(extract_revision);

    match (control, current) {
        (Some(a), Some(b)) if a != b => FinalStatus::Retraining,
        _ => FinalStatus::Ok,
    }
}

/// Without an e-learning export the raw control status is the final status.
pub fn passthrough(control_status: Option<&str>) -> Option<FinalStatus> {
    control_status.map(|s| FinalStatus::Raw(s.to_string()))
}
