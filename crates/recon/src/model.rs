use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

use crate::table::{CellValue, Table};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Snapshot of every source table for one run.
#[derive(Debug, Clone)]
pub struct ReconInput {
    pub team: Table,
    pub requirements: Table,
    pub control: Table,
    pub training_types: Option<Table>,
    pub elearning: Option<Table>,
}

/// One team-roster row after splitting the combined position label.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterEntry {
    pub employee_id: String,
    pub nationality: Option<String>,
    pub role_a: Option<String>,
    pub role_b: Option<String>,
}

/// "This role must complete this procedure."
#[derive(Debug, Clone, PartialEq)]
pub struct RequirementRow {
    pub role_a: Option<String>,
    pub role_b: Option<String>,
    pub procedure_name: Option<String>,
    pub code_a: Option<String>,
    pub code_b: Option<String>,
    pub requirement: Option<String>,
}

/// Roster entry joined with one of its role's requirements. Requirement
/// fields are `None` when the role had no requirement rows.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignedRequirement {
    pub employee_id: String,
    pub role_a: Option<String>,
    pub role_b: Option<String>,
    pub procedure_name: Option<String>,
    /// Code in the employee's native language variant.
    pub assigned_code: Option<String>,
    /// Code in the other language variant.
    pub alternative_code: Option<String>,
    pub requirement: Option<String>,
}

/// A logged completion event from the control table.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlRecord {
    /// Completer display name, upper-cased and trimmed.
    pub name: String,
    pub code: String,
    /// Procedure title, upper-cased and trimmed.
    pub title: String,
    /// Trailing characters of `title`; `None` when the title is blank.
    pub revision: Option<String>,
    pub status: Option<String>,
    /// `None` when the date cell was blank or unparseable.
    pub completed_at: Option<NaiveDateTime>,
}

/// (code A, code B, category) row of the training-type table.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRow {
    pub code_a: Option<String>,
    pub code_b: Option<String>,
    pub category: Option<String>,
}

/// Current revision of a procedure in the e-learning system.
#[derive(Debug, Clone, PartialEq)]
pub struct ElearningRow {
    pub code: String,
    pub revision: CellValue,
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Fuzzy,
    Unmatched,
}

impl std::fmt::Display for MatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Fuzzy => write!(f, "fuzzy"),
            Self::Unmatched => write!(f, "unmatched"),
        }
    }
}

/// Best control record for one requirement, or none.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub kind: MatchKind,
    pub status: Option<String>,
    pub completed_at: Option<NaiveDateTime>,
    pub name: Option<String>,
    pub revision: Option<String>,
    /// Similarity in [0, 100]; 100 for exact matches.
    pub score: f64,
}

impl MatchResult {
    pub fn unmatched(score: f64) -> Self {
        Self {
            kind: MatchKind::Unmatched,
            status: None,
            completed_at: None,
            name: None,
            revision: None,
            score,
        }
    }

    pub fn from_record(kind: MatchKind, record: &ControlRecord, score: f64) -> Self {
        Self {
            kind,
            status: record.status.clone(),
            completed_at: record.completed_at,
            name: Some(record.name.clone()),
            revision: record.revision.clone(),
            score,
        }
    }

    pub fn is_match(&self) -> bool {
        self.kind != MatchKind::Unmatched
    }

    /// Anything short of a perfect exact-name, exact-code match.
    pub fn is_inconsistent(&self) -> bool {
        !self.is_match() || self.score < 100.0
    }
}

// ---------------------------------------------------------------------------
// Final status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FinalStatus {
    Ok,
    /// Completed an outdated revision.
    Retraining,
    NotStarted,
    /// Control status passed through unchanged (no e-learning export).
    Raw(String),
}

impl FinalStatus {
    pub const OK_LABEL: &'static str = "OK";
    pub const RETRAINING_LABEL: &'static str = "Retreinamento";
    pub const NOT_STARTED_LABEL: &'static str = "Not started";

    pub fn as_str(&self) -> &str {
        match self {
            Self::Ok => Self::OK_LABEL,
            Self::Retraining => Self::RETRAINING_LABEL,
            Self::NotStarted => Self::NOT_STARTED_LABEL,
            Self::Raw(s) => s,
        }
    }
}

impl std::fmt::Display for FinalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FinalStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// One output row per (employee, required procedure). Field order is the
/// export column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciledRecord {
    pub employee_id: String,
    pub role_b: Option<String>,
    pub role_a: Option<String>,
    pub procedure_name: Option<String>,
    pub assigned_code: Option<String>,
    pub alternative_code: Option<String>,
    pub requirement: Option<String>,
    pub category: Option<String>,
    pub control_status: Option<String>,
    pub control_name: Option<String>,
    pub control_revision: Option<String>,
    pub elearning_revision: Option<String>,
    pub final_status: Option<FinalStatus>,
    pub control_completed_at: Option<NaiveDateTime>,
    pub match_score: f64,
    pub inconsistent: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconSummary {
    pub total_records: usize,
    pub matched: usize,
    pub exact: usize,
    pub fuzzy: usize,
    pub unmatched: usize,
    pub inconsistent: usize,
    pub status_counts: std::collections::BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub engine_version: String,
    pub run_at: String,
    pub fuzzy_threshold: u8,
    pub categories_applied: bool,
    pub revisions_checked: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub records: Vec<ReconciledRecord>,
}
