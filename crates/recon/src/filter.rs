use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::ReconciledRecord;

/// Row filter over the reconciled table. Every set criterion must hold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportFilter {
    /// Exact role B.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Exact final status label ("OK", "Retreinamento", "Not started", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Inclusive lower bound on the completion date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on the completion date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
}

impl ReportFilter {
    pub fn is_empty(&self) -> bool {
        self.role.is_none() && self.status.is_none() && self.from.is_none() && self.to.is_none()
    }

    pub fn matches(&self, record: &ReconciledRecord) -> bool {
        if let Some(ref role) = self.role {
            if record.role_b.as_deref() != Some(role.as_str()) {
                return false;
            }
        }

        if let Some(ref status) = self.status {
            let actual = record.final_status.as_ref().map(|s| s.as_str());
            if actual != Some(status.as_str()) {
                return false;
            }
        }

        if self.from.is_some() || self.to.is_some() {
            // Undated rows can never satisfy a date bound.
            let Some(date) = record.control_completed_at.map(|dt| dt.date()) else {
                return false;
            };
            if self.from.is_some_and(|from| date < from) {
                return false;
            }
            if self.to.is_some_and(|to| date > to) {
                return false;
            }
        }

        true
    }

    pub fn apply<'a>(&self, records: &'a [ReconciledRecord]) -> Vec<&'a ReconciledRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }

    /// Compact `key=value` rendering for history logs. Empty filter is "".
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(ref role) = self.role {
            parts.push(format!("role={role}"));
        }
        if let Some(ref status) = self.status {
            parts.push(format!("status={status}"));
        }
        if let Some(from) = self.from {
            parts.push(format!("from={from}"));
        }
        if let Some(to) = self.to {
            parts.push(format!("to={to}"));
        }
        parts.join(", ")
    }
}
