//! Reporting views: plain groupings over the reconciled table.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{FinalStatus, ReconciledRecord};
use crate::normalize::normalize_text;

pub const UNCATEGORIZED: &str = "Uncategorized";
pub const NO_STATUS: &str = "(none)";

/// Statuses shown in fixed order on every view.
pub const STATUS_ORDER: [&str; 3] = [
    FinalStatus::OK_LABEL,
    FinalStatus::RETRAINING_LABEL,
    FinalStatus::NOT_STARTED_LABEL,
];

fn status_label(record: &ReconciledRecord) -> &str {
    record
        .final_status
        .as_ref()
        .map(FinalStatus::as_str)
        .unwrap_or(NO_STATUS)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: usize,
}

/// Count of records for each of the three reconciled statuses, in
/// [`STATUS_ORDER`]. Statuses outside that set are not counted here.
pub fn status_counts(records: &[ReconciledRecord]) -> Vec<StatusCount> {
    STATUS_ORDER
        .iter()
        .map(|&status| StatusCount {
            status: status.to_string(),
            count: records.iter().filter(|r| status_label(r) == status).count(),
        })
        .collect()
}

/// Per role B, count of records per final status. Records without a role
/// are left out.
pub fn status_by_role(records: &[ReconciledRecord]) -> BTreeMap<String, BTreeMap<String, usize>> {
    let mut out: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
    for record in records {
        let Some(role) = record.role_b.as_deref() else {
            continue;
        };
        *out.entry(role.to_string())
            .or_default()
            .entry(status_label(record).to_string())
            .or_insert(0) += 1;
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRollup {
    /// `YYYY-MM` of the control completion date.
    pub month: String,
    pub records: usize,
    pub completed: usize,
    pub completion_rate: f64,
}

/// Completion rate per month of the matched completion date. Records
/// without a completion date belong to no month. Unmatched requirements
/// never have one, so they count toward no month's rate.
pub fn monthly_completion(records: &[ReconciledRecord]) -> Vec<MonthlyRollup> {
    let mut months: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for record in records {
        let Some(at) = record.control_completed_at else {
            continue;
        };
        let entry = months.entry(at.format("%Y-%m").to_string()).or_insert((0, 0));
        entry.0 += 1;
        let completed = record
            .control_status
            .as_deref()
            .map(|s| normalize_text(s) == "completed")
            .unwrap_or(false);
        if completed {
            entry.1 += 1;
        }
    }

    months
        .into_iter()
        .map(|(month, (total, completed))| MonthlyRollup {
            month,
            records: total,
            completed,
            completion_rate: completed as f64 / total as f64,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryBreakdown {
    pub category: String,
    pub total: usize,
    pub by_status: BTreeMap<String, usize>,
}

/// Records per category, split by final status.
pub fn category_breakdown(records: &[ReconciledRecord]) -> Vec<CategoryBreakdown> {
    let mut groups: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
    for record in records {
        let category = record.category.as_deref().unwrap_or(UNCATEGORIZED);
        *groups
            .entry(category.to_string())
            .or_default()
            .entry(status_label(record).to_string())
            .or_insert(0) += 1;
    }

    groups
        .into_iter()
        .map(|(category, by_status)| CategoryBreakdown {
            category,
            total: by_status.values().sum(),
            by_status,
        })
        .collect()
}
