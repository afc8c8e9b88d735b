//! Flat output schema: column labels and per-record cells in export order.

use crate::model::{AssignedRequirement, FinalStatus, MatchResult, ReconciledRecord};
use crate::table::CellValue;

pub const OUTPUT_COLUMNS: [&str; 16] = [
    "employee_id",
    "role_b",
    "role_a",
    "procedure_name",
    "assigned_code",
    "alternative_code",
    "requirement",
    "category",
    "control_status",
    "control_name",
    "control_revision",
    "elearning_revision",
    "final_status",
    "control_completed_at",
    "match_score",
    "inconsistent",
];

/// Assemble one output record. No derivation happens here beyond copying.
pub fn project(
    req: &AssignedRequirement,
    matched: MatchResult,
    category: Option<String>,
    elearning_revision: Option<String>,
    final_status: Option<FinalStatus>,
) -> ReconciledRecord {
    let inconsistent = matched.is_inconsistent();
    ReconciledRecord {
        employee_id: req.employee_id.clone(),
        role_b: req.role_b.clone(),
        role_a: req.role_a.clone(),
        procedure_name: req.procedure_name.clone(),
        assigned_code: req.assigned_code.clone(),
        alternative_code: req.alternative_code.clone(),
        requirement: req.requirement.clone(),
        category,
        control_status: matched.status,
        control_name: matched.name,
        control_revision: matched.revision,
        elearning_revision,
        final_status,
        control_completed_at: matched.completed_at,
        match_score: matched.score,
        inconsistent,
    }
}

fn text(value: &Option<String>) -> CellValue {
    value.clone().map(CellValue::Text).unwrap_or(CellValue::Empty)
}

/// Cells of `record` in [`OUTPUT_COLUMNS`] order.
pub fn record_cells(record: &ReconciledRecord) -> Vec<CellValue> {
    vec![
        CellValue::Text(record.employee_id.clone()),
        text(&record.role_b),
        text(&record.role_a),
        text(&record.procedure_name),
        text(&record.assigned_code),
        text(&record.alternative_code),
        text(&record.requirement),
        text(&record.category),
        text(&record.control_status),
        text(&record.control_name),
        text(&record.control_revision),
        text(&record.elearning_revision),
        record
            .final_status
            .as_ref()
            .map(|s| CellValue::Text(s.to_string()))
            .unwrap_or(CellValue::Empty),
        record
            .control_completed_at
            .map(CellValue::DateTime)
            .unwrap_or(CellValue::Empty),
        CellValue::Number(record.match_score),
        CellValue::Bool(record.inconsistent),
    ]
}
