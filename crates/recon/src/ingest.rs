//! Typed views over the raw input tables.
//!
//! The team table is read by header name; every other table is read by
//! column position. Width is checked up front so a shifted sheet fails with
//! a schema error instead of being silently misread.

use crate::config::TeamColumns;
use crate::error::ReconError;
use crate::model::{CategoryRow, ControlRecord, ElearningRow, RequirementRow, RosterEntry};
use crate::normalize::name_key;
use crate::revision::revision_token;
use crate::table::Table;

pub const TEAM: &str = "team";
pub const REQUIREMENTS: &str = "requirements";
pub const CONTROL: &str = "control";
pub const TRAINING_TYPES: &str = "training-type";
pub const ELEARNING: &str = "e-learning";

const REQUIREMENT_LAYOUT: [&str; 6] = [
    "role A",
    "role B",
    "procedure name",
    "code A",
    "code B",
    "requirement",
];

const CONTROL_LAYOUT: [&str; 10] = [
    "completer name",
    "unused",
    "unused",
    "unused",
    "procedure code",
    "procedure title",
    "unused",
    "unused",
    "status",
    "completion date",
];

const TRAINING_TYPE_LAYOUT: [&str; 3] = ["code A", "code B", "category"];

const ELEARNING_LAYOUT: [&str; 10] = [
    "procedure code",
    "unused",
    "unused",
    "unused",
    "unused",
    "unused",
    "unused",
    "unused",
    "unused",
    "revision",
];

/// Split a combined position label at its first newline into (role A, role B).
/// Both halves are trimmed; a label without a newline has no role B.
pub fn split_position(label: &str) -> (Option<String>, Option<String>) {
    let non_empty = |s: &str| {
        let t = s.trim();
        (!t.is_empty()).then(|| t.to_string())
    };
    match label.split_once('\n') {
        Some((a, b)) => (non_empty(a), non_empty(b)),
        None => (non_empty(label), None),
    }
}

pub fn read_roster(team: &Table, columns: &TeamColumns) -> Result<Vec<RosterEntry>, ReconError> {
    let position_idx = team.require_column(TEAM, &columns.position)?;
    let identity_idx = team.require_column(TEAM, &columns.identity)?;
    // Nationality is optional: absent column means every employee is foreign.
    let nationality_idx = team.column_index(&columns.nationality);

    let entries = (0..team.len())
        .map(|row| {
            let (role_a, role_b) = team
                .cell(row, position_idx)
                .as_text()
                .map(|label| split_position(&label))
                .unwrap_or((None, None));
            RosterEntry {
                employee_id: team.cell(row, identity_idx).as_text().unwrap_or_default(),
                nationality: nationality_idx.and_then(|i| team.cell(row, i).as_trimmed()),
                role_a,
                role_b,
            }
        })
        .collect();

    Ok(entries)
}

pub fn read_requirements(table: &Table) -> Result<Vec<RequirementRow>, ReconError> {
    table.require_width(REQUIREMENTS, &REQUIREMENT_LAYOUT)?;

    Ok((0..table.len())
        .map(|row| RequirementRow {
            role_a: table.cell(row, 0).as_trimmed(),
            role_b: table.cell(row, 1).as_trimmed(),
            procedure_name: table.cell(row, 2).as_text(),
            code_a: table.cell(row, 3).as_trimmed(),
            code_b: table.cell(row, 4).as_trimmed(),
            requirement: table.cell(row, 5).as_text(),
        })
        .collect())
}

pub fn read_control(table: &Table) -> Result<Vec<ControlRecord>, ReconError> {
    table.require_width(CONTROL, &CONTROL_LAYOUT)?;

    Ok((0..table.len())
        .map(|row| {
            let title = name_key(&table.cell(row, 5).as_text().unwrap_or_default());
            let revision = (!title.is_empty()).then(|| revision_token(&title));
            ControlRecord {
                name: name_key(&table.cell(row, 0).as_text().unwrap_or_default()),
                code: table.cell(row, 4).as_trimmed().unwrap_or_default(),
                title,
                revision,
                status: table.cell(row, 8).as_text(),
                completed_at: table.cell(row, 9).as_datetime(),
            }
        })
        .collect())
}

pub fn read_training_types(table: &Table) -> Result<Vec<CategoryRow>, ReconError> {
    table.require_width(TRAINING_TYPES, &TRAINING_TYPE_LAYOUT)?;

    Ok((0..table.len())
        .map(|row| CategoryRow {
            code_a: table.cell(row, 0).as_trimmed(),
            code_b: table.cell(row, 1).as_trimmed(),
            category: table.cell(row, 2).as_text(),
        })
        .collect())
}

pub fn read_elearning(table: &Table) -> Result<Vec<ElearningRow>, ReconError> {
    table.require_width(ELEARNING, &ELEARNING_LAYOUT)?;

    Ok((0..table.len())
        .map(|row| ElearningRow {
            code: table.cell(row, 0).as_trimmed().unwrap_or_default(),
            revision: table.cell(row, 9).clone(),
        })
        .collect())
}
