use std::collections::HashMap;

use crate::config::ReconConfig;
use crate::model::{AssignedRequirement, RequirementRow, RosterEntry};

/// Left-join roster entries to requirement rows on role B.
///
/// Output keeps roster order, and requirement-table order within each
/// employee. An employee whose role has no requirement rows (or who has no
/// role B at all) still yields exactly one row with empty requirement fields.
pub fn join_roster(
    roster: &[RosterEntry],
    requirements: &[RequirementRow],
    config: &ReconConfig,
) -> Vec<AssignedRequirement> {
    let mut by_role: HashMap<&str, Vec<&RequirementRow>> = HashMap::new();
    for req in requirements {
        if let Some(role) = req.role_b.as_deref() {
            by_role.entry(role).or_default().push(req);
        }
    }

    let mut assigned = Vec::with_capacity(roster.len());

    for entry in roster {
        let domestic = config.is_domestic(entry.nationality.as_deref());
        let matches = entry
            .role_b
            .as_deref()
            .and_then(|role| by_role.get(role))
            .filter(|reqs| !reqs.is_empty());

        let Some(reqs) = matches else {
            assigned.push(AssignedRequirement {
                employee_id: entry.employee_id.clone(),
                role_a: entry.role_a.clone(),
                role_b: entry.role_b.clone(),
                procedure_name: None,
                assigned_code: None,
                alternative_code: None,
                requirement: None,
            });
            continue;
        };

        for req in reqs {
            let (assigned_code, alternative_code) = if domestic {
                (req.code_b.clone(), req.code_a.clone())
            } else {
                (req.code_a.clone(), req.code_b.clone())
            };
            assigned.push(AssignedRequirement {
                employee_id: entry.employee_id.clone(),
                role_a: entry.role_a.clone(),
                role_b: entry.role_b.clone(),
                procedure_name: req.procedure_name.clone(),
                assigned_code,
                alternative_code,
                requirement: req.requirement.clone(),
            });
        }
    }

    assigned
}
