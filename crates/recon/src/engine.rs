use tracing::{debug, info, info_span, trace};

use crate::category::CategoryTable;
use crate::classify::{classify_revision, passthrough, ElearningRevisions};
use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::ingest;
use crate::matcher::match_all;
use crate::model::{ReconInput, ReconMeta, ReconResult, ReconciledRecord};
use crate::projector::project;
use crate::roster::join_roster;
use crate::summary::{compute_summary, match_kinds};

/// Run reconciliation per config. Returns one record per (employee,
/// required procedure) plus summary counts.
///
/// Every table is validated before any matching starts, so a schema error
/// never yields a partial result.
pub fn run(config: &ReconConfig, input: &ReconInput) -> Result<ReconResult, ReconError> {
    config.validate()?;
    let span = info_span!("recon", threshold = config.fuzzy_threshold);
    let _guard = span.enter();

    let roster = ingest::read_roster(&input.team, &config.columns)?;
    let requirements = ingest::read_requirements(&input.requirements)?;
    let control = ingest::read_control(&input.control)?;
    let categories = input
        .training_types
        .as_ref()
        .map(ingest::read_training_types)
        .transpose()?
        .map(CategoryTable::new);
    let elearning = input
        .elearning
        .as_ref()
        .map(ingest::read_elearning)
        .transpose()?
        .map(ElearningRevisions::new);

    debug!(
        roster = roster.len(),
        requirements = requirements.len(),
        control = control.len(),
        categories = categories.as_ref().map_or(0, CategoryTable::len),
        "tables loaded"
    );

    let assigned = join_roster(&roster, &requirements, config);
    debug!(rows = assigned.len(), "roster joined");

    let matches = match_all(&assigned, &control, config.fuzzy_threshold, config.parallel);
    let kinds = match_kinds(&matches);

    let mut records: Vec<ReconciledRecord> = Vec::with_capacity(assigned.len());
    for (req, matched) in assigned.iter().zip(matches) {
        trace!(
            employee = %req.employee_id,
            code = req.assigned_code.as_deref().unwrap_or(""),
            kind = %matched.kind,
            score = matched.score,
            "matched"
        );

        let category = match (&categories, req.assigned_code.as_deref()) {
            (Some(table), Some(code)) => table.lookup(code).map(str::to_string),
            _ => None,
        };

        let (elearning_revision, final_status) = match &elearning {
            Some(revisions) => {
                let current = revisions.get(req.assigned_code.as_deref());
                let status = classify_revision(
                    matched.status.as_deref(),
                    matched.revision.as_deref(),
                    current,
                );
                (current.and_then(|c| c.as_text()), Some(status))
            }
            None => (None, passthrough(matched.status.as_deref())),
        };

        records.push(project(req, matched, category, elearning_revision, final_status));
    }

    let summary = compute_summary(&records, &kinds);
    info!(
        records = summary.total_records,
        exact = summary.exact,
        fuzzy = summary.fuzzy,
        unmatched = summary.unmatched,
        inconsistent = summary.inconsistent,
        "reconciliation complete"
    );

    Ok(ReconResult {
        meta: ReconMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            fuzzy_threshold: config.fuzzy_threshold,
            categories_applied: categories.is_some(),
            revisions_checked: elearning.is_some(),
        },
        summary,
        records,
    })
}

/// Check every table's shape without matching anything.
pub fn validate_input(config: &ReconConfig, input: &ReconInput) -> Result<(), ReconError> {
    config.validate()?;
    ingest::read_roster(&input.team, &config.columns)?;
    ingest::read_requirements(&input.requirements)?;
    ingest::read_control(&input.control)?;
    if let Some(ref table) = input.training_types {
        ingest::read_training_types(table)?;
    }
    if let Some(ref table) = input.elearning {
        ingest::read_elearning(table)?;
    }
    Ok(())
}
