use std::collections::BTreeMap;

use crate::aggregate::NO_STATUS;
use crate::model::{MatchKind, MatchResult, ReconSummary, ReconciledRecord};

/// Compute summary statistics from the projected records and the match
/// results they were built from (same order, same length).
pub fn compute_summary(records: &[ReconciledRecord], matches: &[MatchKind]) -> ReconSummary {
    let mut status_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut exact = 0;
    let mut fuzzy = 0;
    let mut unmatched = 0;

    for kind in matches {
        match kind {
            MatchKind::Exact => exact += 1,
            MatchKind::Fuzzy => fuzzy += 1,
            MatchKind::Unmatched => unmatched += 1,
        }
    }

    for r in records {
        let label = r
            .final_status
            .as_ref()
            .map(|s| s.to_string())
            .unwrap_or_else(|| NO_STATUS.to_string());
        *status_counts.entry(label).or_insert(0) += 1;
    }

    ReconSummary {
        total_records: records.len(),
        matched: exact + fuzzy,
        exact,
        fuzzy,
        unmatched,
        inconsistent: records.iter().filter(|r| r.inconsistent).count(),
        status_counts,
    }
}

/// Kinds of a batch of match results, for [`compute_summary`].
pub fn match_kinds(matches: &[MatchResult]) -> Vec<MatchKind> {
    matches.iter().map(|m| m.kind).collect()
}
