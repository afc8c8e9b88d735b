use std::collections::HashMap;

use rapidfuzz::fuzz;

use crate::model::{AssignedRequirement, ControlRecord, MatchKind, MatchResult};
use crate::normalize::{name_key, normalize_text};

/// Exact-name matches score this.
pub const PERFECT_SCORE: f64 = 100.0;

/// Control records indexed by procedure code, with fuzzy-normalized names
/// computed once per record.
///
/// Candidate lists hold row indices in control-table order, so every
/// "first seen wins" rule below follows the original table order.
pub struct ControlIndex<'a> {
    records: &'a [ControlRecord],
    by_code: HashMap<&'a str, Vec<usize>>,
    normalized_names: Vec<String>,
}

impl<'a> ControlIndex<'a> {
    pub fn new(records: &'a [ControlRecord]) -> Self {
        let mut by_code: HashMap<&'a str, Vec<usize>> = HashMap::new();
        for (i, rec) in records.iter().enumerate() {
            by_code.entry(rec.code.as_str()).or_default().push(i);
        }
        let normalized_names = records.iter().map(|r| normalize_text(&r.name)).collect();
        Self {
            records,
            by_code,
            normalized_names,
        }
    }

    /// Row indices whose code is in `codes`, ascending. Duplicate codes
    /// collapse.
    fn candidates(&self, codes: &[&str]) -> Vec<usize> {
        let mut out: Vec<usize> = Vec::new();
        for (i, code) in codes.iter().enumerate() {
            if codes[..i].contains(code) {
                continue;
            }
            if let Some(rows) = self.by_code.get(code) {
                out.extend_from_slice(rows);
            }
        }
        out.sort_unstable();
        out
    }

    /// Find the best control record for one assigned requirement.
    ///
    /// 1. Candidates = records whose code is the assigned or alternative code.
    /// 2. Exact (upper-cased, trimmed) name match wins with score 100; among
    ///    several, the latest completion date, else the first row.
    /// 3. Otherwise the highest fuzzy ratio over accent-folded names, accepted
    ///    when it reaches `threshold`.
    pub fn match_requirement(&self, req: &AssignedRequirement, threshold: u8) -> MatchResult {
        let mut codes: Vec<&str> = Vec::with_capacity(2);
        if let Some(code) = req.assigned_code.as_deref().map(str::trim) {
            if !code.is_empty() {
                codes.push(code);
            }
        }
        if let Some(code) = req.alternative_code.as_deref().map(str::trim) {
            if !code.is_empty() {
                codes.push(code);
            }
        }

        let candidates = self.candidates(&codes);
        if candidates.is_empty() {
            return MatchResult::unmatched(0.0);
        }

        let employee_key = name_key(&req.employee_id);

        if let Some(idx) = self.best_exact(&candidates, &employee_key) {
            return MatchResult::from_record(MatchKind::Exact, &self.records[idx], PERFECT_SCORE);
        }

        let employee_norm = normalize_text(&employee_key);
        let mut best: Option<usize> = None;
        let mut best_score = 0.0_f64;
        for &idx in &candidates {
            // rapidfuzz scores in [0, 1].
            let score = fuzz::ratio(employee_norm.chars(), self.normalized_names[idx].chars()) * PERFECT_SCORE;
            // Strictly greater: ties keep the earlier row.
            if score > best_score {
                best_score = score;
                best = Some(idx);
            }
        }

        match best {
            Some(idx) if best_score >= f64::from(threshold) => {
                MatchResult::from_record(MatchKind::Fuzzy, &self.records[idx], best_score)
            }
            _ => MatchResult::unmatched(best_score),
        }
    }

    fn best_exact(&self, candidates: &[usize], employee_key: &str) -> Option<usize> {
        let mut first: Option<usize> = None;
        let mut latest: Option<usize> = None;

        for &idx in candidates {
            let rec = &self.records[idx];
            if rec.name != employee_key {
                continue;
            }
            first.get_or_insert(idx);
            if let Some(at) = rec.completed_at {
                let newer = match latest {
                    Some(cur) => self.records[cur].completed_at.map_or(true, |c| at > c),
                    None => true,
                };
                if newer {
                    latest = Some(idx);
                }
            }
        }

        latest.or(first)
    }
}

/// Match every requirement against `control`, preserving input order.
pub fn match_all(
    requirements: &[AssignedRequirement],
    control: &[ControlRecord],
    threshold: u8,
    parallel: bool,
) -> Vec<MatchResult> {
    let index = ControlIndex::new(control);
    if parallel {
        use rayon::prelude::*;
        requirements
            .par_iter()
            .map(|req| index.match_requirement(req, threshold))
            .collect()
    } else {
        requirements
            .iter()
            .map(|req| index.match_requirement(req, threshold))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn day(d: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap().and_hms_opt(0, 0, 0)
    }

    fn ctrl(name: &str, code: &str, status: &str, at: Option<NaiveDateTime>, rev: &str) -> ControlRecord {
        ControlRecord {
            name: name.into(),
            code: code.into(),
            title: format!("PROCEDURE {rev}"),
            revision: Some(rev.into()),
            status: Some(status.into()),
            completed_at: at,
        }
    }

    fn req(id: &str, assigned: Option<&str>, alternative: Option<&str>) -> AssignedRequirement {
        AssignedRequirement {
            employee_id: id.into(),
            role_a: Some("Operator".into()),
            role_b: Some("Operador".into()),
            procedure_name: Some("Induction".into()),
            assigned_code: assigned.map(Into::into),
            alternative_code: alternative.map(Into::into),
            requirement: None,
        }
    }

    #[test]
    fn exact_match_scores_100() {
        let control = vec![ctrl("JOHN SMITH", "P-100", "Completed", day(10), "REV0003")];
        let index = ControlIndex::new(&control);
        let m = index.match_requirement(&req("John Smith", Some("P-100"), Some("P-200")), 80);
        assert_eq!(m.kind, MatchKind::Exact);
        assert_eq!(m.score, 100.0);
        assert!(!m.is_inconsistent());
        assert_eq!(m.name.as_deref(), Some("JOHN SMITH"));
        assert_eq!(m.revision.as_deref(), Some("REV0003"));
    }

    #[test]
    fn no_candidate_code_scores_zero() {
        let control = vec![ctrl("JOHN SMITH", "P-999", "Completed", day(10), "REV0003")];
        let index = ControlIndex::new(&control);
        let m = index.match_requirement(&req("John Smith", Some("P-100"), Some("P-200")), 0);
        assert_eq!(m.kind, MatchKind::Unmatched);
        assert_eq!(m.score, 0.0);
        assert!(m.is_inconsistent());
        assert_eq!(m.status, None);
    }

    #[test]
    fn missing_codes_never_match() {
        let control = vec![ctrl("JOHN SMITH", "", "Completed", day(10), "REV0003")];
        let index = ControlIndex::new(&control);
        let m = index.match_requirement(&req("John Smith", None, None), 0);
        assert_eq!(m.kind, MatchKind::Unmatched);
        assert_eq!(m.score, 0.0);
    }

    #[test]
    fn alternative_code_is_a_candidate() {
        let control = vec![ctrl("JOHN SMITH", "P-200", "Completed", day(10), "REV0003")];
        let index = ControlIndex::new(&control);
        let m = index.match_requirement(&req("John Smith", Some("P-100"), Some("P-200")), 80);
        assert_eq!(m.kind, MatchKind::Exact);
    }

    #[test]
    fn dated_exact_match_beats_undated() {
        let control = vec![
            ctrl("JOHN SMITH", "P-100", "In Progress", None, "REV0001"),
            ctrl("JOHN SMITH", "P-100", "Completed", day(5), "REV0002"),
        ];
        let index = ControlIndex::new(&control);
        let m = index.match_requirement(&req("John Smith", Some("P-100"), None), 80);
        assert_eq!(m.status.as_deref(), Some("Completed"));
        assert_eq!(m.completed_at, day(5));
    }

    #[test]
    fn latest_exact_match_wins_first_on_ties() {
        let control = vec![
            ctrl("JOHN SMITH", "P-100", "A", day(3), "REV0001"),
            ctrl("JOHN SMITH", "P-200", "B", day(9), "REV0002"),
            ctrl("JOHN SMITH", "P-100", "C", day(9), "REV0003"),
        ];
        let index = ControlIndex::new(&control);
        let m = index.match_requirement(&req("John Smith", Some("P-100"), Some("P-200")), 80);
        assert_eq!(m.status.as_deref(), Some("B"));
    }

    #[test]
    fn undated_exact_matches_take_first_row() {
        let control = vec![
            ctrl("JOHN SMITH", "P-100", "first", None, "REV0001"),
            ctrl("JOHN SMITH", "P-100", "second", None, "REV0002"),
        ];
        let index = ControlIndex::new(&control);
        let m = index.match_requirement(&req("John Smith", Some("P-100"), None), 80);
        assert_eq!(m.status.as_deref(), Some("first"));
    }

    #[test]
    fn fuzzy_fallback_above_threshold() {
        let control = vec![ctrl("JON SMITH", "P-100", "Completed", day(10), "REV0003")];
        let index = ControlIndex::new(&control);
        let m = index.match_requirement(&req("John Smith", Some("P-100"), None), 80);
        assert_eq!(m.kind, MatchKind::Fuzzy);
        assert!(m.score >= 80.0 && m.score < 100.0, "score {}", m.score);
        assert!(m.is_inconsistent());
        assert_eq!(m.name.as_deref(), Some("JON SMITH"));
    }

    #[test]
    fn fuzzy_below_threshold_reports_best_score() {
        let control = vec![ctrl("JON SMITH", "P-100", "Completed", day(10), "REV0003")];
        let index = ControlIndex::new(&control);
        let m = index.match_requirement(&req("John Smith", Some("P-100"), None), 99);
        assert_eq!(m.kind, MatchKind::Unmatched);
        assert!(m.score > 80.0 && m.score < 99.0);
        assert_eq!(m.name, None);
    }

    #[test]
    fn fuzzy_folds_accents_but_exact_does_not() {
        let control = vec![ctrl("JOÃO SILVA", "P-100", "Completed", day(10), "REV0003")];
        let index = ControlIndex::new(&control);
        let m = index.match_requirement(&req("Joao Silva", Some("P-100"), None), 80);
        // Not an exact match (accents differ), but folds to the same text.
        assert_eq!(m.kind, MatchKind::Fuzzy);
        assert_eq!(m.score, 100.0);
        assert!(!m.is_inconsistent());
    }

    #[test]
    fn fuzzy_ties_keep_first_row() {
        let control = vec![
            ctrl("JOHN SMYTH", "P-100", "first", day(1), "REV0001"),
            ctrl("JOHN SMITT", "P-100", "second", day(2), "REV0002"),
        ];
        let index = ControlIndex::new(&control);
        let m = index.match_requirement(&req("John Smith", Some("P-100"), None), 50);
        assert_eq!(m.status.as_deref(), Some("first"));
    }

    #[test]
    fn zero_similarity_never_matches() {
        let control = vec![ctrl("XYZ", "P-100", "Completed", day(1), "REV0001")];
        let index = ControlIndex::new(&control);
        let m = index.match_requirement(&req("abc", Some("P-100"), None), 0);
        assert_eq!(m.kind, MatchKind::Unmatched);
        assert_eq!(m.score, 0.0);
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let control: Vec<ControlRecord> = (0..50)
            .map(|i| ctrl(&format!("EMPLOYEE {i:02}"), &format!("P-{}", i % 7), "Completed", day(1 + (i % 28) as u32), "REV0001"))
            .collect();
        let reqs: Vec<AssignedRequirement> = (0..200)
            .map(|i| {
                let code = format!("P-{}", i % 9);
                req(&format!("Employee {:02}", i % 60), Some(&code), None)
            })
            .collect();
        let seq = match_all(&reqs, &control, 80, false);
        let par = match_all(&reqs, &control, 80, true);
        assert_eq!(seq, par);
    }
}
