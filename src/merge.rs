//! # Result Merge Module
//!
//! ## Purpose
//! Merges per-county record batches into the final deduplicated, ordered
//! result set.
//!
//! ## Input/Output Specification
//! - **Input**: Per-county record batches in completion order
//! - **Output**: Records with pairwise-distinct docket ids, sorted by primary
//!   participants using ordinal comparison
//! - **Duplicates**: First-seen occurrence wins; the removed count is reported,
//!   never an error

use crate::DocketRecord;
use std::collections::HashSet;
use tracing::info;

/// Final merged result set plus merge statistics
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// Deduplicated records in final order
    pub records: Vec<DocketRecord>,
    /// Records dropped because their docket id was already seen
    pub duplicates_removed: usize,
}

/// Flatten per-county batches, drop docket-id duplicates (stable, first-seen
/// wins), and sort by primary participants. The sort is mandatory: batches
/// arrive in completion order, which is nondeterministic.
pub fn merge(batches: Vec<Vec<DocketRecord>>) -> MergeOutcome {
    let total: usize = batches.iter().map(Vec::len).sum();
    let mut seen: HashSet<String> = HashSet::with_capacity(total);
    let mut records: Vec<DocketRecord> = Vec::with_capacity(total);

    for record in batches.into_iter().flatten() {
        if seen.insert(record.docket_id.clone()) {
            records.push(record);
        }
    }

    let duplicates_removed = total - records.len();
    if duplicates_removed > 0 {
        info!(duplicates_removed, "removed dockets with duplicate ids");
    }

    records.sort_by(|a, b| a.primary_participants.cmp(&b.primary_participants));
    info!(dockets = records.len(), "merged final docket set");

    MergeOutcome {
        records,
        duplicates_removed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(docket_id: &str, participants: &str, status: &str) -> DocketRecord {
        DocketRecord {
            docket_id: docket_id.to_string(),
            court: "Magisterial District".to_string(),
            caption: String::new(),
            status: status.to_string(),
            filing_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            primary_participants: participants.to_string(),
            dob: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            county: "Erie".to_string(),
            court_office: String::new(),
            police_incident_no: String::new(),
            docket_url: String::new(),
        }
    }

    #[test]
    fn test_first_seen_wins_across_batches() {
        let outcome = merge(vec![
            vec![record("MJ-1", "Young, Zoe", "Active")],
            vec![record("MJ-1", "Young, Zoe", "Closed"), record("MJ-2", "Abbot, Amy", "Active")],
        ]);
        assert_eq!(outcome.duplicates_removed, 1);
        assert_eq!(outcome.records.len(), 2);
        let kept = outcome.records.iter().find(|r| r.docket_id == "MJ-1").unwrap();
        assert_eq!(kept.status, "Active");
    }

    #[test]
    fn test_sorted_by_participants_ordinal() {
        let outcome = merge(vec![vec![
            record("MJ-1", "beta", "Active"),
            record("MJ-2", "Alpha", "Active"),
            record("MJ-3", "Zulu", "Active"),
        ]]);
        // Ordinal (byte-wise) comparison: uppercase sorts before lowercase.
        let order: Vec<&str> = outcome
            .records
            .iter()
            .map(|r| r.primary_participants.as_str())
            .collect();
        assert_eq!(order, vec!["Alpha", "Zulu", "beta"]);
    }

    #[test]
    fn test_ids_pairwise_distinct() {
        let outcome = merge(vec![
            vec![record("MJ-1", "a", ""), record("MJ-2", "b", "")],
            vec![record("MJ-2", "b", ""), record("MJ-3", "c", ""), record("MJ-1", "a", "")],
        ]);
        let mut ids: Vec<&str> = outcome.records.iter().map(|r| r.docket_id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), outcome.records.len());
        assert_eq!(outcome.duplicates_removed, 2);
    }

    #[test]
    fn test_empty_batches() {
        let outcome = merge(Vec::new());
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.duplicates_removed, 0);
    }
}
