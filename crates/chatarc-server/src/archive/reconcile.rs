//! Integrity reconciliation.
//!
//! The message store's insert mode silently discards duplicate keys, so row
//! counts alone cannot distinguish a fully novel export from one overlapping
//! previously archived data. Reconciliation compares the export's candidate
//! ids against how many of them existed in the store before this job's
//! insert attempt.

/// Outcome of reconciling one job's export against prior data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveResult {
    /// Number of records the export produced. The source system's own count
    /// is trusted; duplicates within one export count per record.
    pub message_count: i64,
    /// Effective number of new records persisted for this job.
    pub inserted_count: i64,
    /// True iff the export had zero overlap with prior data.
    pub ok: bool,
}

/// Compute the effective-insert result for a candidate id set, given how many
/// of those ids were already present in the store before the insert.
pub fn reconcile(candidate_ids: &[String], preexisting_count: i64) -> EffectiveResult {
    let message_count = candidate_ids.len() as i64;
    let inserted_count = message_count - preexisting_count;
    EffectiveResult {
        message_count,
        inserted_count,
        ok: inserted_count == message_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("m{i}")).collect()
    }

    #[test]
    fn test_no_overlap_is_ok() {
        let result = reconcile(&ids(10), 0);
        assert_eq!(result.message_count, 10);
        assert_eq!(result.inserted_count, 10);
        assert!(result.ok);
    }

    #[test]
    fn test_partial_overlap_is_mismatch() {
        let result = reconcile(&ids(10), 3);
        assert_eq!(result.message_count, 10);
        assert_eq!(result.inserted_count, 7);
        assert!(!result.ok);
    }

    #[test]
    fn test_full_overlap() {
        let result = reconcile(&ids(5), 5);
        assert_eq!(result.inserted_count, 0);
        assert!(!result.ok);
    }

    #[test]
    fn test_empty_export_is_trivially_ok() {
        let result = reconcile(&[], 0);
        assert_eq!(result.message_count, 0);
        assert_eq!(result.inserted_count, 0);
        assert!(result.ok);
    }
}
