// SPDX-License-Identifier: PMPL-1.0-or-later
//! Audit status derivation.

use crate::model::{AuditStatus, CriterionResult, CriterionStatus};

/// Derive the audit status, in this order:
///
/// 1. `IN_PROGRESS` when the result count differs from
///    `required_count × page_count`, or any result is still NOT_TESTED
/// 2. `PUBLISHABLE` when a procedure initiator is set
/// 3. `COMPLETED` otherwise
pub fn audit_status(
    required_count: usize,
    page_count: usize,
    results: &[CriterionResult],
    procedure_initiator: Option<&str>,
) -> AuditStatus {
    if results.len() != required_count * page_count
        || results.iter().any(|r| r.status == CriterionStatus::NotTested)
    {
        return AuditStatus::InProgress;
    }

    match procedure_initiator {
        Some(initiator) if !initiator.trim().is_empty() => AuditStatus::Publishable,
        _ => AuditStatus::Completed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CriterionId;

    fn results(statuses: &[CriterionStatus]) -> Vec<CriterionResult> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, s)| CriterionResult::new(1, CriterionId::new(1, i as u32 + 1)).with_status(*s))
            .collect()
    }

    #[test]
    fn test_count_mismatch_is_in_progress_even_with_initiator() {
        let rows = results(&[CriterionStatus::Compliant, CriterionStatus::Compliant]);
        assert_eq!(audit_status(3, 1, &rows, Some("Ministère")), AuditStatus::InProgress);
        assert_eq!(audit_status(1, 1, &rows, Some("Ministère")), AuditStatus::InProgress);
    }

    #[test]
    fn test_not_tested_is_in_progress() {
        let rows = results(&[CriterionStatus::Compliant, CriterionStatus::NotTested]);
        assert_eq!(audit_status(2, 1, &rows, Some("Ministère")), AuditStatus::InProgress);
    }

    #[test]
    fn test_complete_without_initiator_is_completed() {
        let rows = results(&[CriterionStatus::Compliant, CriterionStatus::NotApplicable]);
        assert_eq!(audit_status(2, 1, &rows, None), AuditStatus::Completed);
        assert_eq!(audit_status(2, 1, &rows, Some("  ")), AuditStatus::Completed);
    }

    #[test]
    fn test_complete_with_initiator_is_publishable() {
        let rows = results(&[CriterionStatus::NotCompliant, CriterionStatus::Compliant]);
        assert_eq!(audit_status(2, 1, &rows, Some("Ministère")), AuditStatus::Publishable);
    }

    #[test]
    fn test_empty_audit_is_completed() {
        assert_eq!(audit_status(0, 3, &[], None), AuditStatus::Completed);
    }
}
