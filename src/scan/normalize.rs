// SPDX-License-Identifier: PMPL-1.0-or-later
//! Folding scan rule results into one audit result per criterion.
//!
//! Rule results are grouped by criterion and folded in report order by a
//! small state machine. NOT_COMPLIANT is absorbing: once a rule of the
//! group failed, later successes or manual checks neither change the
//! status nor write a comment.
//!
//! | current          | rule status        | next            | comment written  |
//! |------------------|--------------------|-----------------|------------------|
//! | any              | error              | NOT_COMPLIANT   | not compliant    |
//! | NOT_COMPLIANT    | success/manual/unk | NOT_COMPLIANT   | none             |
//! | other            | success            | COMPLIANT       | compliant        |
//! | other            | manual/unknown     | NOT_APPLICABLE  | not applicable   |

use super::{format_validations, RuleResult, ScanReport, ScanStatus};
use crate::error::{AuditError, Result};
use crate::model::{CriterionId, CriterionResult, CriterionStatus};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Comment field a rule result is rendered into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommentField {
    Compliant,
    NotCompliant,
    NotApplicable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Transition {
    next: CriterionStatus,
    comment: Option<CommentField>,
}

fn transition(current: CriterionStatus, rule_status: ScanStatus) -> Transition {
    match (current, rule_status) {
        (_, ScanStatus::Error) => Transition {
            next: CriterionStatus::NotCompliant,
            comment: Some(CommentField::NotCompliant),
        },
        (CriterionStatus::NotCompliant, _) => Transition {
            next: CriterionStatus::NotCompliant,
            comment: None,
        },
        (_, ScanStatus::Success) => Transition {
            next: CriterionStatus::Compliant,
            comment: Some(CommentField::Compliant),
        },
        (_, ScanStatus::Manual | ScanStatus::Unknown) => Transition {
            next: CriterionStatus::NotApplicable,
            comment: Some(CommentField::NotApplicable),
        },
    }
}

/// Fold state for one criterion
struct CriterionFold {
    status: CriterionStatus,
    compliant: String,
    not_compliant: String,
    not_applicable: String,
}

impl CriterionFold {
    fn new() -> Self {
        Self {
            status: CriterionStatus::NotTested,
            compliant: String::new(),
            not_compliant: String::new(),
            not_applicable: String::new(),
        }
    }

    fn apply(&mut self, rule_result: &RuleResult) {
        let step = transition(self.status, rule_result.status);
        self.status = step.next;
        let field = match step.comment {
            Some(CommentField::Compliant) => &mut self.compliant,
            Some(CommentField::NotCompliant) => &mut self.not_compliant,
            Some(CommentField::NotApplicable) => &mut self.not_applicable,
            None => return,
        };
        // Blocks carry their own heading, no separator needed
        field.push_str(&format_validations(rule_result));
    }

    fn into_result(self, page_id: i64, criterion: CriterionId) -> CriterionResult {
        let mut result = CriterionResult::new(page_id, criterion).with_status(self.status);
        result.compliant_comment = self.compliant;
        result.not_compliant_comment = self.not_compliant;
        result.not_applicable_comment = self.not_applicable;
        result
    }
}

/// A criterion group that could not be converted
#[derive(Debug)]
pub struct RejectedGroup {
    /// Criterion key as found in the report
    pub criterion: String,
    pub rule_ids: Vec<String>,
    pub error: AuditError,
}

/// Output of [`normalize`]
#[derive(Debug, Default)]
pub struct Normalized {
    /// One result per criterion group, in first-appearance order
    pub results: Vec<CriterionResult>,
    pub rejected: Vec<RejectedGroup>,
}

/// Grouping key of a rule result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum GroupKey<'a> {
    Criterion(CriterionId),
    /// Unparseable keys stay grouped by their raw text
    Malformed(&'a str),
}

/// Group rule results by criterion, keeping first-appearance order.
///
/// Spellings that parse to the same criterion (`"1.1"`, `"01.1"`, `" 1.1"`)
/// share one group.
fn group_by_criterion(report: &ScanReport) -> Vec<(GroupKey<'_>, Vec<&RuleResult>)> {
    let mut positions: HashMap<GroupKey<'_>, usize> = HashMap::new();
    let mut groups: Vec<(GroupKey<'_>, Vec<&RuleResult>)> = Vec::new();

    for rule_result in &report.rule_results {
        let raw = rule_result.rule.criterion.as_str();
        let key = match raw.parse::<CriterionId>() {
            Ok(criterion) => GroupKey::Criterion(criterion),
            Err(_) => GroupKey::Malformed(raw),
        };
        match positions.get(&key) {
            Some(&position) => groups[position].1.push(rule_result),
            None => {
                positions.insert(key, groups.len());
                groups.push((key, vec![rule_result]));
            }
        }
    }
    groups
}

/// Convert a scan report into audit results for one page.
///
/// A group whose criterion key is malformed is rejected on its own; the
/// other groups are still converted.
pub fn normalize(report: &ScanReport, page_id: i64) -> Normalized {
    let mut normalized = Normalized::default();

    for (key, rule_results) in group_by_criterion(report) {
        let criterion = match key {
            GroupKey::Criterion(criterion) => criterion,
            GroupKey::Malformed(raw) => {
                warn!(criterion = raw, "Skipping scan rules with a malformed criterion");
                normalized.rejected.push(RejectedGroup {
                    criterion: raw.to_string(),
                    rule_ids: rule_results.iter().map(|r| r.rule.id.clone()).collect(),
                    error: AuditError::MalformedCriterion(raw.to_string()),
                });
                continue;
            }
        };

        let mut fold = CriterionFold::new();
        for rule_result in &rule_results {
            fold.apply(rule_result);
        }
        debug!(
            criterion = %criterion,
            rules = rule_results.len(),
            status = %fold.status,
            "Folded scan rules"
        );
        normalized.results.push(fold.into_result(page_id, criterion));
    }

    normalized
}

/// Like [`normalize`], but any malformed group fails the whole report
pub fn normalize_strict(report: &ScanReport, page_id: i64) -> Result<Vec<CriterionResult>> {
    let normalized = normalize(report, page_id);
    match normalized.rejected.into_iter().next() {
        Some(rejected) => Err(rejected.error),
        None => Ok(normalized.results),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::{ErrorNode, Rule, RuleCheck, ValidationResult};

    fn rule_result(criterion: &str, id: &str, status: ScanStatus, errors: &[&str]) -> RuleResult {
        RuleResult {
            status,
            validations: vec![ValidationResult {
                status,
                error_nodes: errors
                    .iter()
                    .map(|s| ErrorNode { selector: s.to_string(), html: Some("<img>".into()) })
                    .collect(),
                nodes_to_check_manually: Vec::new(),
                criteria: Some(criterion.to_string()),
            }],
            rule: Rule {
                check: RuleCheck::Auto,
                criterion: criterion.to_string(),
                id: id.to_string(),
                wcag: None,
                element_type: None,
                description: None,
                help: None,
                attributes: Vec::new(),
            },
        }
    }

    fn report(rule_results: Vec<RuleResult>) -> ScanReport {
        ScanReport { status: ScanStatus::Error, url: None, rule_results }
    }

    #[test]
    fn test_not_compliant_is_absorbing() {
        use CriterionStatus::*;
        for status in [ScanStatus::Success, ScanStatus::Manual, ScanStatus::Unknown] {
            let step = transition(NotCompliant, status);
            assert_eq!(step.next, NotCompliant);
            assert_eq!(step.comment, None);
        }
        assert_eq!(
            transition(NotCompliant, ScanStatus::Error).comment,
            Some(CommentField::NotCompliant)
        );
    }

    #[test]
    fn test_transitions_from_open_states() {
        use CriterionStatus::*;
        for current in [NotTested, Compliant, NotApplicable] {
            assert_eq!(transition(current, ScanStatus::Error).next, NotCompliant);
            assert_eq!(transition(current, ScanStatus::Success).next, Compliant);
            assert_eq!(transition(current, ScanStatus::Manual).next, NotApplicable);
            assert_eq!(transition(current, ScanStatus::Unknown).next, NotApplicable);
        }
    }

    #[test]
    fn test_error_then_success_stays_not_compliant() {
        let scan = report(vec![
            rule_result("1.1", "1.1.1", ScanStatus::Error, &["img:nth-of-type(1)"]),
            rule_result("1.1", "1.1.4", ScanStatus::Success, &["img:nth-of-type(9)"]),
        ]);
        let normalized = normalize(&scan, 7);
        assert_eq!(normalized.results.len(), 1);
        let result = &normalized.results[0];
        assert_eq!(result.status, CriterionStatus::NotCompliant);
        assert!(result.not_compliant_comment.starts_with("# 1.1.1\n"));
        assert_eq!(result.compliant_comment, "");
        assert_eq!(result.not_applicable_comment, "");
    }

    #[test]
    fn test_success_then_error_keeps_earlier_compliant_comment() {
        let scan = report(vec![
            rule_result("2.1", "2.1.1", ScanStatus::Success, &["iframe"]),
            rule_result("2.1", "2.1.2", ScanStatus::Error, &["frame"]),
        ]);
        let result = &normalize(&scan, 1).results[0];
        assert_eq!(result.status, CriterionStatus::NotCompliant);
        assert!(result.compliant_comment.starts_with("# 2.1.1"));
        assert!(result.not_compliant_comment.starts_with("# 2.1.2"));
    }

    #[test]
    fn test_blocks_are_concatenated_without_separator() {
        let scan = report(vec![
            rule_result("1.1", "1.1.1", ScanStatus::Error, &["a"]),
            rule_result("1.1", "1.1.2", ScanStatus::Error, &["b"]),
        ]);
        let result = &normalize(&scan, 1).results[0];
        assert!(result.not_compliant_comment.contains("`<img>`# 1.1.2\n"));
    }

    #[test]
    fn test_groups_keep_first_appearance_order() {
        let scan = report(vec![
            rule_result("3.1", "3.1.1", ScanStatus::Success, &[]),
            rule_result("1.1", "1.1.1", ScanStatus::Success, &[]),
            rule_result("3.1", "3.1.2", ScanStatus::Success, &[]),
        ]);
        let results = normalize(&scan, 1).results;
        let keys: Vec<String> = results.iter().map(|r| r.criterion().to_string()).collect();
        assert_eq!(keys, vec!["3.1", "1.1"]);
    }

    #[test]
    fn test_malformed_group_is_isolated() {
        let scan = report(vec![
            rule_result("1.1", "1.1.1", ScanStatus::Success, &[]),
            rule_result("one.two", "x.1", ScanStatus::Error, &["a"]),
            rule_result("1.2", "1.2.1", ScanStatus::Manual, &[]),
        ]);
        let normalized = normalize(&scan, 1);
        assert_eq!(normalized.results.len(), 2);
        assert_eq!(normalized.rejected.len(), 1);
        assert_eq!(normalized.rejected[0].criterion, "one.two");
        assert_eq!(normalized.rejected[0].rule_ids, vec!["x.1"]);
        assert!(matches!(normalized.rejected[0].error, AuditError::MalformedCriterion(_)));

        assert!(normalize_strict(&scan, 1).is_err());
    }

    #[test]
    fn test_defaults_on_output() {
        let scan = report(vec![rule_result("1.3", "1.3.1", ScanStatus::Unknown, &[])]);
        let result = &normalize_strict(&scan, 42).unwrap()[0];
        assert_eq!(result.page_id, 42);
        assert_eq!(result.status, CriterionStatus::NotApplicable);
        assert!(!result.transverse);
        assert!(!result.quick_win);
        assert!(result.user_impact.is_none());
        assert!(result.example_images.is_empty());
    }

    #[test]
    fn test_equivalent_keys_share_one_group() {
        let scan = report(vec![
            rule_result("1.1", "1.1.1", ScanStatus::Error, &["img"]),
            rule_result("01.1", "1.1.4", ScanStatus::Success, &["area"]),
            rule_result(" 1.1", "1.1.5", ScanStatus::Manual, &[]),
            rule_result("1.2", "1.2.1", ScanStatus::Success, &[]),
        ]);
        let normalized = normalize(&scan, 1);
        assert!(normalized.rejected.is_empty());
        assert_eq!(normalized.results.len(), 2);

        let images = &normalized.results[0];
        assert_eq!(images.criterion(), CriterionId::new(1, 1));
        assert_eq!(images.status, CriterionStatus::NotCompliant);
        assert_eq!(images.compliant_comment, "");
        assert_eq!(normalized.results[1].criterion(), CriterionId::new(1, 2));
    }

    #[test]
    fn test_malformed_keys_group_by_raw_text() {
        let scan = report(vec![
            rule_result("x.1", "x.1.1", ScanStatus::Error, &[]),
            rule_result("x.1", "x.1.2", ScanStatus::Error, &[]),
            rule_result("x.2", "x.2.1", ScanStatus::Error, &[]),
        ]);
        let rejected = normalize(&scan, 1).rejected;
        assert_eq!(rejected.len(), 2);
        assert_eq!(rejected[0].rule_ids, vec!["x.1.1", "x.1.2"]);
        assert_eq!(rejected[1].criterion, "x.2");
    }

    #[test]
    fn test_empty_report() {
        let normalized = normalize(&report(Vec::new()), 1);
        assert!(normalized.results.is_empty());
        assert!(normalized.rejected.is_empty());
    }
}
