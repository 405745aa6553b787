// SPDX-License-Identifier: PMPL-1.0-or-later
//! Result aggregation: turns the stored (page × criterion) results of an
//! audit into the figures shown in the published report.
//!
//! Two granularities are kept apart:
//! - criteria counts and the accessibility rate roll each required
//!   criterion up across pages and count it once
//! - distributions count every (page × criterion) row
//!
//! Results are indexed by `(criterion, page)`. Should the store ever hand
//! over two rows for the same key, the later one wins; rows are never summed.

pub mod distribution;
pub mod export;
pub mod status;

pub use distribution::{
    PageResultDistribution, RawAndPercentage, ResultDistribution, TopicResultDistribution,
};
pub use export::{export_matrix, ExportMatrix, ExportRow};
pub use status::audit_status;

use crate::catalog::Catalog;
use crate::model::{
    AuditMeta, AuditSnapshot, AuditStatus, CriterionId, CriterionResult, CriterionStatus, Page,
};
use crate::selector;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// How the `blocking` count is tallied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockingGranularity {
    /// Every blocking non-compliant (page × criterion) row counts
    #[default]
    Row,
    /// A criterion counts once if any of its pages is blocking
    Criterion,
}

/// Criteria tallies of an audit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriteriaCount {
    pub total: usize,
    pub compliant: usize,
    pub not_compliant: usize,
    pub blocking: usize,
    pub applicable: usize,
    pub not_applicable: usize,
}

/// Figures of an audit report, recomputed on demand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedReport {
    /// Compliant share of applicable criteria, rounded to a whole percent.
    /// `None` when no criterion is applicable.
    pub accessibility_rate: Option<u32>,
    pub criteria_count: CriteriaCount,
    pub result_distribution: ResultDistribution,
    pub page_distributions: Vec<PageResultDistribution>,
    pub topic_distributions: Vec<TopicResultDistribution>,
}

/// Results keyed by `(criterion, page id)`, last write wins
pub(crate) struct ResultIndex<'a> {
    by_key: HashMap<(CriterionId, i64), &'a CriterionResult>,
    duplicates: usize,
}

impl<'a> ResultIndex<'a> {
    pub(crate) fn build(results: &'a [CriterionResult]) -> Self {
        let mut by_key = HashMap::with_capacity(results.len());
        let mut duplicates = 0;
        for result in results {
            if by_key.insert((result.criterion(), result.page_id), result).is_some() {
                duplicates += 1;
            }
        }
        if duplicates > 0 {
            warn!(duplicates, "Duplicate results for the same page and criterion, keeping the last");
        }
        Self { by_key, duplicates }
    }

    pub(crate) fn get(&self, criterion: CriterionId, page_id: i64) -> Option<&'a CriterionResult> {
        self.by_key.get(&(criterion, page_id)).copied()
    }

    pub(crate) fn duplicates(&self) -> usize {
        self.duplicates
    }
}

/// Status of one criterion across every page
fn roll_up(statuses: &[CriterionStatus]) -> CriterionStatus {
    if statuses.contains(&CriterionStatus::NotCompliant) {
        return CriterionStatus::NotCompliant;
    }
    if !statuses.is_empty() && statuses.iter().all(|s| *s == CriterionStatus::NotApplicable) {
        return CriterionStatus::NotApplicable;
    }
    if statuses.contains(&CriterionStatus::Compliant)
        && statuses
            .iter()
            .all(|s| matches!(s, CriterionStatus::Compliant | CriterionStatus::NotApplicable))
    {
        return CriterionStatus::Compliant;
    }
    CriterionStatus::NotTested
}

/// Options for [`Aggregator`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateOptions {
    pub blocking: BlockingGranularity,
}

/// Computes reports against a catalog
pub struct Aggregator<'c> {
    catalog: &'c Catalog,
    options: AggregateOptions,
}

impl<'c> Aggregator<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self { catalog, options: AggregateOptions::default() }
    }

    pub fn with_options(mut self, options: AggregateOptions) -> Self {
        self.options = options;
        self
    }

    /// Aggregate the results of an audit against its required criteria
    pub fn aggregate(
        &self,
        audit: &AuditMeta,
        pages: &[Page],
        required: &[CriterionId],
        results: &[CriterionResult],
    ) -> AggregatedReport {
        let index = ResultIndex::build(results);
        let required_set: HashSet<CriterionId> = required.iter().copied().collect();
        let page_ids: HashSet<i64> = pages.iter().map(|p| p.id).collect();

        // Deduplicated rows of the audit, in input order
        let rows: Vec<&CriterionResult> = results
            .iter()
            .filter(|r| required_set.contains(&r.criterion()) && page_ids.contains(&r.page_id))
            .filter(|r| {
                index
                    .get(r.criterion(), r.page_id)
                    .map(|kept| std::ptr::eq(kept, *r))
                    .unwrap_or(false)
            })
            .collect();

        let criteria_count = self.count_criteria(pages, required, &index, &rows);
        let accessibility_rate = accessibility_rate(&criteria_count);

        let result_distribution = ResultDistribution::from_results(rows.iter().copied());

        let page_distributions = pages
            .iter()
            .map(|page| PageResultDistribution {
                name: page.name.clone(),
                distribution: ResultDistribution::from_results(
                    rows.iter().copied().filter(|r| r.page_id == page.id),
                ),
            })
            .collect();

        let topic_distributions = self
            .catalog
            .criteria_file(audit.referential)
            .topics
            .iter()
            .filter(|topic| required_set.iter().any(|c| c.topic == topic.number))
            .map(|topic| TopicResultDistribution {
                name: topic.name.clone(),
                distribution: ResultDistribution::from_results(
                    rows.iter().copied().filter(|r| r.topic == topic.number),
                ),
            })
            .collect();

        debug!(
            referential = %audit.referential,
            audit_type = %audit.audit_type,
            rows = rows.len(),
            duplicates = index.duplicates(),
            "Aggregated audit results"
        );

        AggregatedReport {
            accessibility_rate,
            criteria_count,
            result_distribution,
            page_distributions,
            topic_distributions,
        }
    }

    fn count_criteria(
        &self,
        pages: &[Page],
        required: &[CriterionId],
        index: &ResultIndex<'_>,
        rows: &[&CriterionResult],
    ) -> CriteriaCount {
        let mut count = CriteriaCount { total: required.len(), ..CriteriaCount::default() };

        for &criterion in required {
            let page_results: Vec<&CriterionResult> =
                pages.iter().filter_map(|p| index.get(criterion, p.id)).collect();
            // A page without a stored result is untested
            let mut statuses: Vec<CriterionStatus> = page_results.iter().map(|r| r.status).collect();
            statuses.resize(pages.len(), CriterionStatus::NotTested);

            match roll_up(&statuses) {
                CriterionStatus::Compliant => count.compliant += 1,
                CriterionStatus::NotCompliant => {
                    count.not_compliant += 1;
                    if self.options.blocking == BlockingGranularity::Criterion
                        && page_results.iter().any(|r| r.is_blocking())
                    {
                        count.blocking += 1;
                    }
                }
                CriterionStatus::NotApplicable => count.not_applicable += 1,
                CriterionStatus::NotTested => {}
            }
        }

        if self.options.blocking == BlockingGranularity::Row {
            count.blocking = rows.iter().filter(|r| r.is_blocking()).count();
        }
        count.applicable = count.total - count.not_applicable;
        count
    }

    /// Select the required criteria of a snapshot and aggregate its results
    pub fn aggregate_snapshot(&self, snapshot: &AuditSnapshot) -> AggregatedReport {
        let required = self.required_criteria(&snapshot.audit);
        self.aggregate(&snapshot.audit, &snapshot.pages, &required, &snapshot.results)
    }

    /// Status of a snapshot
    pub fn snapshot_status(&self, snapshot: &AuditSnapshot) -> AuditStatus {
        let required = self.required_criteria(&snapshot.audit);
        audit_status(
            required.len(),
            snapshot.pages.len(),
            &snapshot.results,
            snapshot.audit.procedure_initiator.as_deref(),
        )
    }

    /// Export matrix of a snapshot
    pub fn snapshot_export(&self, snapshot: &AuditSnapshot) -> crate::Result<ExportMatrix> {
        let required = self.required_criteria(&snapshot.audit);
        export_matrix(&snapshot.pages, &required, &snapshot.results)
    }

    pub fn required_criteria(&self, audit: &AuditMeta) -> Vec<CriterionId> {
        selector::select(self.catalog, audit.referential, audit.audit_type)
    }
}

fn accessibility_rate(count: &CriteriaCount) -> Option<u32> {
    if count.applicable == 0 {
        return None;
    }
    Some((count.compliant as f64 / count.applicable as f64 * 100.0).round() as u32)
}

/// Aggregate against the builtin catalog with default options
pub fn aggregate(
    audit: &AuditMeta,
    pages: &[Page],
    required: &[CriterionId],
    results: &[CriterionResult],
) -> AggregatedReport {
    aggregate_with(AggregateOptions::default(), audit, pages, required, results)
}

/// Aggregate against the builtin catalog
pub fn aggregate_with(
    options: AggregateOptions,
    audit: &AuditMeta,
    pages: &[Page],
    required: &[CriterionId],
    results: &[CriterionResult],
) -> AggregatedReport {
    Aggregator::new(Catalog::builtin())
        .with_options(options)
        .aggregate(audit, pages, required, results)
}
