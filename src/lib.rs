// SPDX-License-Identifier: PMPL-1.0-or-later
//! auditbot - Accessibility audit engine for RGAA, RAWEB and RAAM
//!
//! Computes what an accessibility audit must test and what its results
//! amount to:
//!
//! - **Catalog**: topic/criterion trees of each referential and the curated
//!   fast and complementary subsets
//! - **Selector**: required criteria for a referential and audit type
//! - **Aggregate**: criteria counts, accessibility rate, distributions by
//!   page and topic, audit status and the CSV export matrix
//! - **Scan**: conversion of automated scan reports into audit results
//! - **Validate**: audit creation and result update checks, result seeding
//!   and upserts
//!
//! Everything is pure computation over in-memory inputs; storage and
//! transport belong to the hosting platform.

pub mod aggregate;
pub mod catalog;
pub mod config;
pub mod error;
pub mod model;
pub mod report;
pub mod scan;
pub mod selector;
pub mod validate;

pub use aggregate::{AggregateOptions, AggregatedReport, Aggregator, BlockingGranularity};
pub use catalog::Catalog;
pub use config::Config;
pub use error::{AuditError, Result};
pub use model::{
    AuditMeta, AuditSnapshot, AuditStatus, AuditType, CriterionId, CriterionResult,
    CriterionStatus, Page, Referential,
};
pub use report::{AuditReport, OutputFormat};
pub use scan::ScanReport;

use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{info, warn};

/// Read a JSON document, or YAML when the extension says so
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    let is_yaml = path
        .extension()
        .map(|e| e == "yml" || e == "yaml")
        .unwrap_or(false);

    if is_yaml {
        Ok(serde_yaml::from_str(&content)?)
    } else {
        Ok(serde_json::from_str(&content)?)
    }
}

/// Aggregate a snapshot and wrap the figures for reporting
pub fn audit_report(snapshot: &AuditSnapshot, catalog: &Catalog, config: &Config) -> AuditReport {
    info!(
        procedure = %snapshot.audit.procedure_name,
        referential = %snapshot.audit.referential,
        audit_type = %snapshot.audit.audit_type,
        pages = snapshot.pages.len(),
        results = snapshot.results.len(),
        "Aggregating audit"
    );

    let aggregator = Aggregator::new(catalog).with_options(config.aggregate_options());
    let figures = aggregator.aggregate_snapshot(snapshot);
    let status = aggregator.snapshot_status(snapshot);

    match figures.accessibility_rate {
        Some(rate) => info!(rate, status = %status, "Audit aggregated"),
        None => info!(status = %status, "Audit aggregated, no applicable criteria"),
    }

    AuditReport::new(&snapshot.audit, status, figures)
}

/// Convert a scan report for one page, honouring `normalize.strict`
pub fn normalize_report(
    report: &ScanReport,
    page_id: i64,
    config: &Config,
) -> Result<Vec<CriterionResult>> {
    if config.normalize.strict {
        return scan::normalize_strict(report, page_id);
    }

    let normalized = scan::normalize(report, page_id);
    if !normalized.rejected.is_empty() {
        warn!(
            rejected = normalized.rejected.len(),
            kept = normalized.results.len(),
            "Some scan rule groups were skipped"
        );
    }
    info!(page_id, results = normalized.results.len(), "Scan report normalized");
    Ok(normalized.results)
}
