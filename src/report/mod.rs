// SPDX-License-Identifier: PMPL-1.0-or-later
//! Report generation for audit figures.
//!
//! Supports two output formats:
//! - Text: human-readable summary for the terminal
//! - JSON: the aggregated report wrapped with audit metadata and a timestamp
//!
//! The export matrix is rendered as CSV.

use crate::aggregate::{AggregatedReport, ExportMatrix, ResultDistribution};
use crate::model::{AuditMeta, AuditStatus, AuditType, Referential};
use crate::selector::CriteriaByAuditType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Structured JSON
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

/// Aggregated figures of one audit with the metadata needed to read them
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub generated_at: DateTime<Utc>,
    pub procedure_name: String,
    pub referential: Referential,
    pub audit_type: AuditType,
    pub status: AuditStatus,
    #[serde(flatten)]
    pub figures: AggregatedReport,
}

impl AuditReport {
    pub fn new(audit: &AuditMeta, status: AuditStatus, figures: AggregatedReport) -> Self {
        Self {
            generated_at: Utc::now(),
            procedure_name: audit.procedure_name.clone(),
            referential: audit.referential,
            audit_type: audit.audit_type,
            status,
            figures,
        }
    }
}

/// Generate a report in the requested format
pub fn generate_report(report: &AuditReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => generate_text_report(report),
        OutputFormat::Json => to_json(report),
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize report: {}\"}}", e))
}

fn distribution_line(distribution: &ResultDistribution) -> String {
    format!(
        "C {} ({}%), NC {} ({}%), NA {} ({}%)",
        distribution.compliant.raw,
        distribution.compliant.percentage,
        distribution.not_compliant.raw,
        distribution.not_compliant.percentage,
        distribution.not_applicable.raw,
        distribution.not_applicable.percentage,
    )
}

/// Generate human-readable text report
fn generate_text_report(report: &AuditReport) -> String {
    let mut output = String::new();
    let figures = &report.figures;
    let count = &figures.criteria_count;

    output.push_str("=== Auditbot Accessibility Audit Report ===\n\n");
    if !report.procedure_name.is_empty() {
        output.push_str(&format!("Procedure: {}\n", report.procedure_name));
    }
    output.push_str(&format!("Referential: {} ({} audit)\n", report.referential, report.audit_type));
    output.push_str(&format!("Status: {}\n\n", report.status));

    match figures.accessibility_rate {
        Some(rate) => output.push_str(&format!("Accessibility rate: {}%\n", rate)),
        None => output.push_str("Accessibility rate: n/a (no applicable criteria)\n"),
    }
    output.push_str(&format!(
        "Criteria: {} total, {} applicable, {} not applicable\n",
        count.total, count.applicable, count.not_applicable
    ));
    output.push_str(&format!("  Compliant: {}\n", count.compliant));
    output.push_str(&format!(
        "  Not compliant: {} ({} blocking)\n\n",
        count.not_compliant, count.blocking
    ));

    output.push_str(&format!(
        "--- Results ({} tested) ---\n{}\n\n",
        figures.result_distribution.tested(),
        distribution_line(&figures.result_distribution)
    ));

    if !figures.page_distributions.is_empty() {
        output.push_str("--- By page ---\n");
        for page in &figures.page_distributions {
            output.push_str(&format!("{}: {}\n", page.name, distribution_line(&page.distribution)));
        }
        output.push('\n');
    }

    if !figures.topic_distributions.is_empty() {
        output.push_str("--- By topic ---\n");
        for topic in &figures.topic_distributions {
            output.push_str(&format!("{}: {}\n", topic.name, distribution_line(&topic.distribution)));
        }
    }

    output
}

/// Render the criteria lists of a referential
pub fn generate_criteria_listing(
    referential: Referential,
    criteria: &CriteriaByAuditType,
    format: OutputFormat,
) -> String {
    match format {
        OutputFormat::Json => to_json(criteria),
        OutputFormat::Text => {
            let mut output = format!("=== {} criteria ===\n", referential);
            for audit_type in AuditType::ALL {
                let list = criteria.get(audit_type);
                let keys: Vec<String> = list.iter().map(ToString::to_string).collect();
                output.push_str(&format!("\n{} ({}):\n", audit_type, list.len()));
                if keys.is_empty() {
                    output.push_str("  (none)\n");
                } else {
                    output.push_str(&format!("  {}\n", keys.join(", ")));
                }
            }
            output
        }
    }
}

/// Render the export matrix as CSV, comma separated, CRLF line endings
pub fn export_csv(matrix: &ExportMatrix) -> String {
    let mut output = String::new();
    for record in matrix.to_records() {
        let fields: Vec<String> = record.iter().map(|f| csv_field(f)).collect();
        output.push_str(&fields.join(","));
        output.push_str("\r\n");
    }
    output
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
