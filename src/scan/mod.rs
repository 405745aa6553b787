// SPDX-License-Identifier: PMPL-1.0-or-later
//! Automated scan reports (UUV accessibility reports) and their conversion
//! into audit results.
//!
//! A scan report lists rule results. Each rule targets one criterion
//! (`"topic.criterium"`) and carries validations with the nodes in error
//! and the nodes an auditor must check by hand.

pub mod format;
pub mod normalize;

pub use format::format_validations;
pub use normalize::{normalize, normalize_strict, Normalized, RejectedGroup};

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Outcome of a rule or validation.
///
/// Serialized lowercase as the scanner emits it; uppercase spellings are
/// accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    #[default]
    #[serde(alias = "UNKNOWN")]
    Unknown,
    #[serde(alias = "SUCCESS")]
    Success,
    #[serde(alias = "MANUAL")]
    Manual,
    #[serde(alias = "ERROR")]
    Error,
}

/// Whether a rule is decided automatically or needs an auditor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuleCheck {
    #[serde(alias = "manual")]
    Manual,
    #[default]
    #[serde(alias = "auto")]
    Auto,
}

/// Help text, a single string or several lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleHelp {
    One(String),
    Many(Vec<String>),
}

/// A scanner rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    #[serde(default)]
    pub check: RuleCheck,
    /// Target criterion as `"topic.criterium"`
    pub criterion: String,
    pub id: String,
    #[serde(default)]
    pub wcag: Option<String>,
    #[serde(default)]
    pub element_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub help: Option<RuleHelp>,
    #[serde(default)]
    pub attributes: Vec<String>,
}

/// A node that failed a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorNode {
    pub selector: String,
    #[serde(default)]
    pub html: Option<String>,
}

/// A serialized DOM element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomNode {
    #[serde(default, rename = "outerHTML")]
    pub outer_html: Option<String>,
}

/// Element matched by a rule query and the elements linked to it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    #[serde(default)]
    pub dom_node: DomNode,
    #[serde(default)]
    pub linked_nodes: Vec<DomNode>,
}

/// A node an auditor has to verify manually
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualCheckNode {
    #[serde(default)]
    pub node: QueryResult,
    pub selector: String,
    #[serde(default)]
    pub attributes: String,
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub help: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    #[serde(default)]
    pub status: ScanStatus,
    #[serde(default)]
    pub error_nodes: Vec<ErrorNode>,
    #[serde(default)]
    pub nodes_to_check_manually: Vec<ManualCheckNode>,
    #[serde(default)]
    pub criteria: Option<String>,
}

/// Result of one rule on the scanned page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleResult {
    #[serde(default)]
    pub status: ScanStatus,
    #[serde(default)]
    pub validations: Vec<ValidationResult>,
    pub rule: Rule,
}

/// A complete scan report for one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    #[serde(default)]
    pub status: ScanStatus,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub rule_results: Vec<RuleResult>,
}

impl ScanReport {
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}
