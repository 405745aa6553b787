// SPDX-License-Identifier: PMPL-1.0-or-later
//! Audit domain types shared by the catalog, aggregator and normalizer.
//!
//! JSON shapes follow the platform's API: camelCase field names and
//! SCREAMING_SNAKE_CASE enum values.

use crate::error::AuditError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Accessibility referential an audit is conducted against
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Referential {
    /// Référentiel d'évaluation de l'accessibilité web (Luxembourg)
    #[serde(rename = "RAWEB")]
    Raweb,
    /// Référentiel d'évaluation de l'accessibilité des applications mobiles
    #[serde(rename = "RAAM")]
    Raam,
    /// Référentiel général d'amélioration de l'accessibilité (France)
    #[serde(rename = "RGAA")]
    Rgaa,
}

impl Referential {
    pub const ALL: [Referential; 3] = [Referential::Raweb, Referential::Raam, Referential::Rgaa];
}

impl fmt::Display for Referential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Referential::Raweb => write!(f, "RAWEB"),
            Referential::Raam => write!(f, "RAAM"),
            Referential::Rgaa => write!(f, "RGAA"),
        }
    }
}

impl FromStr for Referential {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "RAWEB" => Ok(Referential::Raweb),
            "RAAM" => Ok(Referential::Raam),
            "RGAA" => Ok(Referential::Rgaa),
            _ => Err(AuditError::UnknownReferential(s.to_string())),
        }
    }
}

/// Scope of an audit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditType {
    /// Curated quick subset
    Fast,
    /// Fast subset plus curated additions
    Complementary,
    /// Every criterion of the referential
    Full,
}

impl AuditType {
    pub const ALL: [AuditType; 3] = [AuditType::Fast, AuditType::Complementary, AuditType::Full];
}

impl fmt::Display for AuditType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditType::Fast => write!(f, "FAST"),
            AuditType::Complementary => write!(f, "COMPLEMENTARY"),
            AuditType::Full => write!(f, "FULL"),
        }
    }
}

impl FromStr for AuditType {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "FAST" => Ok(AuditType::Fast),
            "COMPLEMENTARY" => Ok(AuditType::Complementary),
            "FULL" => Ok(AuditType::Full),
            _ => Err(AuditError::UnknownAuditType(s.to_string())),
        }
    }
}

/// Identifies one criterion within a referential.
///
/// Ordered by topic, then criterium, which is the catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CriterionId {
    pub topic: u32,
    pub criterium: u32,
}

impl CriterionId {
    pub const fn new(topic: u32, criterium: u32) -> Self {
        Self { topic, criterium }
    }
}

impl fmt::Display for CriterionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.topic, self.criterium)
    }
}

impl FromStr for CriterionId {
    type Err = AuditError;

    /// Parse a `"topic.criterium"` key, both parts positive integers
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || AuditError::MalformedCriterion(s.to_string());
        let (topic, criterium) = s.trim().split_once('.').ok_or_else(malformed)?;
        let topic: u32 = topic.parse().map_err(|_| malformed())?;
        let criterium: u32 = criterium.parse().map_err(|_| malformed())?;
        if topic == 0 || criterium == 0 {
            return Err(malformed());
        }
        Ok(CriterionId { topic, criterium })
    }
}

/// A sampled page of the audited site or application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: i64,
    #[serde(default)]
    pub order: u32,
    pub name: String,
    pub url: String,
}

/// Outcome of testing one criterion on one page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CriterionStatus {
    #[default]
    NotTested,
    Compliant,
    NotCompliant,
    NotApplicable,
}

impl CriterionStatus {
    /// Short code used in the export matrix
    pub fn code(&self) -> &'static str {
        match self {
            CriterionStatus::Compliant => "C",
            CriterionStatus::NotTested => "NT",
            CriterionStatus::NotApplicable => "NA",
            CriterionStatus::NotCompliant => "NC",
        }
    }

    pub fn is_tested(&self) -> bool {
        !matches!(self, CriterionStatus::NotTested)
    }
}

impl fmt::Display for CriterionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CriterionStatus::NotTested => write!(f, "NOT_TESTED"),
            CriterionStatus::Compliant => write!(f, "COMPLIANT"),
            CriterionStatus::NotCompliant => write!(f, "NOT_COMPLIANT"),
            CriterionStatus::NotApplicable => write!(f, "NOT_APPLICABLE"),
        }
    }
}

impl FromStr for CriterionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NOT_TESTED" => Ok(CriterionStatus::NotTested),
            "COMPLIANT" => Ok(CriterionStatus::Compliant),
            "NOT_COMPLIANT" => Ok(CriterionStatus::NotCompliant),
            "NOT_APPLICABLE" => Ok(CriterionStatus::NotApplicable),
            other => Err(format!("Unknown criterion status: {}", other)),
        }
    }
}

/// How badly a non-compliance affects users
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserImpact {
    Minor,
    Major,
    Blocking,
}

/// Screenshot attached to a result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleImage {
    pub filename: String,
    pub key: String,
    #[serde(default)]
    pub thumbnail_key: String,
}

/// The per-(page, criterion) record of an audit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionResult {
    pub page_id: i64,
    pub topic: u32,
    pub criterium: u32,
    #[serde(default)]
    pub status: CriterionStatus,
    #[serde(default)]
    pub transverse: bool,
    #[serde(default)]
    pub user_impact: Option<UserImpact>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub compliant_comment: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub not_compliant_comment: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub not_applicable_comment: String,
    #[serde(default)]
    pub example_images: Vec<ExampleImage>,
    #[serde(default)]
    pub quick_win: bool,
}

impl CriterionResult {
    /// A fresh, untested result with every optional field defaulted
    pub fn new(page_id: i64, criterion: CriterionId) -> Self {
        Self {
            page_id,
            topic: criterion.topic,
            criterium: criterion.criterium,
            status: CriterionStatus::NotTested,
            transverse: false,
            user_impact: None,
            compliant_comment: String::new(),
            not_compliant_comment: String::new(),
            not_applicable_comment: String::new(),
            example_images: Vec::new(),
            quick_win: false,
        }
    }

    pub fn with_status(mut self, status: CriterionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_user_impact(mut self, impact: UserImpact) -> Self {
        self.user_impact = Some(impact);
        self
    }

    pub fn criterion(&self) -> CriterionId {
        CriterionId::new(self.topic, self.criterium)
    }

    /// Non-compliant with a blocking user impact
    pub fn is_blocking(&self) -> bool {
        self.status == CriterionStatus::NotCompliant
            && self.user_impact == Some(UserImpact::Blocking)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Audit metadata consumed by aggregation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditMeta {
    pub audit_type: AuditType,
    #[serde(alias = "auditReference")]
    pub referential: Referential,
    #[serde(default)]
    pub procedure_name: String,
    #[serde(default)]
    pub procedure_initiator: Option<String>,
}

/// Lifecycle state shown to auditors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditStatus {
    InProgress,
    Completed,
    Publishable,
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditStatus::InProgress => write!(f, "IN_PROGRESS"),
            AuditStatus::Completed => write!(f, "COMPLETED"),
            AuditStatus::Publishable => write!(f, "PUBLISHABLE"),
        }
    }
}

/// Everything the persistence layer hands over for one audit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditSnapshot {
    pub audit: AuditMeta,
    pub pages: Vec<Page>,
    #[serde(default)]
    pub results: Vec<CriterionResult>,
}
