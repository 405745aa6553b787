// SPDX-License-Identifier: PMPL-1.0-or-later
//! Input validation and result bookkeeping.
//!
//! Validation collects every problem of a request instead of stopping at
//! the first one, so a client can fix all of them in one round trip.

use crate::catalog::Catalog;
use crate::error::{AuditError, Result};
use crate::model::{
    AuditMeta, AuditType, CriterionId, CriterionResult, CriterionStatus, ExampleImage, Page,
    Referential, UserImpact,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::debug;

/// One problem found in a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Position of the offending item in a list input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// Field path, e.g. `pages[1].url`
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "item {}: {}: {}", index, self.field, self.message),
            None => write!(f, "{}: {}", self.field, self.message),
        }
    }
}

/// Every problem found in a request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue { index: None, field: field.into(), message: message.into() });
    }

    fn push_item(&mut self, index: usize, field: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            index: Some(index),
            field: field.into(),
            message: message.into(),
        });
    }

    fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AuditError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let issues: Vec<String> = self.issues.iter().map(ToString::to_string).collect();
        write!(f, "{}", issues.join("; "))
    }
}

/// A page as submitted when creating an audit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub name: String,
    pub url: String,
}

/// Audit creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuditRequest {
    pub procedure_name: String,
    #[serde(default)]
    pub procedure_initiator: Option<String>,
    pub audit_type: AuditType,
    #[serde(alias = "auditReference")]
    pub referential: Referential,
    #[serde(default)]
    pub pages: Vec<PageRequest>,
    #[serde(default)]
    pub auditor_email: Option<String>,
    pub auditor_name: String,
}

/// A validated audit, ready to be stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAudit {
    pub audit: AuditMeta,
    /// Pages numbered from 1 in submission order
    pub pages: Vec<Page>,
    pub auditor_email: Option<String>,
    pub auditor_name: String,
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Check an audit creation request and build the audit it describes
pub fn validate_create_audit(request: &CreateAuditRequest) -> Result<NewAudit> {
    let mut errors = ValidationErrors::default();

    if is_blank(&request.procedure_name) {
        errors.push("procedureName", "must not be blank");
    }
    if request.pages.is_empty() {
        errors.push("pages", "at least one page is required");
    }
    for (index, page) in request.pages.iter().enumerate() {
        if is_blank(&page.name) {
            errors.push(format!("pages[{}].name", index), "must not be blank");
        }
        if is_blank(&page.url) {
            errors.push(format!("pages[{}].url", index), "must not be blank");
        }
    }
    if let Some(email) = &request.auditor_email {
        if !email.contains('@') {
            errors.push("auditorEmail", "must be an email address");
        }
    }
    errors.into_result()?;

    let pages = request
        .pages
        .iter()
        .enumerate()
        .map(|(index, page)| Page {
            id: index as i64 + 1,
            order: index as u32,
            name: page.name.trim().to_string(),
            url: page.url.trim().to_string(),
        })
        .collect();

    Ok(NewAudit {
        audit: AuditMeta {
            audit_type: request.audit_type,
            referential: request.referential,
            procedure_name: request.procedure_name.trim().to_string(),
            procedure_initiator: request.procedure_initiator.clone(),
        },
        pages,
        auditor_email: request.auditor_email.clone(),
        auditor_name: request.auditor_name.clone(),
    })
}

/// Update of one result. `status` is required and checked by
/// [`validate_result_updates`]; other absent fields leave the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultUpdate {
    pub page_id: i64,
    pub topic: u32,
    pub criterium: u32,
    #[serde(default)]
    pub status: Option<CriterionStatus>,
    #[serde(default)]
    pub transverse: Option<bool>,
    /// `Some(None)` clears the impact, an absent field keeps it
    #[serde(default, deserialize_with = "present_or_null")]
    pub user_impact: Option<Option<UserImpact>>,
    #[serde(default)]
    pub compliant_comment: Option<String>,
    #[serde(default)]
    pub not_compliant_comment: Option<String>,
    #[serde(default)]
    pub not_applicable_comment: Option<String>,
    #[serde(default)]
    pub example_images: Option<Vec<ExampleImage>>,
    #[serde(default)]
    pub quick_win: Option<bool>,
}

fn present_or_null<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::<T>::deserialize(deserializer)?))
}

impl ResultUpdate {
    pub fn new(page_id: i64, criterion: CriterionId) -> Self {
        Self {
            page_id,
            topic: criterion.topic,
            criterium: criterion.criterium,
            ..Self::default()
        }
    }

    pub fn criterion(&self) -> CriterionId {
        CriterionId::new(self.topic, self.criterium)
    }

    fn apply_to(&self, result: &mut CriterionResult) {
        if let Some(status) = self.status {
            result.status = status;
        }
        if let Some(transverse) = self.transverse {
            result.transverse = transverse;
        }
        if let Some(impact) = self.user_impact {
            result.user_impact = impact;
        }
        if let Some(comment) = &self.compliant_comment {
            result.compliant_comment = comment.clone();
        }
        if let Some(comment) = &self.not_compliant_comment {
            result.not_compliant_comment = comment.clone();
        }
        if let Some(comment) = &self.not_applicable_comment {
            result.not_applicable_comment = comment.clone();
        }
        if let Some(images) = &self.example_images {
            result.example_images = images.clone();
        }
        if let Some(quick_win) = self.quick_win {
            result.quick_win = quick_win;
        }
    }
}

/// Check a batch of result updates against the audit's pages and the
/// full criteria list of its referential
pub fn validate_result_updates(
    catalog: &Catalog,
    referential: Referential,
    pages: &[Page],
    items: &[ResultUpdate],
) -> Result<()> {
    let page_ids: HashSet<i64> = pages.iter().map(|p| p.id).collect();
    let criteria = catalog.criteria_file(referential);
    let mut errors = ValidationErrors::default();

    for (index, item) in items.iter().enumerate() {
        if !page_ids.contains(&item.page_id) {
            errors.push_item(index, "pageId", format!("page {} does not belong to this audit", item.page_id));
        }
        if item.status.is_none() {
            errors.push_item(index, "status", "is required");
        }
        if item.topic < 1 {
            errors.push_item(index, "topic", "must be at least 1");
        }
        if item.criterium < 1 {
            errors.push_item(index, "criterium", "must be at least 1");
        }
        if item.topic >= 1 && item.criterium >= 1 && !criteria.contains(item.criterion()) {
            errors.push_item(
                index,
                "criterium",
                format!("criterion {} does not exist in {}", item.criterion(), referential),
            );
        }
    }

    debug!(items = items.len(), issues = errors.len(), "Validated result updates");
    errors.into_result()
}

/// One NOT_TESTED result per page and required criterion
pub fn seed_results(pages: &[Page], required: &[CriterionId]) -> Vec<CriterionResult> {
    pages
        .iter()
        .flat_map(|page| required.iter().map(move |&c| CriterionResult::new(page.id, c)))
        .collect()
}

/// Upsert updates into a copy of `results`.
///
/// Existing rows keep their position; rows created by an update are
/// appended in update order.
pub fn apply_updates(results: &[CriterionResult], updates: &[ResultUpdate]) -> Vec<CriterionResult> {
    let mut merged = results.to_vec();
    let mut positions: HashMap<(i64, CriterionId), usize> = merged
        .iter()
        .enumerate()
        .map(|(position, r)| ((r.page_id, r.criterion()), position))
        .collect();

    for update in updates {
        let key = (update.page_id, update.criterion());
        let position = match positions.get(&key) {
            Some(&position) => position,
            None => {
                merged.push(CriterionResult::new(update.page_id, update.criterion()));
                positions.insert(key, merged.len() - 1);
                merged.len() - 1
            }
        };
        update.apply_to(&mut merged[position]);
    }

    merged
}
