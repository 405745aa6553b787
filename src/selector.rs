// SPDX-License-Identifier: PMPL-1.0-or-later
//! Criteria selection: which criteria an audit must test, given its
//! referential and audit type.

use crate::catalog::Catalog;
use crate::model::{AuditType, CriterionId, Referential};
use serde::Serialize;
use tracing::debug;

/// Required criteria of an audit, in test order.
///
/// - `Full`: every criterion of the referential, topics then criteria ascending
/// - `Fast`: the curated fast list verbatim
/// - `Complementary`: the fast list followed by the curated additions, not deduplicated
pub fn select(catalog: &Catalog, referential: Referential, audit_type: AuditType) -> Vec<CriterionId> {
    let criteria = match audit_type {
        AuditType::Full => catalog.criteria_file(referential).criteria().collect(),
        AuditType::Fast => catalog.fast_criteria(referential).to_vec(),
        AuditType::Complementary => catalog.complementary_criteria(referential),
    };
    debug!(
        referential = %referential,
        audit_type = %audit_type,
        count = criteria.len(),
        "Selected required criteria"
    );
    criteria
}

/// Selections for every audit type of a referential
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct CriteriaByAuditType {
    pub fast: Vec<CriterionId>,
    pub complementary: Vec<CriterionId>,
    pub full: Vec<CriterionId>,
}

impl CriteriaByAuditType {
    pub fn get(&self, audit_type: AuditType) -> &[CriterionId] {
        match audit_type {
            AuditType::Fast => &self.fast,
            AuditType::Complementary => &self.complementary,
            AuditType::Full => &self.full,
        }
    }
}

pub fn criteria_by_audit_type(catalog: &Catalog, referential: Referential) -> CriteriaByAuditType {
    CriteriaByAuditType {
        fast: select(catalog, referential, AuditType::Fast),
        complementary: select(catalog, referential, AuditType::Complementary),
        full: select(catalog, referential, AuditType::Full),
    }
}
