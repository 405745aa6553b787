// SPDX-License-Identifier: PMPL-1.0-or-later
//! Criterion × page status matrix backing the CSV export.

use super::ResultIndex;
use crate::error::{AuditError, Result};
use crate::model::{CriterionId, CriterionResult, CriterionStatus, Page};
use serde::Serialize;

/// Header of the first column
pub const CRITERIA_COLUMN: &str = "Critères";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub criterion: CriterionId,
    /// One status per page, in page order
    pub statuses: Vec<CriterionStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportMatrix {
    pub pages: Vec<String>,
    pub rows: Vec<ExportRow>,
}

impl ExportMatrix {
    /// Header row followed by one row per criterion, statuses as short codes
    pub fn to_records(&self) -> Vec<Vec<String>> {
        let mut records = Vec::with_capacity(self.rows.len() + 1);

        let mut header = vec![CRITERIA_COLUMN.to_string()];
        header.extend(self.pages.iter().cloned());
        records.push(header);

        for row in &self.rows {
            let mut record = vec![row.criterion.to_string()];
            record.extend(row.statuses.iter().map(|s| s.code().to_string()));
            records.push(record);
        }
        records
    }
}

/// Build the matrix for every required criterion and page.
///
/// Every (criterion, page) pair must have a stored result; a gap is a
/// data-integrity error rather than a guessed status.
pub fn export_matrix(
    pages: &[Page],
    required: &[CriterionId],
    results: &[CriterionResult],
) -> Result<ExportMatrix> {
    let index = ResultIndex::build(results);

    let rows = required
        .iter()
        .map(|&criterion| {
            let statuses = pages
                .iter()
                .map(|page| {
                    index
                        .get(criterion, page.id)
                        .map(|r| r.status)
                        .ok_or(AuditError::MissingResult { criterion, page_id: page.id })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(ExportRow { criterion, statuses })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ExportMatrix {
        pages: pages.iter().map(|p| p.name.clone()).collect(),
        rows,
    })
}
