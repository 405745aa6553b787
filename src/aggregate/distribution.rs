// SPDX-License-Identifier: PMPL-1.0-or-later
//! Raw counts and percentages of results by status.

use crate::model::{CriterionResult, CriterionStatus};
use serde::{Deserialize, Serialize};

/// A count and its share of the tested results, in percent
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawAndPercentage {
    pub raw: usize,
    pub percentage: f64,
}

/// Distribution of results over the three tested statuses
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultDistribution {
    pub compliant: RawAndPercentage,
    pub not_compliant: RawAndPercentage,
    pub not_applicable: RawAndPercentage,
}

impl ResultDistribution {
    /// Distribution of a set of (page × criterion) rows.
    ///
    /// Percentages are taken over the rows that have been tested, so
    /// NOT_TESTED rows count in neither the numerator nor the denominator.
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a CriterionResult>) -> Self {
        let (mut compliant, mut not_compliant, mut not_applicable) = (0, 0, 0);
        for result in results {
            match result.status {
                CriterionStatus::Compliant => compliant += 1,
                CriterionStatus::NotCompliant => not_compliant += 1,
                CriterionStatus::NotApplicable => not_applicable += 1,
                CriterionStatus::NotTested => {}
            }
        }
        let tested = compliant + not_compliant + not_applicable;

        Self {
            compliant: share(compliant, tested),
            not_compliant: share(not_compliant, tested),
            not_applicable: share(not_applicable, tested),
        }
    }

    pub fn tested(&self) -> usize {
        self.compliant.raw + self.not_compliant.raw + self.not_applicable.raw
    }
}

fn share(raw: usize, total: usize) -> RawAndPercentage {
    let percentage = if total == 0 {
        0.0
    } else {
        round2(raw as f64 / total as f64 * 100.0)
    };
    RawAndPercentage { raw, percentage }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Distribution restricted to one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResultDistribution {
    /// Page name, e.g. "Accueil"
    pub name: String,
    #[serde(flatten)]
    pub distribution: ResultDistribution,
}

/// Distribution restricted to one topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicResultDistribution {
    /// Topic name, e.g. "Éléments obligatoires"
    pub name: String,
    #[serde(flatten)]
    pub distribution: ResultDistribution,
}
