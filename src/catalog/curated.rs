// SPDX-License-Identifier: PMPL-1.0-or-later
//! Curated criteria subsets for abbreviated audits.
//!
//! Sources:
//! - <https://design.numerique.gouv.fr/outils/audit-rapide/>
//! - <https://design.numerique.gouv.fr/outils/audit-complementaire/>
//!
//! RGAA and RAWEB share the same lists. RAAM has no abbreviated audit modes.

use crate::model::CriterionId;

const fn c(topic: u32, criterium: u32) -> CriterionId {
    CriterionId::new(topic, criterium)
}

/// Criteria of a "fast" audit on a web referential
pub const WEB_FAST: &[CriterionId] = &[
    c(1, 1),
    c(3, 1),
    c(4, 1),
    c(4, 10),
    c(5, 3),
    c(5, 7),
    c(6, 1),
    c(6, 2),
    c(7, 1),
    c(7, 3),
    c(8, 3),
    c(8, 4),
    c(8, 5),
    c(9, 1),
    c(10, 3),
    c(10, 6),
    c(10, 7),
    c(11, 1),
    c(11, 2),
    c(11, 5),
    c(11, 6),
    c(11, 9),
    c(11, 10),
    c(12, 8),
    c(12, 9),
];

/// Criteria a "complementary" audit adds on top of [`WEB_FAST`]
pub const WEB_COMPLEMENTARY_ADDITIONS: &[CriterionId] = &[
    c(1, 3),
    c(1, 5),
    c(1, 6),
    c(1, 7),
    c(4, 2),
    c(4, 4),
    c(4, 8),
    c(4, 9),
    c(5, 4),
    c(5, 6),
    c(7, 2),
    c(8, 2),
    c(8, 6),
    c(8, 10),
    c(10, 2),
    c(10, 8),
    c(10, 9),
    c(10, 10),
    c(13, 1),
    c(13, 3),
    c(13, 4),
    c(13, 5),
    c(13, 6),
    c(13, 7),
    c(13, 8),
];

pub const RAAM_FAST: &[CriterionId] = &[];

pub const RAAM_COMPLEMENTARY_ADDITIONS: &[CriterionId] = &[];
