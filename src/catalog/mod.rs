// SPDX-License-Identifier: PMPL-1.0-or-later
//! Referential catalogs: the ordered topic/criterion trees of RGAA, RAWEB
//! and RAAM, plus the curated subsets used by fast and complementary audits.
//!
//! The builtin catalog is parsed once from documents embedded at compile
//! time and shared for the lifetime of the process. A catalog can also be
//! loaded from a directory holding `rgaa.json`, `raweb.json` and `raam.json`.

pub mod curated;

use crate::error::{AuditError, Result};
use crate::model::{CriterionId, Referential};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

const RGAA_DOCUMENT: &str = include_str!("../../data/rgaa.json");
const RAWEB_DOCUMENT: &str = include_str!("../../data/raweb.json");
const RAAM_DOCUMENT: &str = include_str!("../../data/raam.json");

static BUILTIN: LazyLock<Catalog> = LazyLock::new(|| {
    Catalog::from_documents(RGAA_DOCUMENT, RAWEB_DOCUMENT, RAAM_DOCUMENT)
        .expect("embedded referential documents are valid")
});

/// A criterion entry inside a topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogCriterion {
    pub criterium: CriteriumRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriteriumRef {
    pub number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A numbered topic grouping related criteria
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub number: u32,
    /// Display name, e.g. "Éléments obligatoires"
    #[serde(rename = "topic")]
    pub name: String,
    pub criteria: Vec<CatalogCriterion>,
}

/// The full criteria tree of one referential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferentialCatalog {
    pub version: String,
    pub topics: Vec<Topic>,
}

impl ReferentialCatalog {
    /// Parse and check a referential document
    pub fn from_json(referential: Referential, document: &str) -> Result<Self> {
        let catalog: ReferentialCatalog = serde_json::from_str(document)?;
        catalog.check(referential)?;
        Ok(catalog)
    }

    /// Topics strictly ascending, criteria strictly ascending within a topic,
    /// every number positive.
    fn check(&self, referential: Referential) -> Result<()> {
        let invalid = |msg: String| AuditError::InvalidCatalog(format!("{}: {}", referential, msg));

        if self.topics.is_empty() {
            return Err(invalid("no topics".to_string()));
        }

        let mut previous_topic = 0;
        for topic in &self.topics {
            if topic.number <= previous_topic {
                return Err(invalid(format!(
                    "topic {} is out of order or duplicated",
                    topic.number
                )));
            }
            previous_topic = topic.number;

            let mut previous_criterium = 0;
            for entry in &topic.criteria {
                let number = entry.criterium.number;
                if number <= previous_criterium {
                    return Err(invalid(format!(
                        "criterion {}.{} is out of order or duplicated",
                        topic.number, number
                    )));
                }
                previous_criterium = number;
            }
        }
        Ok(())
    }

    /// Every criterion in catalog order
    pub fn criteria(&self) -> impl Iterator<Item = CriterionId> + '_ {
        self.topics.iter().flat_map(|topic| {
            topic
                .criteria
                .iter()
                .map(move |c| CriterionId::new(topic.number, c.criterium.number))
        })
    }

    /// Number of criteria in the referential
    pub fn len(&self) -> usize {
        self.topics.iter().map(|t| t.criteria.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn topic(&self, number: u32) -> Option<&Topic> {
        self.topics.iter().find(|t| t.number == number)
    }

    pub fn topic_name(&self, number: u32) -> Option<&str> {
        self.topic(number).map(|t| t.name.as_str())
    }

    /// Whether the criterion exists in this referential
    pub fn contains(&self, id: CriterionId) -> bool {
        self.topic(id.topic)
            .map(|t| t.criteria.iter().any(|c| c.criterium.number == id.criterium))
            .unwrap_or(false)
    }
}

/// Catalogs of every supported referential
#[derive(Debug, Clone)]
pub struct Catalog {
    rgaa: ReferentialCatalog,
    raweb: ReferentialCatalog,
    raam: ReferentialCatalog,
}

impl Catalog {
    /// The catalog embedded in the binary, initialised on first use
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    pub fn from_documents(rgaa: &str, raweb: &str, raam: &str) -> Result<Self> {
        let catalog = Self {
            rgaa: ReferentialCatalog::from_json(Referential::Rgaa, rgaa)?,
            raweb: ReferentialCatalog::from_json(Referential::Raweb, raweb)?,
            raam: ReferentialCatalog::from_json(Referential::Raam, raam)?,
        };
        catalog.check_curated()?;
        Ok(catalog)
    }

    /// Load `rgaa.json`, `raweb.json` and `raam.json` from a directory
    pub fn load_dir(dir: &Path) -> Result<Self> {
        debug!("Loading referential documents from {}", dir.display());
        let read = |name: &str| std::fs::read_to_string(dir.join(name));
        Self::from_documents(&read("rgaa.json")?, &read("raweb.json")?, &read("raam.json")?)
    }

    /// Topic tree of a referential
    pub fn criteria_file(&self, referential: Referential) -> &ReferentialCatalog {
        match referential {
            Referential::Rgaa => &self.rgaa,
            Referential::Raweb => &self.raweb,
            Referential::Raam => &self.raam,
        }
    }

    /// Curated criteria of a fast audit
    pub fn fast_criteria(&self, referential: Referential) -> &'static [CriterionId] {
        match referential {
            Referential::Rgaa | Referential::Raweb => curated::WEB_FAST,
            Referential::Raam => curated::RAAM_FAST,
        }
    }

    /// Criteria a complementary audit adds to the fast subset
    pub fn complementary_additions(&self, referential: Referential) -> &'static [CriterionId] {
        match referential {
            Referential::Rgaa | Referential::Raweb => curated::WEB_COMPLEMENTARY_ADDITIONS,
            Referential::Raam => curated::RAAM_COMPLEMENTARY_ADDITIONS,
        }
    }

    /// Fast subset followed by the complementary additions
    pub fn complementary_criteria(&self, referential: Referential) -> Vec<CriterionId> {
        let mut criteria = self.fast_criteria(referential).to_vec();
        criteria.extend_from_slice(self.complementary_additions(referential));
        criteria
    }

    /// Curated subsets must only name criteria the referential defines
    fn check_curated(&self) -> Result<()> {
        for referential in Referential::ALL {
            let file = self.criteria_file(referential);
            let known: HashSet<CriterionId> = file.criteria().collect();
            if let Some(unknown) = self
                .complementary_criteria(referential)
                .into_iter()
                .find(|id| !known.contains(id))
            {
                return Err(AuditError::InvalidCatalog(format!(
                    "{}: curated criterion {} is not in the referential",
                    referential, unknown
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_sizes() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.criteria_file(Referential::Rgaa).len(), 106);
        assert_eq!(catalog.criteria_file(Referential::Raweb).len(), 106);
        assert!(!catalog.criteria_file(Referential::Raam).is_empty());
    }

    #[test]
    fn test_topic_names() {
        let rgaa = Catalog::builtin().criteria_file(Referential::Rgaa);
        assert_eq!(rgaa.topic_name(1), Some("Images"));
        assert_eq!(rgaa.topic_name(8), Some("Éléments obligatoires"));
        assert_eq!(rgaa.topic_name(99), None);
    }

    #[test]
    fn test_contains() {
        let rgaa = Catalog::builtin().criteria_file(Referential::Rgaa);
        assert!(rgaa.contains(CriterionId::new(1, 1)));
        assert!(rgaa.contains(CriterionId::new(13, 12)));
        assert!(!rgaa.contains(CriterionId::new(13, 13)));
        assert!(!rgaa.contains(CriterionId::new(14, 1)));
    }

    #[test]
    fn test_embedded_raam_is_marked_as_reconstructed() {
        let raam = Catalog::builtin().criteria_file(Referential::Raam);
        assert!(raam.version.starts_with("1.1-reconstructed"));
        assert_eq!(raam.topics.len(), 15);
        assert_eq!(raam.len(), 97);
    }

    #[test]
    fn test_raam_has_no_curated_subsets() {
        let catalog = Catalog::builtin();
        assert!(catalog.fast_criteria(Referential::Raam).is_empty());
        assert!(catalog.complementary_criteria(Referential::Raam).is_empty());
    }

    #[test]
    fn test_complementary_is_fast_plus_additions() {
        let catalog = Catalog::builtin();
        let complementary = catalog.complementary_criteria(Referential::Rgaa);
        assert_eq!(complementary.len(), 50);
        assert_eq!(&complementary[..25], catalog.fast_criteria(Referential::Rgaa));
    }

    #[test]
    fn test_rejects_unordered_topics() {
        let doc = r#"{"version": "x", "topics": [
            {"number": 2, "topic": "B", "criteria": [{"criterium": {"number": 1}}]},
            {"number": 1, "topic": "A", "criteria": [{"criterium": {"number": 1}}]}
        ]}"#;
        let err = ReferentialCatalog::from_json(Referential::Raam, doc).unwrap_err();
        assert!(matches!(err, AuditError::InvalidCatalog(_)));
    }

    #[test]
    fn test_rejects_duplicate_criterion() {
        let doc = r#"{"version": "x", "topics": [
            {"number": 1, "topic": "A", "criteria": [
                {"criterium": {"number": 1}}, {"criterium": {"number": 1}}
            ]}
        ]}"#;
        assert!(ReferentialCatalog::from_json(Referential::Raam, doc).is_err());
    }

    #[test]
    fn test_rejects_curated_criterion_missing_from_referential() {
        let tiny = r#"{"version": "x", "topics": [
            {"number": 1, "topic": "A", "criteria": [{"criterium": {"number": 1}}]}
        ]}"#;
        let err = Catalog::from_documents(tiny, RAWEB_DOCUMENT, RAAM_DOCUMENT).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_load_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("rgaa.json"), RGAA_DOCUMENT).unwrap();
        std::fs::write(dir.path().join("raweb.json"), RAWEB_DOCUMENT).unwrap();
        std::fs::write(dir.path().join("raam.json"), RAAM_DOCUMENT).unwrap();

        let catalog = Catalog::load_dir(dir.path()).unwrap();
        assert_eq!(catalog.criteria_file(Referential::Rgaa).len(), 106);
    }

    #[test]
    fn test_load_dir_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(matches!(
            Catalog::load_dir(dir.path()),
            Err(AuditError::Io(_))
        ));
    }
}
