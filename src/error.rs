// SPDX-License-Identifier: PMPL-1.0-or-later
//! Error types for auditbot

use crate::model::CriterionId;
use crate::validate::ValidationErrors;
use thiserror::Error;

/// Main error type for auditbot
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Unknown referential: {0}")]
    UnknownReferential(String),

    #[error("Unknown audit type: {0}")]
    UnknownAuditType(String),

    #[error("Invalid referential catalog: {0}")]
    InvalidCatalog(String),

    #[error("Missing result for criterion {criterion} on page {page_id}")]
    MissingResult { criterion: CriterionId, page_id: i64 },

    #[error("Malformed criterion key: {0:?}")]
    MalformedCriterion(String),

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl AuditError {
    /// Configuration errors point at a defect in the caller and are never retried
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            AuditError::UnknownReferential(_)
                | AuditError::UnknownAuditType(_)
                | AuditError::InvalidCatalog(_)
                | AuditError::Config(_)
        )
    }

    /// Whether stored results contradict the population invariant
    pub fn is_data_integrity(&self) -> bool {
        matches!(self, AuditError::MissingResult { .. })
    }
}

pub type Result<T> = std::result::Result<T, AuditError>;
