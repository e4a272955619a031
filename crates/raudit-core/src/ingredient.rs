//! Ingredient audit values shared by the normalizer and the renderers.
//!
//! Field names serialise in camelCase so the JSON output matches the shape the
//! backend is asked to produce (`regulatoryId`, `groundingSources`, ...).

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ingredient name is empty")]
    EmptyQuery,
}

/// A trimmed, non-empty ingredient name.
///
/// The only way to obtain one is [`IngredientQuery::parse`], so anything that
/// accepts an `IngredientQuery` can assume there is something to search for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientQuery(String);

impl IngredientQuery {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyQuery);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IngredientQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compliance verdict for one regional filing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ComplianceStatus {
    Passed,
    Restricted,
    Prohibited,
    #[default]
    Unknown,
}

impl ComplianceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "Passed",
            Self::Restricted => "Restricted",
            Self::Prohibited => "Prohibited",
            Self::Unknown => "Unknown",
        }
    }

    /// Map a free-text status label onto a verdict.
    ///
    /// Matching is case-insensitive and accepts the synonyms the backend tends
    /// to emit in English and Chinese. Unrecognised labels map to `Unknown`.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        match label.as_str() {
            "passed" | "pass" | "approved" | "permitted" | "allowed" | "authorised"
            | "authorized" | "gras" | "compliant" | "通过" | "已批准" | "批准" | "允许"
            | "合规" => Self::Passed,
            "restricted" | "limited" | "conditional" | "conditionally approved" | "限用"
            | "限制" | "有条件批准" => Self::Restricted,
            "prohibited" | "banned" | "forbidden" | "not permitted" | "not approved"
            | "禁用" | "禁止" | "未批准" => Self::Prohibited,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One independent regulatory filing for an ingredient in one region.
///
/// Every field is always populated; missing upstream values carry a sentinel
/// such as `"N/A"` rather than being absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionDetail {
    pub region: String,
    pub status: ComplianceStatus,
    pub regulatory_id: String,
    pub approval_date: String,
    pub applicant: String,
    pub dosage_form: String,
    pub material_source: String,
    /// Usage limit, e.g. a maximum daily intake.
    #[serde(rename = "limit")]
    pub usage_limit: String,
    pub notes: String,
    pub sources: Vec<String>,
}

/// A citation surfaced by the backend's search grounding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingLink {
    pub title: String,
    pub uri: String,
}

/// The normalized audit of one ingredient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientResult {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cas: Option<String>,
    pub summary: String,
    pub details: Vec<RegionDetail>,
    pub grounding_sources: Vec<GroundingLink>,
}

impl IngredientResult {
    /// A result with no regional records and no citations.
    pub fn empty(name: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cas: None,
            summary: summary.into(),
            details: Vec::new(),
            grounding_sources: Vec::new(),
        }
    }

    pub fn has_details(&self) -> bool {
        !self.details.is_empty()
    }
}
