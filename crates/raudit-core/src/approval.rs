//! Recent-approval feed records and regulatory alerts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Jurisdictions tracked by the approvals feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "CN")]
    Cn,
    #[serde(rename = "US")]
    Us,
    #[serde(rename = "EU")]
    Eu,
}

impl Region {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Cn => "CN",
            Self::Us => "US",
            Self::Eu => "EU",
        }
    }

    /// Parse a region code or common country/bloc name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "CN" | "CHN" | "CHINA" | "中国" => Some(Self::Cn),
            "US" | "USA" | "UNITED STATES" | "美国" => Some(Self::Us),
            "EU" | "EUROPE" | "EUROPEAN UNION" | "欧盟" => Some(Self::Eu),
            _ => None,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One entry in the recent-approvals feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovedIngredient {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cas: Option<String>,
    /// ISO 8601 date string.
    pub date: String,
    pub region: Region,
    pub agency: String,
    pub category: String,
    pub regulatory_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// A regulatory alert shown alongside the approvals feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub date: String,
    /// Free-text region label, not restricted to [`Region`].
    pub region: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub severity: Severity,
}
