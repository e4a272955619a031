//! Model selection for each backend operation.

use thiserror::Error;

pub const DEFAULT_AUDIT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_APPROVALS_MODEL: &str = "gemini-3-flash-preview";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no API key configured: set {0}")]
    MissingCredential(&'static str),
}

/// Which model serves an operation and whether it may search the web.
///
/// `enable_grounding` attaches the backend's search tool to the request, which
/// is what produces citation metadata alongside the answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    pub model: String,
    pub enable_grounding: bool,
}

impl ModelConfig {
    pub fn new(model: impl Into<String>, enable_grounding: bool) -> Self {
        Self {
            model: model.into(),
            enable_grounding,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub audit: ModelConfig,
    pub approvals: ModelConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            audit: ModelConfig::new(DEFAULT_AUDIT_MODEL, true),
            approvals: ModelConfig::new(DEFAULT_APPROVALS_MODEL, false),
        }
    }
}
