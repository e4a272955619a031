//! The seam between the audit layer and a generative-AI provider.

use async_trait::async_trait;
use raudit_core::GroundingLink;
use serde_json::Value;
use thiserror::Error;

/// One generation call: a prompt, the output schema, and whether to ground on web search.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub schema: Value,
    pub grounding: bool,
}

/// What came back from the provider, before any validation.
///
/// `payload` is set when the provider already parsed its answer as JSON;
/// otherwise the raw answer is in `text`. `citations` comes from the
/// provider's grounding metadata, separate from the answer body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateResponse {
    pub payload: Option<Value>,
    pub text: Option<String>,
    pub citations: Vec<GroundingLink>,
}

impl GenerateResponse {
    pub fn from_payload(payload: Value) -> Self {
        Self {
            payload: Some(payload),
            ..Default::default()
        }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn with_citations(mut self, citations: Vec<GroundingLink>) -> Self {
        self.citations = citations;
        self
    }
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[cfg(feature = "gemini")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend unreachable: {0}")]
    Unreachable(String),

    #[error("credentials rejected ({status}): {body}")]
    Unauthorized { status: u16, body: String },

    #[error("rate limited ({status}): {body}")]
    RateLimited { status: u16, body: String },

    #[error("request rejected ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("backend returned no candidates{}", block_suffix(.reason))]
    EmptyResponse { reason: Option<String> },
}

fn block_suffix(reason: &Option<String>) -> String {
    match reason {
        Some(r) => format!(" (blocked: {r})"),
        None => String::new(),
    }
}

/// Coarse failure classes, each with its own user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Network,
    Unauthorized,
    RateLimited,
    Rejected,
    Service,
    Malformed,
}

impl FailureKind {
    /// Message shown in place of an audit summary when this failure occurs.
    pub fn summary(&self) -> &'static str {
        match self {
            Self::Network => {
                "The compliance service could not be reached. Check the network connection and try again."
            }
            Self::Unauthorized => {
                "The compliance service rejected the API credentials. Check the configured API key."
            }
            Self::RateLimited => {
                "The compliance service is rate-limiting requests. Wait a moment and try again."
            }
            Self::Rejected => {
                "The compliance service rejected the request. Check the model name and options."
            }
            Self::Service => "The compliance service reported an internal error. Try again later.",
            Self::Malformed => {
                "The compliance service returned a response that could not be read. Try again."
            }
        }
    }
}

impl BackendError {
    /// Classify a non-success HTTP status.
    ///
    /// Gemini answers an invalid key with 400 and an `API_KEY_INVALID` reason
    /// rather than 401.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => Self::Unauthorized { status, body },
            400 if body.contains("API_KEY_INVALID") => Self::Unauthorized { status, body },
            429 => Self::RateLimited { status, body },
            400..=499 => Self::Rejected { status, body },
            _ => Self::Server { status, body },
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            #[cfg(feature = "gemini")]
            Self::Http(_) => FailureKind::Network,
            Self::Unreachable(_) => FailureKind::Network,
            Self::Unauthorized { .. } => FailureKind::Unauthorized,
            Self::RateLimited { .. } => FailureKind::RateLimited,
            Self::Rejected { .. } => FailureKind::Rejected,
            Self::Server { .. } => FailureKind::Service,
            Self::Json(_) | Self::EmptyResponse { .. } => FailureKind::Malformed,
        }
    }
}

/// A generative-AI provider able to answer schema-shaped prompts.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, BackendError>;
}
