//! Generative-AI layer: audit prompt construction, response normalization, backend clients.

pub mod approvals;
pub mod backend;
pub mod config;
pub mod normalize;
pub mod query;
pub mod service;

#[cfg(feature = "gemini")]
pub mod gemini;

pub use backend::{BackendError, FailureKind, GenerateRequest, GenerateResponse, GenerativeBackend};
pub use config::{ConfigError, ModelConfig, ServiceConfig};
pub use normalize::{normalize, normalize_outcome};
pub use query::build_audit_request;
pub use service::AuditService;

#[cfg(feature = "gemini")]
pub use gemini::{GeminiClient, GeminiConfig};
