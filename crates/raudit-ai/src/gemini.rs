//! Gemini REST client for `models/{model}:generateContent`.

use std::time::Duration;

use async_trait::async_trait;
use raudit_core::GroundingLink;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::backend::{BackendError, GenerateRequest, GenerateResponse, GenerativeBackend};
use crate::config::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Checked when [`API_KEY_ENV`] is unset.
pub const API_KEY_FALLBACK_ENV: &str = "API_KEY";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Configuration with the given key and default endpoint. A blank key is an error.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ConfigError> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(ConfigError::MissingCredential(API_KEY_ENV));
        }
        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Read the API key from `GEMINI_API_KEY`, falling back to `API_KEY`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let key = [API_KEY_ENV, API_KEY_FALLBACK_ENV]
            .into_iter()
            .filter_map(|name| lookup(name))
            .find(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingCredential(API_KEY_ENV))?;
        Self::new(key)
    }

    /// `base_url` should be like `https://host/v1beta` (no trailing slash needed).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Client handle for the Gemini API. Cheap to share by reference across tasks.
pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.config.base_url, model)
    }
}

#[async_trait]
impl GenerativeBackend for GeminiClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, BackendError> {
        let url = self.endpoint(&request.model);
        let body = WireRequest::from_request(request);

        info!(url = %url, grounding = request.grounding, "calling Gemini");
        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(BackendError::from_status(status.as_u16(), text));
        }

        let response = decode_response(&text)?;
        debug!(
            structured = response.payload.is_some(),
            citations = response.citations.len(),
            "Gemini response decoded"
        );
        Ok(response)
    }
}

// ── Wire format ──

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest<'a> {
    contents: Vec<WireContent<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
    generation_config: WireGenerationConfig<'a>,
}

#[derive(Serialize)]
struct WireContent<'a> {
    role: &'static str,
    parts: Vec<WirePart<'a>>,
}

#[derive(Serialize)]
struct WirePart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireTool {
    google_search: Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
}

impl<'a> WireRequest<'a> {
    fn from_request(request: &'a GenerateRequest) -> Self {
        let tools = if request.grounding {
            vec![WireTool {
                google_search: Value::Object(Default::default()),
            }]
        } else {
            Vec::new()
        };
        Self {
            contents: vec![WireContent {
                role: "user",
                parts: vec![WirePart {
                    text: &request.prompt,
                }],
            }],
            tools,
            generation_config: WireGenerationConfig {
                response_mime_type: "application/json",
                response_schema: &request.schema,
            },
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct WireResponse {
    candidates: Vec<WireCandidate>,
    prompt_feedback: Option<WirePromptFeedback>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct WireCandidate {
    content: Option<WireCandidateContent>,
    grounding_metadata: Option<WireGroundingMetadata>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct WireCandidateContent {
    parts: Vec<WireResponsePart>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct WireResponsePart {
    text: Option<String>,
    thought: bool,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct WireGroundingMetadata {
    grounding_chunks: Vec<WireGroundingChunk>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct WireGroundingChunk {
    web: Option<WireWebSource>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct WireWebSource {
    uri: Option<String>,
    title: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct WirePromptFeedback {
    block_reason: Option<String>,
}

/// Decode a `generateContent` response body.
///
/// The answer text is parsed as JSON when it is clean; otherwise it is passed
/// on as text for the normalizer's lenient parsing.
fn decode_response(body: &str) -> Result<GenerateResponse, BackendError> {
    let wire: WireResponse = serde_json::from_str(body)?;
    let Some(candidate) = wire.candidates.into_iter().next() else {
        return Err(BackendError::EmptyResponse {
            reason: wire.prompt_feedback.and_then(|f| f.block_reason),
        });
    };

    let text: String = candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter(|p| !p.thought)
        .filter_map(|p| p.text)
        .collect();

    let citations = candidate
        .grounding_metadata
        .map(|m| m.grounding_chunks)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|chunk| {
            let web = chunk.web?;
            let uri = web.uri?;
            Some(GroundingLink {
                title: web.title.unwrap_or_else(|| uri.clone()),
                uri,
            })
        })
        .collect();

    let payload = serde_json::from_str::<Value>(text.trim()).ok();
    Ok(GenerateResponse {
        payload,
        text: (!text.trim().is_empty()).then_some(text),
        citations,
    })
}
