//! Provider transport trait and shared HTTP plumbing.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::ai::error::{AiError, Result};
use crate::ai::gemini::GeminiTransport;
use crate::ai::provider::Provider;
use crate::ai::zhipu::ZhipuTransport;

/// HTTP request timeout for provider calls.
///
/// Image generation routinely takes tens of seconds; five minutes keeps a
/// stuck connection from hanging the caller forever.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Maximum length of a raw error body carried in an error message.
const ERROR_BODY_LIMIT: usize = 500;

/// Default Gemini REST base URL.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Default Gemini text model.
pub const DEFAULT_GEMINI_TEXT_MODEL: &str = "gemini-2.5-flash";
/// Default Gemini image model.
pub const DEFAULT_GEMINI_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
/// Default Zhipu chat-completions endpoint.
pub const DEFAULT_ZHIPU_URL: &str = "https://open.bigmodel.cn/api/paas/v4/chat/completions";
/// Default Zhipu model.
pub const DEFAULT_ZHIPU_MODEL: &str = "glm-4.6";

/// How the provider should shape its reply.
#[derive(Clone, Debug, PartialEq)]
pub enum ResponseMode {
    /// Freeform text.
    Text,
    /// JSON enforced server-side against the given schema.
    NativeSchema(Value),
    /// Any valid JSON object; the shape lives in the prompt.
    JsonObject,
    /// Image output.
    Image,
}

impl ResponseMode {
    /// Short name for logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::NativeSchema(_) => "native-schema",
            Self::JsonObject => "json-object",
            Self::Image => "image",
        }
    }
}

/// A fully assembled provider call.
#[derive(Clone, Debug, PartialEq)]
pub struct TransportRequest {
    /// System instruction, if any.
    pub system_instruction: Option<String>,
    /// User prompt body.
    pub prompt: String,
    /// Sampling temperature; `None` leaves the provider default.
    pub temperature: Option<f32>,
    /// Response shape.
    pub mode: ResponseMode,
    /// Attach the provider's live web-search tool.
    pub web_search: bool,
}

/// One part of a returned candidate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CandidatePart {
    /// Text part.
    Text(String),
    /// Inline binary payload, base64-encoded.
    InlineData {
        /// MIME type, if reported.
        mime_type: Option<String>,
        /// Base64 data.
        data: String,
    },
}

/// One returned candidate with its content parts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Candidate {
    /// Content parts in provider order.
    pub parts: Vec<CandidatePart>,
}

/// Raw output of a transport call, before normalization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawOutput {
    /// Text reply.
    Text(String),
    /// Multimodal candidates from an image request.
    Candidates(Vec<Candidate>),
}

/// A single provider binding.
pub trait Transport: Send + Sync {
    /// Provider this transport talks to.
    fn provider(&self) -> Provider;

    /// Issues one call. No retries.
    fn send<'a>(
        &'a self,
        request: &'a TransportRequest,
    ) -> Pin<Box<dyn Future<Output = Result<RawOutput>> + Send + 'a>>;
}

/// Builds transports from a provider and its key.
pub trait Connector: Send + Sync {
    /// Returns a transport authenticated with `api_key`.
    fn connect(&self, provider: Provider, api_key: &str) -> Result<Box<dyn Transport>>;
}

/// Endpoint and model names for both providers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    /// Gemini REST base URL, without trailing slash.
    pub gemini_base_url: String,
    /// Gemini model for text operations.
    pub gemini_text_model: String,
    /// Gemini model for image operations.
    pub gemini_image_model: String,
    /// Zhipu chat-completions URL.
    pub zhipu_url: String,
    /// Zhipu model.
    pub zhipu_model: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            gemini_text_model: DEFAULT_GEMINI_TEXT_MODEL.to_string(),
            gemini_image_model: DEFAULT_GEMINI_IMAGE_MODEL.to_string(),
            zhipu_url: DEFAULT_ZHIPU_URL.to_string(),
            zhipu_model: DEFAULT_ZHIPU_MODEL.to_string(),
        }
    }
}

/// Connector that builds real HTTP transports.
#[derive(Clone, Debug)]
pub struct HttpConnector {
    client: Client,
    endpoints: Endpoints,
}

impl HttpConnector {
    /// Creates a connector for the given endpoints.
    pub fn new(endpoints: Endpoints) -> reqwest::Result<Self> {
        Ok(Self {
            client: build_http_client()?,
            endpoints,
        })
    }
}

impl Connector for HttpConnector {
    fn connect(&self, provider: Provider, api_key: &str) -> Result<Box<dyn Transport>> {
        let transport: Box<dyn Transport> = match provider {
            Provider::Gemini => Box::new(GeminiTransport::new(
                self.client.clone(),
                api_key.to_string(),
                &self.endpoints,
            )),
            Provider::Zhipu => Box::new(ZhipuTransport::new(
                self.client.clone(),
                api_key.to_string(),
                &self.endpoints,
            )),
        };
        Ok(transport)
    }
}

// ── Shared helpers for transport implementations ────────────────────

/// Builds an HTTP client with the standard request timeout.
pub(crate) fn build_http_client() -> reqwest::Result<Client> {
    Client::builder().timeout(REQUEST_TIMEOUT).build()
}

/// Maps a send failure onto [`AiError::Network`].
pub(crate) fn network_error(provider: Provider, err: &reqwest::Error) -> AiError {
    AiError::Network {
        provider,
        message: err.to_string(),
    }
}

/// Checks an HTTP response for error status.
///
/// On success, returns the response unchanged. On failure, reads the body and
/// returns [`AiError::ApiRequestFailed`] carrying the provider's message.
pub(crate) async fn check_error_response(
    provider: Provider,
    response: reqwest::Response,
) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_else(|e| {
        tracing::debug!("Failed to read error response body: {e}");
        String::new()
    });
    Err(AiError::ApiRequestFailed {
        provider,
        status: status.as_u16(),
        message: provider_error_message(&body, status.canonical_reason()),
    })
}

/// Extracts `error.message` from a JSON error body, falling back to the raw
/// body (truncated) or the status reason.
pub(crate) fn provider_error_message(body: &str, reason: Option<&str>) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(message) = value
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
        {
            return message.to_string();
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return reason.unwrap_or("no response body").to_string();
    }
    trimmed.chars().take(ERROR_BODY_LIMIT).collect()
}

/// Logs successful text extraction from a provider response.
pub(crate) fn log_response_success(provider: Provider, output: &RawOutput) {
    match output {
        RawOutput::Text(text) => {
            tracing::debug!(
                response_len = text.len(),
                "Successfully extracted text content from {} response",
                provider
            );
            tracing::debug!(response_content = %text, "{} response content", provider);
        }
        RawOutput::Candidates(candidates) => {
            tracing::debug!(
                candidate_count = candidates.len(),
                "Received multimodal candidates from {}",
                provider
            );
        }
    }
}
