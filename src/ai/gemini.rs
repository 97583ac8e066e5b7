//! Gemini `generateContent` transport.

use std::future::Future;
use std::pin::Pin;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::ai::error::{AiError, Result};
use crate::ai::provider::Provider;
use crate::ai::transport::{
    check_error_response, log_response_success, network_error, Candidate, CandidatePart,
    Endpoints, RawOutput, ResponseMode, Transport, TransportRequest,
};

/// Gemini request body.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

/// Request content block.
#[derive(Serialize, Debug)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<TextPart>,
}

/// Request text part.
#[derive(Serialize, Debug)]
struct TextPart {
    text: String,
}

/// Generation parameters.
#[derive(Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
}

/// Tool declaration.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: GoogleSearch,
}

/// Empty marker enabling grounded web search.
#[derive(Serialize, Debug)]
struct GoogleSearch {}

/// Gemini response body.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
}

/// Response candidate.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct WireCandidate {
    #[serde(default)]
    content: Option<WireContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

/// Response content.
#[derive(Deserialize, Debug)]
struct WireContent {
    #[serde(default)]
    parts: Vec<WirePart>,
}

/// Response part: text, inline data or a thought summary.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default, alias = "inline_data")]
    inline_data: Option<WireInlineData>,
    #[serde(default)]
    thought: bool,
}

/// Inline binary payload.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct WireInlineData {
    #[serde(default, alias = "mime_type")]
    mime_type: Option<String>,
    #[serde(default)]
    data: String,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, skipping thought parts.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter(|p| !p.thought)
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    fn into_candidates(self) -> Vec<Candidate> {
        self.candidates
            .into_iter()
            .map(|candidate| Candidate {
                parts: candidate
                    .content
                    .map(|content| content.parts.into_iter().map(convert_part).collect())
                    .unwrap_or_default(),
            })
            .collect()
    }
}

fn convert_part(part: WirePart) -> CandidatePart {
    match (part.inline_data, part.text) {
        (Some(inline), _) => CandidatePart::InlineData {
            mime_type: inline.mime_type,
            data: inline.data,
        },
        (None, text) => CandidatePart::Text(text.unwrap_or_default()),
    }
}

/// Transport for the Gemini REST API.
pub struct GeminiTransport {
    /// Shared HTTP client.
    client: Client,
    /// API key sent as `x-goog-api-key`.
    api_key: String,
    /// Base URL without trailing slash.
    base_url: String,
    /// Model for text operations.
    text_model: String,
    /// Model for image operations.
    image_model: String,
}

impl GeminiTransport {
    /// Creates a transport using the Gemini settings of `endpoints`.
    pub fn new(client: Client, api_key: String, endpoints: &Endpoints) -> Self {
        Self {
            client,
            api_key,
            base_url: endpoints.gemini_base_url.trim_end_matches('/').to_string(),
            text_model: endpoints.gemini_text_model.clone(),
            image_model: endpoints.gemini_image_model.clone(),
        }
    }

    /// Model used for a request in `mode`.
    fn model_for(&self, mode: &ResponseMode) -> &str {
        match mode {
            ResponseMode::Image => &self.image_model,
            _ => &self.text_model,
        }
    }

    /// Full `generateContent` URL for `model`.
    fn endpoint_for_model(&self, model: &str) -> String {
        let model = model.trim();
        let model_path = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        };
        format!("{}/{}:generateContent", self.base_url, model_path)
    }

    fn build_request(request: &TransportRequest) -> GenerateContentRequest {
        let mut config = GenerationConfig {
            temperature: request.temperature,
            ..GenerationConfig::default()
        };
        match &request.mode {
            ResponseMode::Text => {}
            ResponseMode::NativeSchema(schema) => {
                config.response_mime_type = Some("application/json".to_string());
                config.response_schema = Some(schema.clone());
            }
            ResponseMode::JsonObject => {
                config.response_mime_type = Some("application/json".to_string());
            }
            ResponseMode::Image => {
                config.response_modalities = Some(vec!["IMAGE".to_string()]);
            }
        }

        let tools = if request.web_search {
            vec![Tool {
                google_search: GoogleSearch {},
            }]
        } else {
            Vec::new()
        };

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![TextPart {
                    text: request.prompt.clone(),
                }],
            }],
            system_instruction: request.system_instruction.as_ref().map(|text| Content {
                role: None,
                parts: vec![TextPart { text: text.clone() }],
            }),
            generation_config: config,
            tools,
        }
    }
}

impl Transport for GeminiTransport {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    fn send<'a>(
        &'a self,
        request: &'a TransportRequest,
    ) -> Pin<Box<dyn Future<Output = Result<RawOutput>> + Send + 'a>> {
        Box::pin(async move {
            let model = self.model_for(&request.mode);
            let url = self.endpoint_for_model(model);
            let body = Self::build_request(request);

            debug!(
                prompt_len = request.prompt.len(),
                mode = request.mode.name(),
                temperature = ?request.temperature,
                web_search = request.web_search,
                "Built Gemini request payload"
            );
            info!(url = %url, model = %model, "Sending request to Gemini API");

            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await
                .map_err(|e| network_error(Provider::Gemini, &e))?;

            let response = check_error_response(Provider::Gemini, response).await?;

            let parsed: GenerateContentResponse =
                response.json().await.map_err(|e| AiError::InvalidResponse {
                    provider: Provider::Gemini,
                    message: e.to_string(),
                })?;

            debug!(
                candidate_count = parsed.candidates.len(),
                finish_reason = ?parsed.candidates.first().and_then(|c| c.finish_reason.as_deref()),
                "Received Gemini API response"
            );

            let output = match request.mode {
                ResponseMode::Image => RawOutput::Candidates(parsed.into_candidates()),
                _ => RawOutput::Text(parsed.text()),
            };
            log_response_success(Provider::Gemini, &output);
            Ok(output)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transport_for(server: &MockServer) -> GeminiTransport {
        let endpoints = Endpoints {
            gemini_base_url: format!("{}/", server.uri()),
            ..Endpoints::default()
        };
        GeminiTransport::new(Client::new(), "test-key".to_string(), &endpoints)
    }

    fn text_request(mode: ResponseMode) -> TransportRequest {
        TransportRequest {
            system_instruction: Some("You are a worship songwriter.".to_string()),
            prompt: "Write a hymn".to_string(),
            temperature: Some(0.7),
            mode,
            web_search: false,
        }
    }

    async fn sent_body(server: &MockServer) -> Value {
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        serde_json::from_slice(&requests[0].body).unwrap()
    }

    #[test]
    fn endpoint_accepts_prefixed_model_names() {
        let endpoints = Endpoints::default();
        let transport = GeminiTransport::new(Client::new(), "k".to_string(), &endpoints);
        assert_eq!(
            transport.endpoint_for_model("models/gemini-2.5-flash"),
            transport.endpoint_for_model("gemini-2.5-flash")
        );
        assert_eq!(
            transport.endpoint_for_model("gemini-2.5-flash"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn native_schema_request_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "{\"a\":"}, {"text": "1}"}]},
                    "finishReason": "STOP"
                }]
            })))
            .mount(&server)
            .await;

        let transport = transport_for(&server);
        let schema = json!({"type": "OBJECT"});
        let output = transport
            .send(&text_request(ResponseMode::NativeSchema(schema.clone())))
            .await
            .unwrap();
        assert_eq!(output, RawOutput::Text("{\"a\":1}".to_string()));

        let body = sent_body(&server).await;
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Write a hymn");
        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            "You are a worship songwriter."
        );
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"], schema);
        assert!(body.get("tools").is_none());
    }

    #[tokio::test]
    async fn web_search_attaches_google_search_tool() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "Use [Outro] tags."}]}}]
            })))
            .mount(&server)
            .await;

        let mut request = text_request(ResponseMode::Text);
        request.web_search = true;
        request.temperature = None;
        request.system_instruction = None;
        let output = transport_for(&server).send(&request).await.unwrap();
        assert_eq!(output, RawOutput::Text("Use [Outro] tags.".to_string()));

        let body = sent_body(&server).await;
        assert_eq!(body["tools"], json!([{"googleSearch": {}}]));
        assert!(body.get("systemInstruction").is_none());
        assert!(body["generationConfig"].get("temperature").is_none());
        assert!(body["generationConfig"].get("responseMimeType").is_none());
    }

    #[tokio::test]
    async fn image_mode_uses_image_model_and_returns_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash-image:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [
                    {"inlineData": {"mimeType": "image/png", "data": "iVBORw0KGgo="}},
                    {"text": "caption"}
                ]}}]
            })))
            .mount(&server)
            .await;

        let mut request = text_request(ResponseMode::Image);
        request.system_instruction = None;
        request.temperature = None;
        let output = transport_for(&server).send(&request).await.unwrap();
        assert_eq!(
            output,
            RawOutput::Candidates(vec![Candidate {
                parts: vec![
                    CandidatePart::InlineData {
                        mime_type: Some("image/png".to_string()),
                        data: "iVBORw0KGgo=".to_string(),
                    },
                    CandidatePart::Text("caption".to_string()),
                ],
            }])
        );

        let body = sent_body(&server).await;
        assert_eq!(body["generationConfig"]["responseModalities"], json!(["IMAGE"]));
    }

    #[tokio::test]
    async fn thought_parts_are_not_part_of_the_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [
                    {"text": "thinking...", "thought": true},
                    {"text": "answer"}
                ]}}]
            })))
            .mount(&server)
            .await;

        let output = transport_for(&server)
            .send(&text_request(ResponseMode::Text))
            .await
            .unwrap();
        assert_eq!(output, RawOutput::Text("answer".to_string()));
    }

    #[tokio::test]
    async fn http_errors_carry_status_and_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {"code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED"}
            })))
            .mount(&server)
            .await;

        let err = transport_for(&server)
            .send(&text_request(ResponseMode::Text))
            .await
            .unwrap_err();
        match err {
            AiError::ApiRequestFailed {
                provider,
                status,
                message,
            } => {
                assert_eq!(provider, Provider::Gemini);
                assert_eq!(status, 403);
                assert_eq!(message, "API key not valid");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn undecodable_envelope_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
            .mount(&server)
            .await;

        let err = transport_for(&server)
            .send(&text_request(ResponseMode::Text))
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn missing_candidates_yield_empty_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let output = transport_for(&server)
            .send(&text_request(ResponseMode::Text))
            .await
            .unwrap();
        assert_eq!(output, RawOutput::Text(String::new()));
    }
}
