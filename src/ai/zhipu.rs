//! Zhipu GLM chat-completions transport.

use std::future::Future;
use std::pin::Pin;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::ai::error::{AiError, Result};
use crate::ai::provider::Provider;
use crate::ai::transport::{
    check_error_response, log_response_success, network_error, Endpoints, RawOutput,
    ResponseMode, Transport, TransportRequest,
};

/// Temperature used when the operation does not name one.
const DEFAULT_TEMPERATURE: f32 = 0.7;
/// Nucleus sampling cut-off sent with every request.
const TOP_P: f32 = 0.9;
/// Response token ceiling.
const MAX_TOKENS: u32 = 4096;

/// Chat message.
#[derive(Serialize, Debug)]
struct Message {
    role: String,
    content: String,
}

/// `response_format` selector.
#[derive(Serialize, Debug)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

/// Chat-completions request body.
#[derive(Serialize, Debug)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

/// Response choice.
#[derive(Deserialize, Debug)]
struct Choice {
    message: ResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

/// Response message.
#[derive(Deserialize, Debug)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Token usage statistics.
#[derive(Deserialize, Debug)]
struct Usage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
    total_tokens: Option<u32>,
}

/// Chat-completions response body.
#[derive(Deserialize, Debug)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    usage: Option<Usage>,
}

/// Transport for the Zhipu chat-completions API.
pub struct ZhipuTransport {
    /// Shared HTTP client.
    client: Client,
    /// Bearer token.
    api_key: String,
    /// Full chat-completions URL.
    url: String,
    /// Model identifier.
    model: String,
}

impl ZhipuTransport {
    /// Creates a transport using the Zhipu settings of `endpoints`.
    pub fn new(client: Client, api_key: String, endpoints: &Endpoints) -> Self {
        Self {
            client,
            api_key,
            url: endpoints.zhipu_url.clone(),
            model: endpoints.zhipu_model.clone(),
        }
    }

    fn build_request(&self, request: &TransportRequest) -> Result<ChatRequest> {
        let format_type = match &request.mode {
            ResponseMode::Text => "text",
            ResponseMode::JsonObject => "json_object",
            ResponseMode::NativeSchema(_) => {
                warn!("Zhipu has no native schema support, falling back to JSON-object mode");
                "json_object"
            }
            ResponseMode::Image => {
                return Err(AiError::UnsupportedMode {
                    provider: Provider::Zhipu,
                    mode: request.mode.name(),
                })
            }
        };

        let mut messages = Vec::new();
        if let Some(system) = request.system_instruction.as_deref() {
            if !system.is_empty() {
                messages.push(Message {
                    role: "system".to_string(),
                    content: system.to_string(),
                });
            }
        }
        messages.push(Message {
            role: "user".to_string(),
            content: request.prompt.clone(),
        });

        Ok(ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: request.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            top_p: TOP_P,
            max_tokens: MAX_TOKENS,
            response_format: ResponseFormat {
                format_type: format_type.to_string(),
            },
        })
    }
}

impl Transport for ZhipuTransport {
    fn provider(&self) -> Provider {
        Provider::Zhipu
    }

    fn send<'a>(
        &'a self,
        request: &'a TransportRequest,
    ) -> Pin<Box<dyn Future<Output = Result<RawOutput>> + Send + 'a>> {
        Box::pin(async move {
            if request.web_search {
                debug!("Zhipu transport has no search tool; web_search flag ignored");
            }
            let body = self.build_request(request)?;

            debug!(
                message_count = body.messages.len(),
                temperature = body.temperature,
                response_format = %body.response_format.format_type,
                "Built Zhipu request payload"
            );
            info!(url = %self.url, model = %self.model, "Sending request to Zhipu API");

            let response = self
                .client
                .post(&self.url)
                .header("Content-Type", "application/json")
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(&body)
                .send()
                .await
                .map_err(|e| network_error(Provider::Zhipu, &e))?;

            let response = check_error_response(Provider::Zhipu, response).await?;

            let parsed: ChatResponse = response.json().await.map_err(|e| AiError::InvalidResponse {
                provider: Provider::Zhipu,
                message: e.to_string(),
            })?;

            let usage = parsed.usage.as_ref();
            debug!(
                choice_count = parsed.choices.len(),
                model = ?parsed.model,
                prompt_tokens = ?usage.and_then(|u| u.prompt_tokens),
                completion_tokens = ?usage.and_then(|u| u.completion_tokens),
                total_tokens = ?usage.and_then(|u| u.total_tokens),
                finish_reason = ?parsed.choices.first().and_then(|c| c.finish_reason.as_deref()),
                "Received Zhipu API response"
            );

            let text = parsed
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .unwrap_or_default();
            let output = RawOutput::Text(text);
            log_response_success(Provider::Zhipu, &output);
            Ok(output)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn usage_counters_are_read_individually() {
        let parsed: ChatResponse = serde_json::from_value(json!({
            "choices": [],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5}
        }))
        .unwrap();
        let usage = parsed.usage.unwrap();
        assert_eq!(usage.prompt_tokens, Some(10));
        assert_eq!(usage.completion_tokens, Some(5));
        assert_eq!(usage.total_tokens, None);
    }

    fn transport_for(server: &MockServer) -> ZhipuTransport {
        let endpoints = Endpoints {
            zhipu_url: format!("{}/api/paas/v4/chat/completions", server.uri()),
            ..Endpoints::default()
        };
        ZhipuTransport::new(Client::new(), "zhipu-key".to_string(), &endpoints)
    }

    fn request(mode: ResponseMode) -> TransportRequest {
        TransportRequest {
            system_instruction: Some("You are a lyrics editor.".to_string()),
            prompt: "Rewrite this".to_string(),
            temperature: Some(0.4),
            mode,
            web_search: false,
        }
    }

    fn completion(content: &str) -> Value {
        json!({
            "id": "chatcmpl-1",
            "model": "glm-4.6",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        })
    }

    async fn sent_body(server: &MockServer) -> Value {
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        serde_json::from_slice(&requests[0].body).unwrap()
    }

    #[tokio::test]
    async fn json_object_request_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/paas/v4/chat/completions"))
            .and(header("Authorization", "Bearer zhipu-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("{\"ok\":true}")))
            .mount(&server)
            .await;

        let output = transport_for(&server)
            .send(&request(ResponseMode::JsonObject))
            .await
            .unwrap();
        assert_eq!(output, RawOutput::Text("{\"ok\":true}".to_string()));

        let body = sent_body(&server).await;
        assert_eq!(body["model"], "glm-4.6");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "You are a lyrics editor.");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Rewrite this");
        assert_eq!(body["response_format"], json!({"type": "json_object"}));
        assert_eq!(body["max_tokens"], 4096);
        assert!(body["top_p"].is_number());
        assert!(body["temperature"].is_number());
    }

    #[tokio::test]
    async fn text_mode_without_system_instruction() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("plain")))
            .mount(&server)
            .await;

        let mut req = request(ResponseMode::Text);
        req.system_instruction = None;
        req.temperature = None;
        let output = transport_for(&server).send(&req).await.unwrap();
        assert_eq!(output, RawOutput::Text("plain".to_string()));

        let body = sent_body(&server).await;
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["response_format"], json!({"type": "text"}));
        let temperature = body["temperature"].as_f64().unwrap();
        assert!((temperature - 0.7).abs() < 1e-6);
    }

    #[tokio::test]
    async fn image_mode_is_rejected_before_sending() {
        let server = MockServer::start().await;
        let err = transport_for(&server)
            .send(&request(ResponseMode::Image))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AiError::UnsupportedMode {
                provider: Provider::Zhipu,
                ..
            }
        ));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn http_errors_carry_status_and_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"code": "1000", "message": "身份验证失败"}
            })))
            .mount(&server)
            .await;

        let err = transport_for(&server)
            .send(&request(ResponseMode::Text))
            .await
            .unwrap_err();
        match err {
            AiError::ApiRequestFailed {
                provider,
                status,
                message,
            } => {
                assert_eq!(provider, Provider::Zhipu);
                assert_eq!(status, 401);
                assert_eq!(message, "身份验证失败");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn no_choices_yield_empty_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let output = transport_for(&server)
            .send(&request(ResponseMode::Text))
            .await
            .unwrap();
        assert_eq!(output, RawOutput::Text(String::new()));
    }

    #[tokio::test]
    async fn unreachable_server_is_network_error() {
        let endpoints = Endpoints {
            zhipu_url: "http://127.0.0.1:9/chat/completions".to_string(),
            ..Endpoints::default()
        };
        let transport = ZhipuTransport::new(Client::new(), "k".to_string(), &endpoints);
        let err = transport
            .send(&request(ResponseMode::Text))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AiError::Network {
                provider: Provider::Zhipu,
                ..
            }
        ));
    }
}
