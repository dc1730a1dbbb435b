//! Google Gemini API client implementation
//!
//! Implements [`LlmClient`] over the `generateContent` endpoint. Gemini has no
//! tool-call ids, so calls are numbered per response.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{Value, json};

use crate::config::{Config, GOOGLE_API_KEY, LlmConfig};
use crate::llm::client::{LlmClient, LlmError};
use crate::llm::types::{CompletionRequest, CompletionResponse, Message, Part, Role, StopReason, ToolCall, Usage};

/// Default wait when a 429 carries no retry-after header
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Gemini API client
pub struct GeminiClient {
    client: Client,
    api_key: String,
    config: LlmConfig,
}

impl GeminiClient {
    /// Create a client with an explicit API key
    pub fn new(config: &LlmConfig, api_key: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey {
                env_var: GOOGLE_API_KEY.to_string(),
            });
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            api_key,
            config: config.clone(),
        })
    }

    /// Create a client from the loaded configuration and its resolved secrets
    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        let api_key = config
            .secrets
            .google_api_key
            .as_deref()
            .ok_or_else(|| LlmError::MissingApiKey {
                env_var: GOOGLE_API_KEY.to_string(),
            })?;
        Self::new(&config.llm, api_key)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Build the request body for the Gemini API
    fn build_request(&self, request: &CompletionRequest) -> Value {
        let contents: Vec<Value> = request.messages.iter().map(message_to_content).collect();

        let mut body = json!({
            "contents": contents,
            "generationConfig": {
                "temperature": request.temperature.unwrap_or(self.config.temperature),
                "maxOutputTokens": request.max_tokens.unwrap_or(self.config.max_output_tokens),
            }
        });

        if !request.system.is_empty() {
            body["systemInstruction"] = json!({ "parts": [{ "text": request.system }] });
        }

        if !request.tools.is_empty() {
            let declarations: Vec<Value> = request.tools.iter().map(|t| t.to_gemini_declaration()).collect();
            body["tools"] = json!([{ "functionDeclarations": declarations }]);
        }

        body
    }

    /// Parse the API response into a CompletionResponse
    fn parse_response(&self, body: Value) -> Result<CompletionResponse, LlmError> {
        let candidate = body["candidates"]
            .get(0)
            .ok_or_else(|| LlmError::InvalidResponse(format!("no candidates in response: {}", body)))?;

        let mut content = String::new();
        let mut tool_calls = Vec::new();

        if let Some(parts) = candidate["content"]["parts"].as_array() {
            for part in parts {
                if let Some(text) = part["text"].as_str() {
                    if !content.is_empty() {
                        content.push('\n');
                    }
                    content.push_str(text);
                } else if let Some(call) = part.get("functionCall") {
                    let name = call["name"]
                        .as_str()
                        .ok_or_else(|| LlmError::InvalidResponse("functionCall without a name".to_string()))?;
                    let args = match &call["args"] {
                        Value::Null => json!({}),
                        args => args.clone(),
                    };
                    let id = format!("call_{}", tool_calls.len() + 1);
                    tool_calls.push(ToolCall::new(id, name, args));
                }
            }
        }

        let stop_reason = if !tool_calls.is_empty() {
            StopReason::ToolUse
        } else {
            match candidate["finishReason"].as_str() {
                Some("MAX_TOKENS") => StopReason::MaxTokens,
                Some("SAFETY") | Some("RECITATION") | Some("BLOCKLIST") | Some("PROHIBITED_CONTENT") => {
                    StopReason::Blocked
                }
                _ => StopReason::EndTurn,
            }
        };

        let usage = body
            .get("usageMetadata")
            .map(|u| {
                Usage::new(
                    u["promptTokenCount"].as_u64().unwrap_or(0),
                    u["candidatesTokenCount"].as_u64().unwrap_or(0),
                )
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            content,
            tool_calls,
            stop_reason,
            usage,
        })
    }

    /// Send a request to the Gemini API
    async fn send_request(&self, body: Value) -> Result<Value, LlmError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Err(LlmError::RateLimited {
                retry_after: Duration::from_secs(retry_after),
            });
        }

        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            // Gemini reports a malformed key as 400 INVALID_ARGUMENT
            if status == 401 || status == 403 || (status == 400 && message.contains("API key")) {
                return Err(LlmError::Auth { status, message });
            }
            return Err(LlmError::ApiError { status, message });
        }

        Ok(response.json().await?)
    }
}

fn message_to_content(message: &Message) -> Value {
    let role = match message.role {
        Role::User => "user",
        Role::Assistant => "model",
    };

    let parts: Vec<Value> = message
        .parts
        .iter()
        .map(|part| match part {
            Part::Text { text } => json!({ "text": text }),
            Part::ToolCall { call } => json!({
                "functionCall": { "name": call.name, "args": call.input }
            }),
            Part::ToolResponse { name, content } => json!({
                "functionResponse": { "name": name, "response": { "content": content } }
            }),
        })
        .collect();

    json!({ "role": role, "parts": parts })
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = self.build_request(&request);
        debug!(
            "Gemini request: model={} messages={} tools={}",
            self.config.model,
            request.messages.len(),
            request.tools.len()
        );
        let response = self.send_request(body).await?;
        self.parse_response(response)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.config.model)
            .field("base_url", &self.config.base_url)
            .finish()
    }
}
