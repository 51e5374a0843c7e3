//! OpenAI LLM provider using the Chat Completions API.
//!
//! Images are sent as data URLs in the user message content array; the
//! system instruction goes in a separate system message.

use super::provider::{ChatRequest, ChatResponse, LlmProvider};
use crate::error::GeneratorError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// OpenAI provider using Chat Completions API.
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    client: reqwest::Client,
    endpoint: String,
}

impl OpenAiProvider {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
        }
    }

    /// Create with a custom endpoint (OpenAI-compatible gateways).
    pub fn with_endpoint(api_key: &str, model: &str, endpoint: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
        }
    }
}

// --- Request types ---

#[derive(Serialize)]
struct CompletionsRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
#[serde(untagged)]
enum ChatMessage {
    Plain { role: String, content: String },
    Blocks { role: String, content: Vec<ChatContent> },
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ChatContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

// --- Response types ---

#[derive(Deserialize)]
struct CompletionsResponse {
    choices: Vec<Choice>,
    model: String,
    usage: Option<CompletionsUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct CompletionsUsage {
    total_tokens: u32,
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, GeneratorError> {
        let start = Instant::now();

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(ChatMessage::Plain {
                role: "system".to_string(),
                content: system.clone(),
            });
        }

        let mut content = vec![ChatContent::Text {
            text: request.user_text.clone(),
        }];
        content.extend(request.images.iter().map(|image| ChatContent::ImageUrl {
            image_url: ImageUrl {
                url: image.data_url(),
            },
        }));
        messages.push(ChatMessage::Blocks {
            role: "user".to_string(),
            content,
        });

        let body = CompletionsRequest {
            model: self.model.clone(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages,
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .timeout(self.timeout())
            .send()
            .await
            .map_err(|e| GeneratorError::Llm {
                message: format!("OpenAI request failed: {e}"),
                status_code: None,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(GeneratorError::Llm {
                message: format!("OpenAI HTTP {status}: {text}"),
                status_code: Some(status.as_u16()),
            });
        }

        let completions: CompletionsResponse =
            resp.json().await.map_err(|e| GeneratorError::Llm {
                message: format!("Failed to parse OpenAI response: {e}"),
                status_code: None,
            })?;

        let text = completions
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| GeneratorError::Llm {
                message: "OpenAI returned empty choices array, no content generated".to_string(),
                status_code: None,
            })?;

        Ok(ChatResponse {
            text: text.trim().to_string(),
            model: completions.model,
            tokens_used: completions.usage.map(|u| u.total_tokens),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(60)
    }
}
