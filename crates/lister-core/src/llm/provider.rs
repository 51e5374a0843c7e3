//! LLM provider trait and request/response types.
//!
//! Defines the chat interface that all LLM providers implement, plus the
//! factory that creates the right provider from config. Requests carry an
//! optional system prompt, user text, and zero or more base64 images so the
//! same interface serves both the multimodal analysis call and the
//! text-only generation calls.

use crate::config::LlmConfig;
use crate::error::{ConfigError, GeneratorError};
use async_trait::async_trait;
use base64::Engine;
use std::time::Duration;

/// Base64-encoded image ready to send to an LLM API.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub media_type: String,
}

impl ImageInput {
    /// Create an `ImageInput` from raw bytes and format string.
    ///
    /// The format is the image format identifier (e.g., "jpeg", "png", "webp").
    pub fn from_bytes(bytes: &[u8], format: &str) -> Self {
        let media_type = match format {
            "jpeg" | "jpg" => "image/jpeg",
            "png" => "image/png",
            "webp" => "image/webp",
            "gif" => "image/gif",
            other => {
                tracing::warn!("Unknown image format '{other}', defaulting to image/jpeg");
                "image/jpeg"
            }
        };

        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: media_type.to_string(),
        }
    }

    /// Guess the format identifier from a file extension.
    pub fn format_from_path(path: &std::path::Path) -> String {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_else(|| "jpeg".to_string())
    }

    /// Return a data URL suitable for OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// A chat request to an LLM provider.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// System instruction, if any
    pub system: Option<String>,
    /// User message text
    pub user_text: String,
    /// Images attached to the user message (may be empty)
    pub images: Vec<ImageInput>,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl ChatRequest {
    /// Build a text-only request with a system instruction.
    pub fn text(system: &str, user_text: String, max_tokens: u32, temperature: f32) -> Self {
        Self {
            system: Some(system.to_string()),
            user_text,
            images: Vec::new(),
            max_tokens,
            temperature,
        }
    }
}

/// The response from an LLM chat call.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// Generated text, trimmed
    pub text: String,
    /// Model identifier used
    pub model: String,
    /// Number of tokens used (input + output), if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that all LLM providers implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Box<dyn LlmProvider>` for dynamic dispatch).
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logging (e.g., "openai", "anthropic").
    fn name(&self) -> &str;

    /// Check whether the provider is configured.
    async fn is_available(&self) -> bool;

    /// Run one chat completion for the given request.
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, GeneratorError>;

    /// Per-request timeout for this provider.
    fn timeout(&self) -> Duration;
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok()
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Factory that creates the appropriate provider from config.
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Create an LLM provider based on provider name, config, and optional
    /// explicit API key.
    ///
    /// The explicit key (e.g., from a CLI flag) takes precedence over the
    /// config value, which in turn may reference an environment variable.
    /// A missing key fails here, before any network activity.
    pub fn create(
        provider: &str,
        config: &LlmConfig,
        api_key_override: Option<&str>,
    ) -> Result<Box<dyn LlmProvider>, ConfigError> {
        match provider {
            "openai" => {
                let cfg = config.openai.clone().unwrap_or_default();
                let api_key = api_key_override
                    .map(String::from)
                    .or_else(|| resolve_env_var(&cfg.api_key))
                    .ok_or_else(|| {
                        ConfigError::MissingApiKey(
                            "OpenAI API key not set. Set OPENAI_API_KEY env var.".to_string(),
                        )
                    })?;
                Ok(Box::new(super::openai::OpenAiProvider::new(
                    &api_key, &cfg.model,
                )))
            }
            "anthropic" => {
                let cfg = config.anthropic.clone().unwrap_or_default();
                let api_key = api_key_override
                    .map(String::from)
                    .or_else(|| resolve_env_var(&cfg.api_key))
                    .ok_or_else(|| {
                        ConfigError::MissingApiKey(
                            "Anthropic API key not set. Set ANTHROPIC_API_KEY env var."
                                .to_string(),
                        )
                    })?;
                Ok(Box::new(super::anthropic::AnthropicProvider::new(
                    &api_key, &cfg.model,
                )))
            }
            other => Err(ConfigError::ValidationError(format!(
                "Unknown LLM provider: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_input_from_bytes_jpeg() {
        let input = ImageInput::from_bytes(&[0xFF, 0xD8, 0xFF], "jpeg");
        assert_eq!(input.media_type, "image/jpeg");
        assert!(!input.data.is_empty());
    }

    #[test]
    fn test_image_input_from_bytes_png() {
        let input = ImageInput::from_bytes(&[0x89, 0x50, 0x4E, 0x47], "png");
        assert_eq!(input.media_type, "image/png");
    }

    #[test]
    fn test_image_input_data_url() {
        let input = ImageInput::from_bytes(&[1, 2, 3], "jpeg");
        let url = input.data_url();
        assert!(url.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_format_from_path() {
        use std::path::Path;
        assert_eq!(ImageInput::format_from_path(Path::new("a/b.PNG")), "png");
        assert_eq!(ImageInput::format_from_path(Path::new("photo.jpg")), "jpg");
        assert_eq!(ImageInput::format_from_path(Path::new("noext")), "jpeg");
    }

    #[test]
    fn test_text_request_has_no_images() {
        let request = ChatRequest::text("system", "user".to_string(), 100, 0.7);
        assert!(request.images.is_empty());
        assert_eq!(request.system.as_deref(), Some("system"));
    }

    #[test]
    fn test_resolve_env_var() {
        // Non-env-var strings pass through
        assert_eq!(resolve_env_var("plain-key"), Some("plain-key".to_string()));
        // Empty returns None
        assert_eq!(resolve_env_var(""), None);
        // Unset env var returns None
        assert_eq!(resolve_env_var("${DEFINITELY_NOT_SET_XYZ_123}"), None);
    }

    #[test]
    fn test_factory_missing_key_fails_before_network() {
        let config = LlmConfig {
            provider: "openai".to_string(),
            openai: Some(crate::config::OpenAiConfig {
                api_key: "${DEFINITELY_NOT_SET_XYZ_123}".to_string(),
                model: "gpt-4o".to_string(),
            }),
            anthropic: None,
        };
        let result = LlmProviderFactory::create("openai", &config, None);
        assert!(matches!(result, Err(ConfigError::MissingApiKey(_))));
    }

    #[test]
    fn test_factory_explicit_key_wins() {
        let config = LlmConfig::default();
        let provider = LlmProviderFactory::create("openai", &config, Some("sk-test")).unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_factory_unknown_provider() {
        let config = LlmConfig::default();
        let result = LlmProviderFactory::create("cohere", &config, Some("key"));
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }
}
