//! LLM provider integration for listing generation.
//!
//! Providers implement a common chat interface (system prompt + user text +
//! images) and are created via the factory from config.

pub mod anthropic;
pub mod openai;
pub mod provider;

pub use provider::{
    resolve_env_var, ChatRequest, ChatResponse, ImageInput, LlmProvider, LlmProviderFactory,
};
