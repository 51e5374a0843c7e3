//! Error types for the Lister listing-generation pipeline.
//!
//! Errors are organized by stage: configuration problems surface before any
//! network activity, generator errors carry enough context (status codes,
//! file paths) to act on.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Lister operations.
#[derive(Error, Debug)]
pub enum ListerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Listing generation errors
    #[error("Generator error: {0}")]
    Generator(#[from] GeneratorError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// No API key available for the selected provider
    #[error("Missing API key: {0}")]
    MissingApiKey(String),
}

/// Listing generation errors.
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// LLM call failed (transport error, non-2xx status, malformed response)
    #[error("LLM error: {message}")]
    Llm {
        message: String,
        status_code: Option<u16>,
    },

    /// Reading or encoding a product image failed
    #[error("Image error for {path}: {message}")]
    Image { path: PathBuf, message: String },

    /// The image analysis step failed; no listing can be produced
    #[error("Image analysis failed: {message}")]
    Analysis { message: String },

    /// No image paths were supplied
    #[error("No product images provided")]
    NoImages,
}

/// Convenience type alias for Lister results.
pub type Result<T> = std::result::Result<T, ListerError>;

/// Convenience type alias for generator-specific results.
pub type GeneratorResult<T> = std::result::Result<T, GeneratorError>;
