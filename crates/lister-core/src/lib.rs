//! Lister Core - Marketplace listing generation from product photos.
//!
//! Lister turns a set of product photographs plus an optional seller
//! description into a structured listing draft (title, description,
//! category, postage weight) by orchestrating a multimodal LLM.
//!
//! # Architecture
//!
//! ```text
//! Images → Analyze (multimodal) → Title / Description / Category / Weight → Draft
//! ```
//!
//! The analysis call is a hard gate: if it fails, no listing is produced.
//! The four downstream calls run concurrently and each degrades on its own;
//! every field in the returned draft records whether it was generated
//! cleanly, substituted with a fallback, or failed outright.
//!
//! # Usage
//!
//! ```rust,ignore
//! use lister_core::{Config, ListingGenerator};
//!
//! #[tokio::main]
//! async fn main() -> lister_core::Result<()> {
//!     let config = Config::load()?;
//!     let generator = ListingGenerator::from_config(&config, None)?;
//!
//!     let draft = generator
//!         .generate_listing(&paths, "Vintage leather jacket, good condition")
//!         .await?;
//!     println!("Title: {:?}", draft.title.value());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod listing;
pub mod llm;
pub mod output;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, GeneratorError, GeneratorResult, ListerError, Result};
pub use listing::{FieldResult, ListingDraft, ListingGenerator, ListingOptions, ProductAnalysis};
pub use llm::{ChatRequest, ChatResponse, ImageInput, LlmProvider, LlmProviderFactory};
pub use output::OutputWriter;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
