//! The listing-generation pipeline.
//!
//! One multimodal analysis call, then four generation calls (title,
//! description, category, postage weight) assembled into a `ListingDraft`.

pub mod draft;
pub mod generator;
pub mod prompts;

pub use draft::{FieldResult, ListingDraft, ProductAnalysis};
pub use generator::{ListingGenerator, ListingOptions};
