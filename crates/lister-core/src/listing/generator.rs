//! The listing generator: five model calls assembled into one draft.
//!
//! The analysis call is the gate: if it fails, generation stops and the
//! failure is raised. The four downstream calls are data-independent, run
//! concurrently, and each absorbs its own failure so one bad field never
//! cancels the others.

use super::draft::{FieldResult, ListingDraft, ProductAnalysis};
use super::prompts;
use crate::config::{Config, ListingConfig};
use crate::error::{ConfigError, GeneratorError, GeneratorResult};
use crate::llm::{ChatRequest, ImageInput, LlmProvider, LlmProviderFactory};
use std::path::PathBuf;
use std::sync::Arc;

/// eBay's hard limit on title length, in characters.
const TITLE_MAX_CHARS: usize = 80;

/// Tuning knobs for the listing pipeline.
#[derive(Debug, Clone)]
pub struct ListingOptions {
    /// How many of the supplied images are forwarded to the model
    pub max_images: usize,
    /// Weight substituted when the model gives no usable number (kg)
    pub fallback_weight_kg: f64,
    /// Minimum postage weight (kg); estimates below this are floored
    pub min_weight_kg: f64,
}

impl Default for ListingOptions {
    fn default() -> Self {
        Self {
            max_images: 3,
            fallback_weight_kg: 0.5,
            min_weight_kg: 0.1,
        }
    }
}

impl From<&ListingConfig> for ListingOptions {
    fn from(config: &ListingConfig) -> Self {
        Self {
            max_images: config.max_images,
            fallback_weight_kg: config.fallback_weight_kg,
            min_weight_kg: config.min_weight_kg,
        }
    }
}

/// Generates a marketplace listing draft from product photos.
pub struct ListingGenerator {
    provider: Arc<dyn LlmProvider>,
    options: ListingOptions,
}

impl ListingGenerator {
    pub fn new(provider: Box<dyn LlmProvider>, options: ListingOptions) -> Self {
        Self {
            provider: Arc::from(provider),
            options,
        }
    }

    /// Build a generator from config, resolving the provider credential up
    /// front. Fails before any network activity if no key is available.
    pub fn from_config(
        config: &Config,
        api_key_override: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let provider =
            LlmProviderFactory::create(&config.llm.provider, &config.llm, api_key_override)?;
        Ok(Self::new(provider, ListingOptions::from(&config.listing)))
    }

    /// Analyze the product images into shared natural-language context.
    ///
    /// Only the first `max_images` paths are read and forwarded; each file
    /// is read fully into memory and base64-encoded. Any read failure or
    /// model failure is returned as an error, never panicked.
    pub async fn analyze_images(
        &self,
        image_paths: &[PathBuf],
        user_description: &str,
    ) -> GeneratorResult<ProductAnalysis> {
        if image_paths.is_empty() {
            return Err(GeneratorError::NoImages);
        }

        let mut images = Vec::new();
        for path in image_paths.iter().take(self.options.max_images) {
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|e| GeneratorError::Image {
                    path: path.clone(),
                    message: format!("Failed to read image: {e}"),
                })?;
            images.push(ImageInput::from_bytes(
                &bytes,
                &ImageInput::format_from_path(path),
            ));
        }

        let images_sent = images.len();
        tracing::debug!(
            "Analyzing {images_sent} of {} supplied images via {}",
            image_paths.len(),
            self.provider.name()
        );

        let request = ChatRequest {
            system: Some(prompts::analysis_system().to_string()),
            user_text: prompts::analysis_user(user_description),
            images,
            max_tokens: 1000,
            temperature: 0.7,
        };

        let response = self.provider.complete(&request).await?;
        tracing::debug!(
            "Analysis complete in {}ms ({} chars)",
            response.latency_ms,
            response.text.len()
        );

        Ok(ProductAnalysis {
            text: response.text,
            model: response.model,
            images_sent,
        })
    }

    /// Generate a search-optimized title, hard-truncated to 80 characters.
    pub async fn generate_title(
        &self,
        analysis: &str,
        user_description: &str,
    ) -> FieldResult<String> {
        let request = ChatRequest::text(
            prompts::title_system(),
            prompts::title_prompt(analysis, user_description),
            100,
            0.7,
        );
        match self.provider.complete(&request).await {
            Ok(response) => FieldResult::Generated {
                value: truncate_chars(response.text.trim(), TITLE_MAX_CHARS),
            },
            Err(e) => {
                tracing::warn!("Title generation failed: {e}");
                FieldResult::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Generate an HTML description with overview, specs, condition,
    /// shipping and closing sections.
    pub async fn generate_description(
        &self,
        analysis: &str,
        user_description: &str,
    ) -> FieldResult<String> {
        let request = ChatRequest::text(
            prompts::description_system(),
            prompts::description_prompt(analysis, user_description),
            500,
            0.7,
        );
        match self.provider.complete(&request).await {
            Ok(response) => FieldResult::Generated {
                value: response.text.trim().to_string(),
            },
            Err(e) => {
                tracing::warn!("Description generation failed: {e}");
                FieldResult::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Pick the most specific hierarchical category path.
    pub async fn categorize(&self, analysis: &str, user_description: &str) -> FieldResult<String> {
        let request = ChatRequest::text(
            prompts::category_system(),
            prompts::category_prompt(analysis, user_description),
            100,
            0.5,
        );
        match self.provider.complete(&request).await {
            Ok(response) => FieldResult::Generated {
                value: response.text.trim().to_string(),
            },
            Err(e) => {
                tracing::warn!("Categorization failed: {e}");
                FieldResult::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Estimate the postage weight in kilograms.
    ///
    /// Unparseable or failed estimates fall back to a fixed safe value so
    /// downstream shipping math always has a number; successful estimates
    /// are floored at the configured minimum.
    pub async fn estimate_weight(
        &self,
        analysis: &str,
        user_description: &str,
    ) -> FieldResult<f64> {
        let request = ChatRequest::text(
            prompts::weight_system(),
            prompts::weight_prompt(analysis, user_description),
            50,
            0.3,
        );
        match self.provider.complete(&request).await {
            Ok(response) => match response.text.trim().parse::<f64>() {
                Ok(weight) => FieldResult::Generated {
                    value: weight.max(self.options.min_weight_kg),
                },
                Err(_) => {
                    tracing::warn!(
                        "Weight estimate not numeric ({:?}), using fallback",
                        response.text
                    );
                    FieldResult::Fallback {
                        value: self.options.fallback_weight_kg,
                        reason: format!("unparseable weight estimate: {:?}", response.text),
                    }
                }
            },
            Err(e) => {
                tracing::warn!("Weight estimation failed: {e}");
                FieldResult::Fallback {
                    value: self.options.fallback_weight_kg,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Generate a complete listing draft from product photos.
    ///
    /// An analysis failure is raised and no downstream call is made. After
    /// a successful analysis all four generation calls are dispatched
    /// concurrently; each absorbs its own failure.
    pub async fn generate_listing(
        &self,
        image_paths: &[PathBuf],
        user_description: &str,
    ) -> GeneratorResult<ListingDraft> {
        let analysis = self
            .analyze_images(image_paths, user_description)
            .await
            .map_err(|e| GeneratorError::Analysis {
                message: e.to_string(),
            })?;

        let (title, description, category, postage_weight_kg) = tokio::join!(
            self.generate_title(&analysis.text, user_description),
            self.generate_description(&analysis.text, user_description),
            self.categorize(&analysis.text, user_description),
            self.estimate_weight(&analysis.text, user_description),
        );

        let draft = ListingDraft {
            title,
            description,
            category,
            postage_weight_kg,
            suggested_price: None,
        };

        if !draft.is_complete() {
            tracing::warn!("Listing draft has degraded fields");
        }

        Ok(draft)
    }
}

/// Cut a string to at most `max` characters. No ellipsis, no word-boundary
/// awareness; a direct character cut.
fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatResponse;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Which of the five pipeline calls a request belongs to, inferred from
    /// its content.
    fn call_kind(request: &ChatRequest) -> &'static str {
        if !request.images.is_empty() {
            "analyze"
        } else if request.user_text.contains("optimized eBay title") {
            "title"
        } else if request.user_text.contains("comprehensive eBay product description") {
            "description"
        } else if request.user_text.contains("appropriate eBay category") {
            "category"
        } else if request.user_text.contains("postage weight in kilograms") {
            "weight"
        } else {
            "unknown"
        }
    }

    type ResponseFn = Box<dyn Fn(&'static str) -> Result<String, GeneratorError> + Send + Sync>;

    /// A programmable mock provider routed by call kind.
    struct MockProvider {
        response_fn: ResponseFn,
        /// Total calls to `complete` (shared for post-hoc assertions)
        call_count: Arc<AtomicU32>,
        /// Image count of the most recent multimodal request
        images_seen: Arc<AtomicUsize>,
        /// Kinds of all calls, in arrival order
        kinds_seen: Arc<Mutex<Vec<&'static str>>>,
    }

    impl MockProvider {
        fn routed(
            f: impl Fn(&'static str) -> Result<String, GeneratorError> + Send + Sync + 'static,
        ) -> Self {
            Self {
                response_fn: Box::new(f),
                call_count: Arc::new(AtomicU32::new(0)),
                images_seen: Arc::new(AtomicUsize::new(0)),
                kinds_seen: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Every call succeeds with a per-kind canned answer.
        fn all_success() -> Self {
            Self::routed(|kind| {
                Ok(match kind {
                    "analyze" => "A Canon AE-1 35mm film camera in good condition.".to_string(),
                    "title" => "Canon AE-1 35mm Film Camera Body Good Condition".to_string(),
                    "description" => "<h2>Canon AE-1</h2><ul><li>Working meter</li></ul>".to_string(),
                    "category" => "Cameras & Photo > Film Photography > Film Cameras".to_string(),
                    "weight" => "0.9".to_string(),
                    other => panic!("unexpected call kind: {other}"),
                })
            })
        }

        fn call_count_handle(&self) -> Arc<AtomicU32> {
            self.call_count.clone()
        }

        fn images_seen_handle(&self) -> Arc<AtomicUsize> {
            self.images_seen.clone()
        }

        fn kinds_seen_handle(&self) -> Arc<Mutex<Vec<&'static str>>> {
            self.kinds_seen.clone()
        }
    }

    #[async_trait]
    impl LlmProvider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, GeneratorError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            let kind = call_kind(request);
            self.kinds_seen.lock().unwrap().push(kind);
            if kind == "analyze" {
                self.images_seen.store(request.images.len(), Ordering::SeqCst);
            }
            (self.response_fn)(kind).map(|text| ChatResponse {
                text,
                model: "mock-v1".to_string(),
                tokens_used: Some(42),
                latency_ms: 10,
            })
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(60)
        }
    }

    fn llm_error(status_code: Option<u16>, message: &str) -> GeneratorError {
        GeneratorError::Llm {
            message: message.to_string(),
            status_code,
        }
    }

    /// Write `count` dummy image files into a temp dir and return their paths.
    fn fixture_images(dir: &tempfile::TempDir, count: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|i| {
                let path = dir.path().join(format!("product{i}.jpg"));
                std::fs::write(&path, [0xFF, 0xD8, 0xFF, 0xE0, i as u8]).unwrap();
                path
            })
            .collect()
    }

    fn generator(provider: MockProvider) -> ListingGenerator {
        ListingGenerator::new(Box::new(provider), ListingOptions::default())
    }

    #[tokio::test]
    async fn test_end_to_end_single_image_empty_description() {
        let dir = tempfile::tempdir().unwrap();
        let images = fixture_images(&dir, 1);
        let provider = MockProvider::all_success();
        let call_count = provider.call_count_handle();

        let draft = generator(provider)
            .generate_listing(&images, "")
            .await
            .unwrap();

        assert!(draft.is_complete());
        assert_eq!(
            draft.title.value().unwrap(),
            "Canon AE-1 35mm Film Camera Body Good Condition"
        );
        assert_eq!(draft.postage_weight_kg.value(), Some(&0.9));
        assert!(draft.suggested_price.is_none());
        // 1 analysis + 4 generations
        assert_eq!(call_count.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_title_truncated_to_exactly_80_chars() {
        let long_title = "X".repeat(95);
        let expected: String = long_title.chars().take(80).collect();
        let provider = MockProvider::routed(move |kind| {
            Ok(if kind == "title" {
                long_title.clone()
            } else {
                "ok".to_string()
            })
        });

        let title = generator(provider).generate_title("analysis", "").await;
        let value = title.value().unwrap();
        assert_eq!(value.chars().count(), 80);
        assert_eq!(value, &expected);
        assert!(!value.ends_with('…'));
    }

    #[tokio::test]
    async fn test_short_title_untouched() {
        let provider = MockProvider::routed(|_| Ok("  Short Title  ".to_string()));
        let title = generator(provider).generate_title("analysis", "").await;
        assert_eq!(title.value().unwrap(), "Short Title");
    }

    #[tokio::test]
    async fn test_analysis_failure_short_circuits() {
        let dir = tempfile::tempdir().unwrap();
        let images = fixture_images(&dir, 2);
        let provider = MockProvider::routed(|kind| {
            if kind == "analyze" {
                Err(llm_error(Some(429), "rate limited"))
            } else {
                Ok("should never be reached".to_string())
            }
        });
        let call_count = provider.call_count_handle();

        let err = generator(provider)
            .generate_listing(&images, "jacket")
            .await
            .unwrap_err();

        assert!(matches!(err, GeneratorError::Analysis { .. }));
        assert!(err.to_string().contains("rate limited"), "got: {err}");
        // Only the analysis call was made; zero downstream calls
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_title_failure_isolated_from_other_fields() {
        let dir = tempfile::tempdir().unwrap();
        let images = fixture_images(&dir, 1);
        let provider = MockProvider::routed(|kind| match kind {
            "title" => Err(llm_error(Some(500), "internal server error")),
            "weight" => Ok("1.2".to_string()),
            _ => Ok("generated content".to_string()),
        });

        let draft = generator(provider)
            .generate_listing(&images, "")
            .await
            .unwrap();

        assert!(matches!(draft.title, FieldResult::Failed { .. }));
        assert!(draft
            .title
            .degraded_reason()
            .unwrap()
            .contains("internal server error"));
        assert!(draft.description.is_generated());
        assert!(draft.category.is_generated());
        assert_eq!(draft.postage_weight_kg.value(), Some(&1.2));
        assert!(!draft.is_complete());
    }

    #[tokio::test]
    async fn test_weight_parses_numeric_response() {
        let provider = MockProvider::routed(|_| Ok("0.5".to_string()));
        let weight = generator(provider).estimate_weight("analysis", "").await;
        assert_eq!(weight, FieldResult::Generated { value: 0.5 });
    }

    #[tokio::test]
    async fn test_weight_floors_tiny_estimates() {
        let provider = MockProvider::routed(|_| Ok("0.05".to_string()));
        let weight = generator(provider).estimate_weight("analysis", "").await;
        assert_eq!(weight.value(), Some(&0.1));
        assert!(weight.is_generated());
    }

    #[tokio::test]
    async fn test_weight_fallback_on_prose_response() {
        let provider = MockProvider::routed(|_| Ok("approximately half a kilo".to_string()));
        let weight = generator(provider).estimate_weight("analysis", "").await;
        match weight {
            FieldResult::Fallback { value, reason } => {
                assert_eq!(value, 0.5);
                assert!(reason.contains("approximately half a kilo"));
            }
            other => panic!("expected fallback, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_weight_fallback_on_empty_response() {
        let provider = MockProvider::routed(|_| Ok(String::new()));
        let weight = generator(provider).estimate_weight("analysis", "").await;
        assert!(matches!(weight, FieldResult::Fallback { value, .. } if value == 0.5));
    }

    #[tokio::test]
    async fn test_weight_fallback_on_call_failure() {
        let provider = MockProvider::routed(|_| Err(llm_error(None, "connection refused")));
        let weight = generator(provider).estimate_weight("analysis", "").await;
        match weight {
            FieldResult::Fallback { value, reason } => {
                assert_eq!(value, 0.5);
                assert!(reason.contains("connection refused"));
            }
            other => panic!("expected fallback, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_analysis_forwards_at_most_max_images() {
        let dir = tempfile::tempdir().unwrap();
        let images = fixture_images(&dir, 5);
        let provider = MockProvider::all_success();
        let images_seen = provider.images_seen_handle();

        let analysis = generator(provider)
            .analyze_images(&images, "box of cameras")
            .await
            .unwrap();

        assert_eq!(images_seen.load(Ordering::SeqCst), 3);
        assert_eq!(analysis.images_sent, 3);
    }

    #[tokio::test]
    async fn test_analysis_with_no_images_fails() {
        let provider = MockProvider::all_success();
        let call_count = provider.call_count_handle();
        let err = generator(provider)
            .analyze_images(&[], "no photos")
            .await
            .unwrap_err();
        assert!(matches!(err, GeneratorError::NoImages));
        assert_eq!(call_count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_analysis_unreadable_image_fails_before_network() {
        let provider = MockProvider::all_success();
        let call_count = provider.call_count_handle();
        let images = vec![PathBuf::from("/nonexistent/ghost.jpg")];

        let err = generator(provider)
            .analyze_images(&images, "")
            .await
            .unwrap_err();

        match err {
            GeneratorError::Image { path, message } => {
                assert_eq!(path, PathBuf::from("/nonexistent/ghost.jpg"));
                assert!(message.contains("Failed to read image"));
            }
            other => panic!("expected image error, got {other:?}"),
        }
        assert_eq!(call_count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_listing_makes_one_call_per_stage() {
        let dir = tempfile::tempdir().unwrap();
        let images = fixture_images(&dir, 2);
        let provider = MockProvider::all_success();
        let kinds_seen = provider.kinds_seen_handle();

        generator(provider)
            .generate_listing(&images, "camera")
            .await
            .unwrap();

        let mut kinds = kinds_seen.lock().unwrap().clone();
        kinds.sort_unstable();
        assert_eq!(
            kinds,
            vec!["analyze", "category", "description", "title", "weight"]
        );
    }

    #[test]
    fn test_truncate_chars_multibyte_safe() {
        let s = "é".repeat(90);
        let cut = truncate_chars(&s, 80);
        assert_eq!(cut.chars().count(), 80);
        assert_eq!(truncate_chars("abc", 80), "abc");
    }

    #[test]
    fn test_options_from_config() {
        let config = ListingConfig {
            max_images: 6,
            fallback_weight_kg: 0.75,
            min_weight_kg: 0.2,
        };
        let options = ListingOptions::from(&config);
        assert_eq!(options.max_images, 6);
        assert_eq!(options.fallback_weight_kg, 0.75);
        assert_eq!(options.min_weight_kg, 0.2);
    }
}
