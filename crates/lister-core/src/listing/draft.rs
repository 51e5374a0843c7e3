//! Output types for the listing-generation pipeline.
//!
//! Each generated field carries a typed outcome instead of error text
//! masquerading as content, so a UI or submission layer can decide whether
//! to render, regenerate, or block.

use serde::Serialize;

/// Outcome of one generated listing field.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FieldResult<T> {
    /// The model produced a usable value.
    Generated { value: T },
    /// The call or parse failed; `value` is a safe substitute.
    Fallback { value: T, reason: String },
    /// The call failed and no substitute exists.
    Failed { reason: String },
}

impl<T> FieldResult<T> {
    /// The usable value, if any (generated or fallback).
    pub fn value(&self) -> Option<&T> {
        match self {
            FieldResult::Generated { value } | FieldResult::Fallback { value, .. } => Some(value),
            FieldResult::Failed { .. } => None,
        }
    }

    /// Whether the field came back clean from the model.
    pub fn is_generated(&self) -> bool {
        matches!(self, FieldResult::Generated { .. })
    }

    /// The failure reason, if the field is degraded.
    pub fn degraded_reason(&self) -> Option<&str> {
        match self {
            FieldResult::Generated { .. } => None,
            FieldResult::Fallback { reason, .. } | FieldResult::Failed { reason } => Some(reason),
        }
    }
}

/// Natural-language product analysis produced from the images.
///
/// Shared input context for all four downstream generation calls.
#[derive(Debug, Clone, Serialize)]
pub struct ProductAnalysis {
    /// Raw analysis text from the model
    pub text: String,
    /// Model identifier that produced it
    pub model: String,
    /// Number of images actually forwarded to the model
    pub images_sent: usize,
}

/// A generated marketplace listing.
#[derive(Debug, Clone, Serialize)]
pub struct ListingDraft {
    /// Listing title, at most 80 characters when generated
    pub title: FieldResult<String>,
    /// HTML-formatted listing description
    pub description: FieldResult<String>,
    /// Hierarchical category path, e.g. "Electronics > Cameras > Lenses"
    pub category: FieldResult<String>,
    /// Estimated postage weight in kilograms, always >= the configured floor
    pub postage_weight_kg: FieldResult<f64>,
    /// Reserved for a future pricing step; never populated by this pipeline
    pub suggested_price: Option<f64>,
}

impl ListingDraft {
    /// Whether every field came back clean from the model.
    pub fn is_complete(&self) -> bool {
        self.title.is_generated()
            && self.description.is_generated()
            && self.category.is_generated()
            && self.postage_weight_kg.is_generated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_result_value() {
        let generated: FieldResult<f64> = FieldResult::Generated { value: 1.2 };
        let fallback: FieldResult<f64> = FieldResult::Fallback {
            value: 0.5,
            reason: "unparseable".to_string(),
        };
        let failed: FieldResult<f64> = FieldResult::Failed {
            reason: "timeout".to_string(),
        };
        assert_eq!(generated.value(), Some(&1.2));
        assert_eq!(fallback.value(), Some(&0.5));
        assert_eq!(failed.value(), None);
    }

    #[test]
    fn test_degraded_reason() {
        let generated: FieldResult<String> = FieldResult::Generated {
            value: "ok".to_string(),
        };
        assert!(generated.degraded_reason().is_none());

        let failed: FieldResult<String> = FieldResult::Failed {
            reason: "HTTP 500".to_string(),
        };
        assert_eq!(failed.degraded_reason(), Some("HTTP 500"));
    }

    #[test]
    fn test_draft_completeness() {
        let draft = ListingDraft {
            title: FieldResult::Generated {
                value: "Canon AE-1".to_string(),
            },
            description: FieldResult::Generated {
                value: "<p>35mm SLR</p>".to_string(),
            },
            category: FieldResult::Failed {
                reason: "HTTP 503".to_string(),
            },
            postage_weight_kg: FieldResult::Generated { value: 0.9 },
            suggested_price: None,
        };
        assert!(!draft.is_complete());
    }

    #[test]
    fn test_field_result_serializes_with_status_tag() {
        let fallback: FieldResult<f64> = FieldResult::Fallback {
            value: 0.5,
            reason: "no numeric answer".to_string(),
        };
        let json = serde_json::to_string(&fallback).unwrap();
        assert!(json.contains("\"status\":\"fallback\""));
        assert!(json.contains("\"value\":0.5"));
    }
}
