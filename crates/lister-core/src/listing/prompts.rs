//! Prompt construction for the five model calls.
//!
//! All generation prompts reuse the image-derived analysis text plus the
//! seller's free-text description as shared context.

/// System instruction for the multimodal image-analysis call.
pub fn analysis_system() -> &'static str {
    "You are an expert marketplace listing assistant. Analyze the provided \
     product images and extract detailed information about the product \
     including:\n\
     - Product type and brand\n\
     - Condition assessment\n\
     - Key features and specifications\n\
     - Materials and dimensions if visible\n\
     - Any defects or wear\n\
     - Estimated value range\n\n\
     Be thorough and accurate in your analysis."
}

/// User message for the analysis call, combining the seller's description
/// with the attached images.
pub fn analysis_user(user_description: &str) -> String {
    format!(
        "Please analyze these product images. Additional seller description: {user_description}"
    )
}

/// System instruction for the title call.
pub fn title_system() -> &'static str {
    "You are an expert eBay listing title generator."
}

/// Prompt requesting a single search-optimized title.
pub fn title_prompt(analysis: &str, user_description: &str) -> String {
    format!(
        "Based on the product analysis and seller description, create an \
         optimized eBay title.\n\n\
         Product Analysis: {analysis}\n\
         Seller Description: {user_description}\n\n\
         Rules for eBay titles:\n\
         - Maximum 80 characters\n\
         - Include brand, model, condition, and key features\n\
         - Use keywords that buyers search for\n\
         - Avoid promotional language like \"RARE\" or \"AMAZING\"\n\
         - Include size, color, or other variants if applicable\n\n\
         Generate only the title, no additional text."
    )
}

/// System instruction for the description call.
pub fn description_system() -> &'static str {
    "You are an expert eBay listing description writer."
}

/// Prompt requesting a structured HTML description.
pub fn description_prompt(analysis: &str, user_description: &str) -> String {
    format!(
        "Create a comprehensive eBay product description based on the \
         analysis and seller input.\n\n\
         Product Analysis: {analysis}\n\
         Seller Description: {user_description}\n\n\
         Structure the description with:\n\
         1. Product overview and key features\n\
         2. Detailed specifications\n\
         3. Condition details\n\
         4. Shipping and return information\n\
         5. Professional closing\n\n\
         Use HTML formatting for better presentation. Include:\n\
         - Bullet points for features\n\
         - Bold text for important information\n\
         - Clear sections and headers\n\n\
         Make it professional and informative to increase buyer confidence."
    )
}

/// System instruction for the category call.
pub fn category_system() -> &'static str {
    "You are an expert eBay category classifier."
}

/// Prompt requesting exactly one hierarchical category path.
pub fn category_prompt(analysis: &str, user_description: &str) -> String {
    format!(
        "Based on the product analysis, suggest the most appropriate eBay \
         category.\n\n\
         Product Analysis: {analysis}\n\
         Seller Description: {user_description}\n\n\
         Provide the category in this format: \"Main Category > Subcategory > Specific Category\"\n\n\
         Common eBay categories include:\n\
         - Electronics > Computers & Tablets > Laptops & Netbooks\n\
         - Fashion > Women's Clothing > Tops & Blouses\n\
         - Home & Garden > Kitchen, Dining & Bar > Small Kitchen Appliances\n\
         - Collectibles > Trading Cards > Sports Trading Cards\n\
         - Books > Fiction & Literature > Contemporary Fiction\n\n\
         Choose the most specific and accurate category possible."
    )
}

/// System instruction for the weight call.
pub fn weight_system() -> &'static str {
    "You are an expert shipping weight estimator."
}

/// Prompt requesting a single numeric weight in kilograms.
pub fn weight_prompt(analysis: &str, user_description: &str) -> String {
    format!(
        "Based on the product analysis, estimate the postage weight in \
         kilograms.\n\n\
         Product Analysis: {analysis}\n\
         Seller Description: {user_description}\n\n\
         Consider:\n\
         - Product size and materials\n\
         - Typical weight for similar items\n\
         - Packaging requirements\n\
         - Add 10-15% for packaging materials\n\n\
         Provide only the numeric weight value in kg (e.g., 0.5 for 500g, \
         2.0 for 2kg). Be conservative and slightly overestimate for \
         accurate shipping costs."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_user_includes_description() {
        let prompt = analysis_user("Vintage leather jacket, good condition");
        assert!(prompt.contains("Vintage leather jacket"));
    }

    #[test]
    fn test_title_prompt_carries_both_contexts() {
        let prompt = title_prompt("A Canon AE-1 camera", "some scratches");
        assert!(prompt.contains("A Canon AE-1 camera"));
        assert!(prompt.contains("some scratches"));
        assert!(prompt.contains("Maximum 80 characters"));
    }

    #[test]
    fn test_category_prompt_shows_path_format() {
        let prompt = category_prompt("camera", "");
        assert!(prompt.contains("Main Category > Subcategory > Specific Category"));
    }

    #[test]
    fn test_weight_prompt_requests_numeric_only() {
        let prompt = weight_prompt("camera", "");
        assert!(prompt.contains("only the numeric weight value in kg"));
        assert!(prompt.contains("10-15%"));
    }
}
