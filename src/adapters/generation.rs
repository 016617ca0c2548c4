//! Generative-card adapter: one outbound completion call, reshaped into a
//! [`ProductCard`]. A single attempt, no retry; every fault degrades to the
//! deterministic fallback card so response latency stays bounded.

use serde_json::json;
use tracing::{debug, error};

use super::AdapterError;
use crate::card::{fallback_card, ProductCard};

pub const GENERATION_ENDPOINT: &str =
    "https://llm.api.cloud.yandex.net/foundationModels/v1/completion";

/// Fixed persona for the copywriting model. The response contract is JSON
/// with the four card fields.
const SYSTEM_PROMPT: &str = "You are an expert copywriter for marketplace product listings. \
Create a compelling, SEO-aware product card for the user's product. \
Respond with JSON only, with fields: title, description, features, image_url. \
title: up to 100 characters, attention-grabbing. \
description: up to 1000 characters with emotional triggers. \
features: an array of 3-5 key benefits. \
image_url: a suitable stock photo URL.";

pub struct CardGenerator {
    http: reqwest::Client,
    api_key: String,
    folder_id: Option<String>,
    endpoint: String,
}

impl CardGenerator {
    pub fn new(http: reqwest::Client, api_key: String, folder_id: Option<String>) -> Self {
        Self {
            http,
            api_key,
            folder_id,
            endpoint: GENERATION_ENDPOINT.to_string(),
        }
    }

    /// Generate a card for the given product text. Infallible from the
    /// caller's point of view: on any fault the fallback card is returned.
    pub async fn generate(&self, product_text: &str, user_id: u64) -> ProductCard {
        match self.request_card(product_text).await {
            Ok(card) => {
                debug!(user_id, title = %card.title, "Card generated");
                card
            }
            Err(e) => {
                error!(user_id, error = %e, "Card generation failed, using fallback card");
                fallback_card()
            }
        }
    }

    async fn request_card(&self, product_text: &str) -> Result<ProductCard, AdapterError> {
        let folder = self.folder_id.as_deref().unwrap_or("default");
        let payload = json!({
            "modelUri": format!("gpt://{folder}/yandexgpt/latest"),
            "completionOptions": {
                "stream": false,
                "temperature": 0.7,
                "maxTokens": "2000"
            },
            "messages": [
                { "role": "system", "text": SYSTEM_PROMPT },
                { "role": "user", "text": format!("Create a selling product card for: {product_text}") }
            ]
        });

        let mut request = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload);
        if let Some(folder_id) = &self.folder_id {
            request = request.header("x-folder-id", folder_id);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(AdapterError::Status(response.status()));
        }

        let body: serde_json::Value = response.json().await?;
        let completion = body["result"]["alternatives"][0]["message"]["text"]
            .as_str()
            .ok_or(AdapterError::Shape("missing completion text"))?;

        card_from_completion(completion, product_text)
            .ok_or(AdapterError::Shape("completion is not a valid card"))
    }
}

/// Parse the model completion into a card. A missing or placeholder image is
/// replaced with a stock image derived from the product text; any other
/// shape violation yields `None`.
pub fn card_from_completion(completion: &str, product_text: &str) -> Option<ProductCard> {
    let value: serde_json::Value = serde_json::from_str(completion).ok()?;
    let title = value["title"].as_str()?.to_string();
    let description = value["description"].as_str()?.to_string();
    let features = value["features"]
        .as_array()?
        .iter()
        .filter_map(|f| f.as_str().map(str::to_string))
        .collect();
    let image_url = match value["image_url"].as_str() {
        Some(url) if !url.is_empty() && !url.contains("placeholder") => url.to_string(),
        _ => stock_image_url(product_text),
    };

    ProductCard::new(title, description, features, image_url).ok()
}

/// Generic stock-image reference keyed by the first word of the product text.
pub fn stock_image_url(product_text: &str) -> String {
    let keyword = product_text.split_whitespace().next().unwrap_or("product");
    format!("https://source.unsplash.com/800x600/?{keyword},product")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::MAX_TITLE_LEN;

    #[test]
    fn test_completion_parses_into_card() {
        let completion = r#"{
            "title": "Premium leather wallet",
            "description": "Hand-stitched wallet that lasts for years.",
            "features": ["Full-grain leather", "RFID protection", "Slim profile"],
            "image_url": "https://images.example.com/wallet.jpg"
        }"#;
        let card = card_from_completion(completion, "leather wallet").unwrap();
        assert_eq!(card.title, "Premium leather wallet");
        assert_eq!(card.features.len(), 3);
        assert_eq!(card.image_url, "https://images.example.com/wallet.jpg");
    }

    #[test]
    fn test_placeholder_image_is_replaced() {
        let completion = r#"{
            "title": "T",
            "description": "D",
            "features": ["F"],
            "image_url": "https://via.placeholder.com/512.png"
        }"#;
        let card = card_from_completion(completion, "ceramic mug").unwrap();
        assert_eq!(card.image_url, "https://source.unsplash.com/800x600/?ceramic,product");
    }

    #[test]
    fn test_missing_image_is_replaced() {
        let completion = r#"{"title": "T", "description": "D", "features": []}"#;
        let card = card_from_completion(completion, "mug").unwrap();
        assert_eq!(card.image_url, stock_image_url("mug"));
    }

    #[test]
    fn test_non_json_completion_is_rejected() {
        assert!(card_from_completion("Here is your card: ...", "mug").is_none());
    }

    #[test]
    fn test_missing_field_is_rejected() {
        assert!(card_from_completion(r#"{"title": "T"}"#, "mug").is_none());
    }

    #[test]
    fn test_overlong_title_is_rejected() {
        let completion = format!(
            r#"{{"title": "{}", "description": "D", "features": [], "image_url": "https://x/y.jpg"}}"#,
            "x".repeat(MAX_TITLE_LEN + 1)
        );
        assert!(card_from_completion(&completion, "mug").is_none());
    }

    #[test]
    fn test_stock_image_url_uses_first_word() {
        assert_eq!(
            stock_image_url("wooden chess set"),
            "https://source.unsplash.com/800x600/?wooden,product"
        );
        assert_eq!(
            stock_image_url("   "),
            "https://source.unsplash.com/800x600/?product,product"
        );
    }
}
