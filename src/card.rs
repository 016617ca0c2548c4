//! Product card data model, field limits, fallback card and caption rendering

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::plans::Plan;

pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// Image used when all else fails; a stable reference so fallback cards
/// compare equal across runs.
pub const FALLBACK_IMAGE_URL: &str = "https://source.unsplash.com/800x600/?product,quality";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CardError {
    #[error("title exceeds {MAX_TITLE_LEN} characters")]
    TitleTooLong,
    #[error("description exceeds {MAX_DESCRIPTION_LEN} characters")]
    DescriptionTooLong,
}

/// A generated marketplace product card. Transient: produced fresh per
/// generation request, never persisted or reused.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCard {
    pub title: String,
    pub description: String,
    pub features: Vec<String>,
    pub image_url: String,
}

impl ProductCard {
    /// Build a card, enforcing the field limits the upstream contract
    /// promises. A violation is a handled failure at the adapter boundary.
    pub fn new(
        title: String,
        description: String,
        features: Vec<String>,
        image_url: String,
    ) -> Result<Self, CardError> {
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(CardError::TitleTooLong);
        }
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(CardError::DescriptionTooLong);
        }
        Ok(Self {
            title,
            description,
            features,
            image_url,
        })
    }
}

/// The deterministic card substituted whenever generation fails for any
/// reason. The caller never sees a fault, only this card.
pub fn fallback_card() -> ProductCard {
    ProductCard {
        title: "Generation temporarily unavailable".to_string(),
        description: "We could not generate a card for your product right now. \
                      Please try again in a few minutes, the result is usually \
                      ready on the next attempt."
            .to_string(),
        features: vec![
            "Try again in a few minutes".to_string(),
            "Your description was received".to_string(),
            "Support: @cardsmith_support".to_string(),
        ],
        image_url: FALLBACK_IMAGE_URL.to_string(),
    }
}

/// Render the photo caption: title, description, bulleted features and a
/// plan-dependent banner (free tier gets the demo watermark notice).
pub fn render_caption(card: &ProductCard, plan: Plan) -> String {
    let bullets = card
        .features
        .iter()
        .map(|feature| format!("• {feature}"))
        .collect::<Vec<_>>()
        .join("\n");

    match plan {
        Plan::Free => format!(
            "🆓 *DEMO CARD* 🆓\n\n*{}*\n\n{}\n\n{}\n\n⚠️ *Demo version with watermarks*",
            card.title, card.description, bullets
        ),
        _ => format!(
            "✨ *PREMIUM CARD* ✨\n\n*{}*\n\n{}\n\n{}\n\n🎯 *Ready to publish on the marketplace*",
            card.title, card.description, bullets
        ),
    }
}
