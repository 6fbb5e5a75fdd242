use serde::{Deserialize, Serialize};

use super::ClothingItem;

/// Current weather as used by the context filter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Weather {
    pub temperature: i32,
    pub condition: String,
}

/// A selected outfit: the scored triple plus an optional layer
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Outfit {
    pub shirt: ClothingItem,
    pub pants: ClothingItem,
    pub shoes: ClothingItem,
    /// Finishing layer drawn from the tops bucket, never scored
    pub top: Option<ClothingItem>,
    /// Similarity score for the embedding strategy, absent for the rule strategy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

/// Response body of the suggestion endpoint
#[derive(Debug, Clone, Serialize)]
pub struct OutfitResponse {
    #[serde(flatten)]
    pub outfit: Outfit,
    pub current_weather: Weather,
}

/// Confirmation body for wardrobe mutations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusResponse {
    pub status: String,
    pub detail: String,
}

impl StatusResponse {
    pub fn success(detail: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            detail: detail.into(),
        }
    }
}
