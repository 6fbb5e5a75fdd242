use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    models::{ClothingItem, ItemId, NewClothingItem, OutfitResponse, StatusResponse, UserId, Weather},
    services::{OutfitContext, Suggestion},
};

use super::AppState;

// Request types

#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    pub occasion: String,
    /// Overrides the provider's temperature
    pub temperature: Option<i32>,
    /// Overrides the provider's condition
    pub condition: Option<String>,
}

/// "formal" / "FORMAL" → "Formal"
fn capitalize(value: &str) -> String {
    let mut chars = value.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Suggest an outfit for the user's occasion and the current weather
pub async fn suggest(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Query(params): Query<SuggestQuery>,
) -> AppResult<Json<OutfitResponse>> {
    let weather = match (params.temperature, params.condition) {
        (Some(temperature), Some(condition)) => Weather { temperature, condition },
        (temperature, condition) => {
            let current = state.weather.current_weather().await?;
            tracing::debug!(
                provider = state.weather.name(),
                temperature = current.temperature,
                condition = %current.condition,
                "Fetched current weather"
            );
            Weather {
                temperature: temperature.unwrap_or(current.temperature),
                condition: condition.unwrap_or(current.condition),
            }
        }
    };

    let context = OutfitContext::new(capitalize(&params.occasion), weather.temperature, weather.condition.clone());

    let outfit = match state.stylist.suggest(user_id, &context).await? {
        Suggestion::Found(outfit) => outfit,
        Suggestion::NoMatch => return Err(AppError::NotFound("No suitable outfit found.".to_string())),
        Suggestion::EmptyWardrobe => {
            return Err(AppError::NotFound(format!(
                "User with ID {} not found or has an empty wardrobe.",
                user_id
            )))
        }
    };

    Ok(Json(OutfitResponse {
        outfit,
        current_weather: weather,
    }))
}

/// List a user's wardrobe
pub async fn get_wardrobe(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<Vec<ClothingItem>>> {
    let items = state.stylist.wardrobe(user_id).await?;
    Ok(Json(items))
}

/// Add an item to a user's wardrobe
pub async fn add_item(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(item): Json<NewClothingItem>,
) -> AppResult<(StatusCode, Json<StatusResponse>)> {
    let stored = state.stylist.add_item(user_id, item).await?;

    Ok((
        StatusCode::CREATED,
        Json(StatusResponse::success(format!("Item {} added", stored.id))),
    ))
}

/// Delete an item from a user's wardrobe
pub async fn delete_item(
    State(state): State<AppState>,
    Path((user_id, item_id)): Path<(UserId, ItemId)>,
) -> AppResult<Json<StatusResponse>> {
    if !state.stylist.remove_item(user_id, item_id).await? {
        return Err(AppError::NotFound(format!("Item {} not found", item_id)));
    }

    Ok(Json(StatusResponse::success(format!("Item {} deleted", item_id))))
}
