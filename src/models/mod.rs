pub mod clothing_item;
pub mod outfit;

pub use clothing_item::{
    ClothingItem, ColorFamily, GarmentRole, ItemId, NewClothingItem, UserId, ANY_CONDITION,
};
pub use outfit::{Outfit, OutfitResponse, StatusResponse, Weather};

/// Raw weather payload from an OpenWeatherMap-compatible `/data/2.5/weather` call
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ApiWeatherResponse {
    pub main: ApiWeatherMain,
    #[serde(default)]
    pub weather: Vec<ApiWeatherCondition>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct ApiWeatherMain {
    pub temp: f64,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct ApiWeatherCondition {
    pub main: String,
}
