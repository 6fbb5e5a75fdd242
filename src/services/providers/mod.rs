/// External collaborators of the stylist core
///
/// The style encoder turns item descriptions into embeddings and the weather
/// provider supplies the context the filter runs against. Both are pluggable
/// so the core can be exercised against in-memory fakes.
use thiserror::Error;

use crate::{
    error::AppResult,
    models::{ItemId, Weather},
};

pub mod encoder;
pub mod openweather;

pub use encoder::HttpStyleEncoder;
pub use openweather::OpenWeatherProvider;

/// Fixed-dimension style vector produced by an encoder
pub type StyleEmbedding = Vec<f32>;

/// Error types for style encoders
#[derive(Debug, Error)]
pub enum EncoderError {
    #[error("encoder unavailable: {0}")]
    Unavailable(String),

    #[error("encoder API error: {0}")]
    Api(String),

    #[error("encoder returned {got} embeddings for {expected} inputs")]
    CountMismatch { expected: usize, got: usize },

    #[error("encoder returned embedding of dimension {got}, expected {expected}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("encoder returned unexpected index {index} for batch size {batch_size}")]
    UnexpectedIndex { index: usize, batch_size: usize },

    #[error("encoder returned a non-finite component in embedding {index}")]
    NonFinite { index: usize },

    #[error("item {item_id} has no image to encode")]
    MissingImage { item_id: ItemId },
}

/// Trait for style encoders
///
/// `encode` must preserve input order and be deterministic for identical input.
/// Implementations batch internally; callers hand over the whole wardrobe at once.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait StyleEncoder: Send + Sync {
    async fn encode(&self, inputs: &[String]) -> Result<Vec<StyleEmbedding>, EncoderError>;

    /// Encoder name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Trait for current-weather lookups
#[async_trait::async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current_weather(&self) -> AppResult<Weather>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
