/// OpenWeatherMap provider
///
/// Fetches current conditions for a fixed location in metric units. The
/// temperature is truncated to whole degrees and the condition is the
/// provider's coarse group name (e.g. "Clear", "Rain", "Clouds"), which is what
/// wardrobe items declare as their applicable condition.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{ApiWeatherResponse, Weather},
    services::providers::WeatherProvider,
};
use reqwest::Client as HttpClient;

#[derive(Clone)]
pub struct OpenWeatherProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    latitude: f64,
    longitude: f64,
    cache: Cache,
    cache_ttl: u64,
}

impl OpenWeatherProvider {
    pub fn new(
        cache: Cache,
        api_key: String,
        api_url: String,
        latitude: f64,
        longitude: f64,
        cache_ttl: u64,
    ) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            latitude,
            longitude,
            cache,
            cache_ttl,
        }
    }
}

/// Converts the raw API payload into the filter's weather context
fn convert_api_response(response: ApiWeatherResponse) -> AppResult<Weather> {
    let condition = response
        .weather
        .into_iter()
        .next()
        .map(|w| w.main)
        .ok_or_else(|| AppError::ExternalApi("Weather response missing condition".to_string()))?;

    Ok(Weather {
        temperature: response.main.temp.trunc() as i32,
        condition,
    })
}

#[async_trait::async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_weather(&self) -> AppResult<Weather> {
        cached!(
            self.cache,
            CacheKey::Weather(self.latitude.to_string(), self.longitude.to_string()),
            self.cache_ttl,
            async move {
                let url = format!("{}/data/2.5/weather", self.api_url);

                let response = self
                    .http_client
                    .get(&url)
                    .query(&[
                        ("lat", self.latitude.to_string()),
                        ("lon", self.longitude.to_string()),
                        ("appid", self.api_key.clone()),
                        ("units", "metric".to_string()),
                    ])
                    .send()
                    .await?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    tracing::error!(status = %status, body = %body, "Weather request failed");
                    return Err(AppError::ExternalApi(format!(
                        "Weather API returned status {}: {}",
                        status, body
                    )));
                }

                let payload: ApiWeatherResponse = response.json().await?;
                let weather = convert_api_response(payload)?;

                tracing::info!(
                    temperature = weather.temperature,
                    condition = %weather.condition,
                    provider = "openweather",
                    "Weather fetched"
                );

                Ok(weather)
            }
        )
    }

    fn name(&self) -> &'static str {
        "openweather"
    }
}
