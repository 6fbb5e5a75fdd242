use std::sync::Arc;

use crate::services::{providers::WeatherProvider, Stylist};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub stylist: Arc<Stylist>,
    pub weather: Arc<dyn WeatherProvider>,
}

impl AppState {
    pub fn new(stylist: Arc<Stylist>, weather: Arc<dyn WeatherProvider>) -> Self {
        Self { stylist, weather }
    }
}
