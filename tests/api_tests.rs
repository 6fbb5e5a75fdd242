use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use stylist_api::{
    api::{create_router, AppState},
    db::{InMemoryWardrobeStore, WardrobeStore},
    error::{AppError, AppResult},
    models::{ColorFamily, NewClothingItem, Weather},
    services::{
        providers::{EncoderError, StyleEmbedding, StyleEncoder, WeatherProvider},
        ColorRules, EmbeddingCache, InMemoryEmbeddingStore, ScoringEngine, Stylist,
    },
};

const USER: i64 = 7;

struct FixedWeather(Option<Weather>);

#[async_trait::async_trait]
impl WeatherProvider for FixedWeather {
    async fn current_weather(&self) -> AppResult<Weather> {
        self.0
            .clone()
            .ok_or_else(|| AppError::ExternalApi("weather service down".to_string()))
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Encodes every description to the same vector and counts calls
#[derive(Default)]
struct ConstantEncoder {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl StyleEncoder for ConstantEncoder {
    async fn encode(&self, inputs: &[String]) -> Result<Vec<StyleEmbedding>, EncoderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(inputs.iter().map(|_| vec![0.6, 0.8]).collect())
    }

    fn name(&self) -> &'static str {
        "constant"
    }
}

struct DownEncoder;

#[async_trait::async_trait]
impl StyleEncoder for DownEncoder {
    async fn encode(&self, _inputs: &[String]) -> Result<Vec<StyleEmbedding>, EncoderError> {
        Err(EncoderError::Unavailable("connection refused".to_string()))
    }

    fn name(&self) -> &'static str {
        "down"
    }
}

fn item(item_type: &str, style: &str, color: &str, family: ColorFamily) -> NewClothingItem {
    NewClothingItem {
        name: format!("{} {}", color, item_type),
        item_type: item_type.to_string(),
        style: style.to_string(),
        color: color.to_string(),
        color_family: family,
        pattern: "Solid".to_string(),
        min_temp: 10,
        max_temp: 30,
        condition: "Any".to_string(),
        image_path: None,
    }
}

async fn formal_wardrobe(store: &InMemoryWardrobeStore, shoes_family: ColorFamily) {
    for new in [
        item("Shirt", "Formal", "White", ColorFamily::Neutral),
        item("Pants", "Formal", "Black", ColorFamily::Neutral),
        item("Shoes", "Formal", "Brown", shoes_family),
    ] {
        store.add_item(USER, new).await.unwrap();
    }
}

fn server(store: Arc<InMemoryWardrobeStore>, engine: ScoringEngine, weather: Option<Weather>) -> TestServer {
    let stylist = Stylist::new(store, engine, Some(11));
    let state = AppState::new(Arc::new(stylist), Arc::new(FixedWeather(weather)));
    TestServer::new(create_router(state)).unwrap()
}

fn clear_20() -> Option<Weather> {
    Some(Weather {
        temperature: 20,
        condition: "Clear".to_string(),
    })
}

fn rules() -> ScoringEngine {
    ScoringEngine::ColorRules(ColorRules::default())
}

#[tokio::test]
async fn test_health_check() {
    let server = server(Arc::new(InMemoryWardrobeStore::new()), rules(), clear_20());

    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_json(&json!({ "status": "healthy" }));
}

#[tokio::test]
async fn test_suggestion_with_neutral_shoes() {
    let store = Arc::new(InMemoryWardrobeStore::new());
    formal_wardrobe(&store, ColorFamily::Neutral).await;
    let server = server(store, rules(), clear_20());

    // Lower-case occasion is capitalized before filtering.
    let response = server.get("/suggest/7").add_query_param("occasion", "formal").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["shirt"]["color"], "White");
    assert_eq!(body["pants"]["color"], "Black");
    assert_eq!(body["shoes"]["color_family"], "Neutral");
    assert_eq!(body["top"], Value::Null);
    assert_eq!(body["current_weather"]["temperature"], 20);
    assert_eq!(body["current_weather"]["condition"], "Clear");
    assert!(body.get("score").is_none());
}

#[tokio::test]
async fn test_formal_black_brown_is_not_found() {
    let store = Arc::new(InMemoryWardrobeStore::new());
    formal_wardrobe(&store, ColorFamily::Brown).await;
    let server = server(store, rules(), clear_20());

    let response = server.get("/suggest/7").add_query_param("occasion", "Formal").await;
    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_json(&json!({ "error": "No suitable outfit found." }));
}

#[tokio::test]
async fn test_unknown_user_is_not_found() {
    let server = server(Arc::new(InMemoryWardrobeStore::new()), rules(), clear_20());

    let response = server.get("/suggest/99").add_query_param("occasion", "Casual").await;
    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_json(&json!({ "error": "User with ID 99 not found or has an empty wardrobe." }));
}

#[tokio::test]
async fn test_explicit_context_skips_weather_provider() {
    let store = Arc::new(InMemoryWardrobeStore::new());
    formal_wardrobe(&store, ColorFamily::Neutral).await;
    // A provider that always fails proves it was never consulted.
    let server = server(store, rules(), None);

    let response = server
        .get("/suggest/7")
        .add_query_param("occasion", "Formal")
        .add_query_param("temperature", 25)
        .add_query_param("condition", "Rain")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["current_weather"]["temperature"], 25);
    assert_eq!(body["current_weather"]["condition"], "Rain");
}

#[tokio::test]
async fn test_weather_failure_is_bad_gateway() {
    let store = Arc::new(InMemoryWardrobeStore::new());
    formal_wardrobe(&store, ColorFamily::Neutral).await;
    let server = server(store, rules(), None);

    let response = server.get("/suggest/7").add_query_param("occasion", "Formal").await;
    response.assert_status(StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_embedding_suggestion_and_cache_invalidation() {
    let store = Arc::new(InMemoryWardrobeStore::new());
    formal_wardrobe(&store, ColorFamily::Brown).await;
    let encoder = Arc::new(ConstantEncoder::default());
    let cache = EmbeddingCache::new(Arc::new(InMemoryEmbeddingStore::new()), encoder.clone());
    let server = server(store, ScoringEngine::Embedding(Arc::new(cache)), clear_20());

    // The embedding scorer has no formal exception.
    let response = server.get("/suggest/7").add_query_param("occasion", "Formal").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert!((body["score"].as_f64().unwrap() - 1.0).abs() < 1e-6);

    server.get("/suggest/7").add_query_param("occasion", "Formal").await.assert_status_ok();
    assert_eq!(encoder.calls.load(Ordering::SeqCst), 1);

    server
        .post("/wardrobe/7")
        .json(&json!({
            "name": "Navy blazer",
            "type": "Outerwear",
            "style": "Formal",
            "color": "Navy",
            "color_family": "Blue"
        }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server.get("/suggest/7").add_query_param("occasion", "Formal").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["top"]["name"], "Navy blazer");
    assert_eq!(encoder.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_encoder_failure_is_service_unavailable() {
    let store = Arc::new(InMemoryWardrobeStore::new());
    formal_wardrobe(&store, ColorFamily::Neutral).await;
    let cache = EmbeddingCache::new(Arc::new(InMemoryEmbeddingStore::new()), Arc::new(DownEncoder));
    let server = server(store, ScoringEngine::Embedding(Arc::new(cache)), clear_20());

    let response = server.get("/suggest/7").add_query_param("occasion", "Formal").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_add_list_and_delete_items() {
    let server = server(Arc::new(InMemoryWardrobeStore::new()), rules(), clear_20());

    let response = server
        .post("/wardrobe/7")
        .json(&json!({
            "name": "Linen shirt",
            "type": "Shirt",
            "style": "Casual",
            "color": "White",
            "color_family": "Neutral"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let status: Value = response.json();
    assert_eq!(status["status"], "success");

    let response = server.get("/wardrobe/7").await;
    response.assert_status_ok();
    let items: Vec<Value> = response.json();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["min_temp"], 15);
    assert_eq!(items[0]["max_temp"], 30);
    assert_eq!(items[0]["condition"], "Any");
    assert_eq!(items[0]["type"], "Shirt");

    let id = items[0]["id"].as_i64().unwrap();
    server.delete(&format!("/wardrobe/7/{}", id)).await.assert_status_ok();
    server
        .delete(&format!("/wardrobe/7/{}", id))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let items: Vec<Value> = server.get("/wardrobe/7").await.json();
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_add_item_with_inverted_range_is_bad_request() {
    let server = server(Arc::new(InMemoryWardrobeStore::new()), rules(), clear_20());

    let response = server
        .post("/wardrobe/7")
        .json(&json!({
            "name": "Parka",
            "type": "Outerwear",
            "style": "Casual",
            "color": "Olive",
            "color_family": "Brown",
            "min_temp": 20,
            "max_temp": 5
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = server(Arc::new(InMemoryWardrobeStore::new()), rules(), clear_20());

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("req-123"),
        )
        .await;
    assert_eq!(response.header("x-request-id"), "req-123");
}
