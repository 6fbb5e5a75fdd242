use std::{sync::Arc, time::Duration};

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use stylist_api::{
    api::{create_router, AppState},
    config::{Config, ScoringStrategy},
    db::{create_pool, create_redis_client, Cache, PgWardrobeStore},
    services::{
        providers::{HttpStyleEncoder, OpenWeatherProvider},
        ColorRules, EmbeddingCache, RedisEmbeddingStore, ScoringEngine, Stylist,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stylist_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    let redis_client = create_redis_client(&config.redis_url)?;
    let (cache, cache_writer) = Cache::new(redis_client).await;

    let engine = match config.scoring_strategy {
        ScoringStrategy::Rules => ScoringEngine::ColorRules(ColorRules::default()),
        ScoringStrategy::Embedding => {
            let encoder = HttpStyleEncoder::new(
                config.encoder_api_key.clone(),
                config.encoder_api_url.clone(),
                config.encoder_model.clone(),
                config.encoder_dimensions,
                config.encoder_max_batch,
                Duration::from_secs(config.encoder_timeout_secs),
            )
            .context("Failed to build style encoder")?;
            let store = RedisEmbeddingStore::new(cache.clone(), config.embedding_cache_ttl_secs);

            let cache = EmbeddingCache::new(Arc::new(store), Arc::new(encoder)).with_input(config.encoder_input);

            ScoringEngine::Embedding(Arc::new(cache))
        }
    };

    let stylist = Stylist::new(Arc::new(PgWardrobeStore::new(pool)), engine, config.shuffle_seed);
    let weather = OpenWeatherProvider::new(
        cache,
        config.weather_api_key.clone(),
        config.weather_api_url.clone(),
        config.weather_latitude,
        config.weather_longitude,
        config.weather_cache_ttl_secs,
    );

    let app = create_router(AppState::new(Arc::new(stylist), Arc::new(weather)));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(%addr, strategy = ?config.scoring_strategy, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cache_writer.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
