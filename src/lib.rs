pub mod cache;
pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod models;
pub mod redis_client;
pub mod services;
pub mod store;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use store::{CinemaStore, MemoryStore, PgStore};

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CinemaStore>,
    pub cache: Option<cache::CacheService>,
    pub config: config::Config,
}

impl AppState {
    /// Postgres при заданном DATABASE_URL, иначе in-memory хранилище.
    /// Redis подключается только при заданном REDIS_URL.
    pub async fn new(config: config::Config) -> anyhow::Result<Arc<Self>> {
        let store: Arc<dyn CinemaStore> = match &config.database.url {
            Some(url) => {
                let db = database::Database::connect(url, &config.database).await?;
                db.migrate().await?;
                Arc::new(PgStore::new(&db))
            }
            None => {
                warn!("DATABASE_URL is not set, records are kept in memory only");
                Arc::new(MemoryStore::new())
            }
        };

        let cache = match &config.redis.url {
            Some(url) => {
                let redis = redis_client::RedisClient::new(url).await?;
                info!("Redis connected");
                Some(cache::CacheService::new(Arc::new(redis), config.redis.auth_cache_ttl_seconds))
            }
            None => None,
        };

        Ok(Arc::new(Self { store, cache, config }))
    }

    pub fn in_memory(config: config::Config) -> Arc<Self> {
        Arc::new(Self {
            store: Arc::new(MemoryStore::new()),
            cache: None,
            config,
        })
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Cinema API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", controllers::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
