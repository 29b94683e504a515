pub mod cache;
pub mod catalog;
pub mod config;
pub mod controllers;
pub mod error;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod services;

use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::{
    cache::CacheService,
    catalog::Catalog,
    config::Config,
    error::AppError,
    models::ObserverLocation,
    repository::{FileVenueRepository, MemoryVenueRepository, PgVenueRepository, VenueRepository},
    services::{
        auth::AuthService,
        geolocation::{default_observer, HttpLocationProvider, LocationProvider},
    },
};

// Shared state for every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub catalog: Arc<Catalog>,
    pub venues: Arc<dyn VenueRepository>,
    pub cache: CacheService,
    pub auth: AuthService,
    pub locator: Arc<dyn LocationProvider>,
    pub default_observer: ObserverLocation,
}

impl AppState {
    /// Connects the configured backends. Postgres wins over the JSON file,
    /// which wins over the in-process store; Redis is optional.
    pub async fn new(config: Config) -> anyhow::Result<Arc<Self>> {
        let catalog = Catalog::builtin().context("built-in venue catalog is invalid")?;

        let venues: Arc<dyn VenueRepository> =
            match (&config.database.url, &config.database.venue_store_path) {
                (Some(url), _) => Arc::new(
                    PgVenueRepository::connect(url, config.database.pool_size)
                        .await
                        .context("failed to open venue database")?,
                ),
                (None, Some(path)) => {
                    info!(path = %path, "storing admin venues in JSON file");
                    Arc::new(FileVenueRepository::new(path))
                }
                (None, None) => {
                    warn!("no DATABASE_URL or VENUE_STORE_PATH; admin venues live in memory only");
                    Arc::new(MemoryVenueRepository::new())
                }
            };

        let cache = match &config.redis.url {
            Some(url) => {
                let cache = CacheService::connect_redis(url)
                    .await
                    .context("failed to connect to Redis")?;
                info!("Redis connected");
                cache
            }
            None => CacheService::in_memory(),
        };

        let auth = AuthService::from_config(&config.jwt, &config.admin)?;
        let locator = Arc::new(HttpLocationProvider::from_config(
            &config.geolocation,
            &config.circuit_breaker,
        )?);

        Ok(Arc::new(Self {
            default_observer: default_observer(&config.geolocation),
            config,
            catalog: Arc::new(catalog),
            venues,
            cache,
            auth,
            locator,
        }))
    }
}

/// The full HTTP surface, ready to serve.
pub fn router(state: Arc<AppState>) -> Router {
    let enable_admin = state.config.features.enable_admin;

    Router::new()
        .route("/", get(|| async { "Futsal Finder API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", controllers::routes(enable_admin))
        .fallback(|| async { AppError::not_found("page") })
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
