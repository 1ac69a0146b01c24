pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod middleware;
pub mod models;
pub mod redis_client;
pub mod repository;
pub mod seed;
pub mod services;
pub mod session;

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::config::{Config, StorageBackend};
use crate::repository::{MemoryRepository, UserRepository};
use crate::services::ReservationService;
use crate::session::{RedisSessionStore, SessionBackend};

// Shared state for every handler
#[derive(Clone)]
pub struct AppState {
    pub reservations: ReservationService,
    pub users: Arc<dyn UserRepository>,
    pub sessions: SessionBackend,
    pub config: Config,
}

impl AppState {
    /// Connects the configured backend, runs migrations and seeds reference data.
    pub async fn new(config: Config) -> anyhow::Result<Arc<Self>> {
        let single_airplane = config.reservation.single_airplane_per_user;

        match config.storage.backend {
            StorageBackend::Postgres => {
                let db = database::Database::new(&config.database.url, config.database.pool_size).await?;
                info!("Database connected");
                db.run_migrations().await?;
                db.seed_fleet().await?;
                if config.app.seed_demo_data {
                    db.seed_demo_users().await?;
                }

                let redis = redis_client::RedisClient::new(&config.redis.url).await?;
                info!("Redis connected");
                let sessions = SessionBackend::Redis(RedisSessionStore::new(redis));

                let db = Arc::new(db);
                Ok(Arc::new(Self {
                    reservations: ReservationService::new(db.clone(), db.clone(), single_airplane),
                    users: db,
                    sessions,
                    config,
                }))
            }
            StorageBackend::Memory => {
                warn!("Using in-memory storage, nothing survives a restart");
                let repo = Arc::new(MemoryRepository::with_default_fleet());
                if config.app.seed_demo_data {
                    for (email, name, password) in seed::DEMO_USERS {
                        repo.add_user(email, name, password, seed::DEMO_HASH_COST).await?;
                    }
                }
                Ok(Self::in_memory(repo, config))
            }
        }
    }

    /// State over an in-process store, sessions kept in memory too.
    pub fn in_memory(repo: Arc<MemoryRepository>, config: Config) -> Arc<Self> {
        Arc::new(Self {
            reservations: ReservationService::new(
                repo.clone(),
                repo.clone(),
                config.reservation.single_airplane_per_user,
            ),
            users: repo,
            sessions: SessionBackend::memory(),
            config,
        })
    }
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);
    match origin.parse::<HeaderValue>() {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            warn!("Invalid CORS origin {:?}, cross-origin requests disabled", origin);
            layer
        }
    }
}

/// Full application router.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Seat Booking API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", controllers::routes())
        .with_state(state.clone())
        .layer(session::layer(state.sessions.clone(), &state.config.session))
        .layer(cors_layer(&state.config.app.cors_origin))
        .layer(TraceLayer::new_for_http())
}
