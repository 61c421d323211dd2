use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod config;
pub mod db;
pub mod memory;
pub mod repository;
pub mod service;

use crate::api::AppState;
use crate::config::{Config, StoreBackend};
use crate::memory::{MemoryBlobStore, MemoryStore, Seed};
use crate::repository::blob::{BlobStore, GitBlobStore};
use crate::repository::postgres::PgStore;
use crate::repository::store::{
    AgentConfigs, AgentMappings, Catalog, WorkspaceQueries, WorkspaceStore,
};
use crate::service::create_service::{CreateDependencies, CreateSettings, RandomNameGenerator};
use crate::service::devfile_validator::RestrictionsEnforcer;
use crate::service::feature_flags::StaticFeatureFlags;
use crate::service::usage_events::TracingUsageEvents;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "devspace_orchestrator=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Devspace Orchestrator...");

    let config = Config::from_env().expect("Failed to load configuration");
    config.validate().expect("Invalid configuration");

    let settings = CreateSettings {
        default_devfile: config
            .default_devfile()
            .expect("Failed to load default devfile"),
        instance_url: config.instance_url.clone(),
        marketplace: Default::default(),
    };
    let feature_flags =
        StaticFeatureFlags::parse(&config.feature_flags).expect("Invalid DEVSPACE_FEATURE_FLAGS");

    let state = match config.store {
        StoreBackend::Postgres => {
            tracing::info!("Connecting to database...");

            // Create database connection pool
            let pool = db::create_pool(&config.database_url)
                .await
                .expect("Failed to create database pool");

            tracing::info!("Database connection pool created");

            // Run migrations
            db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");

            app_state(
                Arc::new(PgStore::new(pool)),
                Arc::new(GitBlobStore::new(config.repositories_root.clone())),
                settings,
                feature_flags,
            )
        }
        StoreBackend::Memory => {
            let seed = match &config.memory_seed {
                Some(path) => Seed::from_file(path).expect("Failed to load memory seed"),
                None => Seed::default(),
            };
            tracing::warn!("Using in-memory store; records are lost on restart");

            app_state(
                Arc::new(MemoryStore::from_seed(&seed)),
                Arc::new(MemoryBlobStore::from_seed(&seed)),
                settings,
                feature_flags,
            )
        }
    };

    // Build router with all API endpoints
    let app = api::create_router(state);

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}

fn app_state<S>(
    store: Arc<S>,
    blobs: Arc<dyn BlobStore>,
    settings: CreateSettings,
    feature_flags: StaticFeatureFlags,
) -> AppState
where
    S: Catalog + AgentMappings + AgentConfigs + WorkspaceQueries + WorkspaceStore + 'static,
{
    let pipeline = CreateDependencies {
        mappings: store.clone(),
        agent_configs: store.clone(),
        blobs,
        validator: Arc::new(RestrictionsEnforcer),
        feature_flags: Arc::new(feature_flags),
        usage_events: Arc::new(TracingUsageEvents),
        store: store.clone(),
        names: Arc::new(RandomNameGenerator),
        settings,
    };

    AppState {
        pipeline,
        catalog: store.clone(),
        queries: store.clone(),
        agent_configs: store,
    }
}
