//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::Config;
use crate::db::{DiscoveryEngine, EventDiscoveryStore};
use crate::services::{CityAutocompleteService, DiscoveryService};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db_pool: PgPool,
    pub discovery_service: Arc<DiscoveryService>,
    pub city_service: Arc<CityAutocompleteService>,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .min_connections(config.database.pool_min_size)
            .max_connections(config.database.pool_max_size)
            .acquire_timeout(Duration::from_secs(config.database.pool_timeout_seconds))
            .connect(&config.database.url)
            .await
            .context("failed to connect to the database")?;

        if config.database.run_migrations {
            sqlx::migrate!("./migrations")
                .run(&db_pool)
                .await
                .context("failed to run database migrations")?;
            tracing::info!("Database migrations applied");
        }

        let store: Arc<dyn EventDiscoveryStore> = Arc::new(DiscoveryEngine::new(db_pool.clone()));
        let discovery_service = Arc::new(DiscoveryService::new(
            store.clone(),
            config.discovery.clone(),
        ));
        let city_service = Arc::new(CityAutocompleteService::new(
            store,
            config.discovery.clone(),
        ));

        Ok(Self {
            config: Arc::new(config),
            db_pool,
            discovery_service,
            city_service,
        })
    }
}
