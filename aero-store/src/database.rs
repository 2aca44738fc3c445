use aero_core::DataSource;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use tracing::info;

use crate::app_config::DatabaseConfig;

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(connection_string: &str, settings: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(settings.acquire_timeout_seconds))
            .connect(connection_string)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../migrations").run(&self.pool).await
    }
}

/// Connection pools for the two catalog databases. Staging doubles as the
/// main store for users, whitelist entries and orders.
#[derive(Clone)]
pub struct DataSources {
    pub staging: DbClient,
    pub production: DbClient,
}

impl DataSources {
    pub async fn connect(settings: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        info!("Connecting to staging database...");
        let staging = DbClient::new(&settings.staging_url, settings).await?;
        info!("Connecting to production database...");
        let production = DbClient::new(&settings.production_url, settings).await?;
        Ok(Self { staging, production })
    }

    pub fn get(&self, source: DataSource) -> &DbClient {
        match source {
            DataSource::Staging => &self.staging,
            DataSource::Production => &self.production,
        }
    }

    pub fn main(&self) -> &DbClient {
        &self.staging
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        for source in DataSource::ALL {
            info!(%source, "Running database migrations...");
            self.get(source).migrate().await?;
        }
        info!("Migrations completed successfully.");
        Ok(())
    }
}
