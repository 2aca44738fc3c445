use aero_api::{app, AppState, AuthConfig, Repositories};
use aero_core::repository::{AirlineRepository, AirportRepository, ScheduleRepository};
use aero_core::Sources;
use aero_search::SearchSettings;
use aero_store::app_config::Config;
use aero_store::{
    DataSources, StoreAirlineRepository, StoreAirportRepository, StoreOrderRepository,
    StoreScheduleRepository, StoreUserRepository, StoreWhitelistRepository,
};
use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn repositories(db: &DataSources) -> Repositories {
    let main = db.main().pool.clone();
    Repositories {
        airlines: Sources::<dyn AirlineRepository>::new(
            Arc::new(StoreAirlineRepository::new(db.staging.pool.clone())),
            Arc::new(StoreAirlineRepository::new(db.production.pool.clone())),
        ),
        airports: Sources::<dyn AirportRepository>::new(
            Arc::new(StoreAirportRepository::new(db.staging.pool.clone())),
            Arc::new(StoreAirportRepository::new(db.production.pool.clone())),
        ),
        schedules: Sources::<dyn ScheduleRepository>::new(
            Arc::new(StoreScheduleRepository::new(db.staging.pool.clone())),
            Arc::new(StoreScheduleRepository::new(db.production.pool.clone())),
        ),
        whitelist: Arc::new(StoreWhitelistRepository::new(main.clone())),
        users: Arc::new(StoreUserRepository::new(main.clone())),
        orders: Arc::new(StoreOrderRepository::new(main)),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aero_api=debug,aero_store=info,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("failed to load config")?;
    tracing::info!("Starting Aero API on port {}", config.server.port);

    let db = DataSources::connect(&config.database)
        .await
        .context("failed to connect to databases")?;
    db.migrate().await.context("failed to run migrations")?;

    let state = AppState::new(
        AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
        repositories(&db),
        SearchSettings {
            max_concurrency: config.search.max_concurrent_queries,
            per_airline_limit: config.search.per_airline_limit,
        },
    );

    if let Some(admin) = &config.admin {
        state
            .accounts
            .ensure_admin(&admin.email, &admin.password, &admin.name)
            .await
            .context("failed to ensure admin account")?;
    }

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
