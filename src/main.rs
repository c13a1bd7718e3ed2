//! Parashop Catalog - back-office catalog service

use std::sync::Arc;

use anyhow::Result;
use parashop_catalog::{api::{build_router, AppState}, publisher::EventPublisher, store::PgStore, Config};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let config = Config::from_env()?;
    let db = PgPoolOptions::new().max_connections(config.database_max_connections).connect(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&db).await?;
    let publisher = EventPublisher::connect(config.nats_url.as_deref()).await;

    let state = AppState::new(Arc::new(PgStore::new(db)), publisher).with_import_limit(config.import_max_bytes);
    let app = build_router(state);

    tracing::info!("Parashop Catalog listening on {}", config.bind_addr());
    axum::serve(tokio::net::TcpListener::bind(config.bind_addr()).await?, app).await?;
    Ok(())
}
