use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing::info;

mod app;
mod config;
mod currency;
mod dates;
mod errors;
mod logging;
mod models;
mod routes;
mod services;
mod state;
mod store;
mod validation;

use app::create_app;
use config::AppConfig;
use logging::{init_logging, LoggingConfig};
use services::TituloService;
use state::AppState;
use store::PgTituloStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let logging_config = LoggingConfig::from_env();
    init_logging(&logging_config);

    let config = AppConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!().run(&pool).await?;

    let store = Arc::new(PgTituloStore::new(pool));
    let service = TituloService::new(store, config.initial_year);
    let app = create_app(AppState { service });

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("Tesouro Direto API listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
