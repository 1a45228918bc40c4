mod app;
mod auth;
mod config;
mod db;
mod error;
mod photos;
mod state;
mod storage;
mod users;

use crate::{config::AppConfig, db::PgStore, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "greenish=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    let store = PgStore::connect(&config.database_url).await?;

    sqlx::migrate!("./migrations").run(store.pool()).await?;

    let state = AppState::init(&config, store).await?;
    app::serve(app::build_app(state)).await
}
