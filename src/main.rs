use std::sync::Arc;

use campaign_api::api::{app, AppState};
use campaign_api::database::postgres::PgStore;
use campaign_api::database::store::Store;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, CAMPAIGN_DB, etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = campaign_api::config::config();

    tracing_subscriber::fmt::init();
    tracing::info!("Starting Campaign API in {:?} mode", config.environment);

    // Pool creation is lazy, so startup does not require the database
    let store: Arc<dyn Store> = Arc::new(PgStore::lazy());

    // Allow tests or deployments to override port via env
    let port = std::env::var("CAMPAIGN_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 Campaign API server listening on http://{}", bind_addr);

    axum::serve(listener, app(AppState::new(store)))
        .await
        .expect("server");
}
