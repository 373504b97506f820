use std::sync::Arc;

use anyhow::Context;
use clap::Subcommand;

use crate::api::{app, AppState};
use crate::cli::config::CliConfig;
use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::database::memory::MemoryStore;
use crate::database::postgres::PgStore;
use crate::database::store::Store;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Run the API server")]
    Start {
        #[arg(long, help = "Port to listen on (default: CAMPAIGN_API_PORT, PORT, or 3000)")]
        port: Option<u16>,
        #[arg(long, help = "Serve from an in-memory store seeded with demo fixtures")]
        memory: bool,
    },

    #[command(about = "Check server health from /health")]
    Health {
        #[arg(long, help = "Server base URL")]
        url: Option<String>,
    },

    #[command(about = "Show server information from the root endpoint")]
    Info {
        #[arg(long, help = "Server base URL")]
        url: Option<String>,
    },
}

pub async fn handle(cmd: ServerCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Start { port, memory } => start(port, memory).await,
        ServerCommands::Health { url } => probe(url, "/health", output_format).await,
        ServerCommands::Info { url } => probe(url, "/", output_format).await,
    }
}

async fn start(port: Option<u16>, memory: bool) -> anyhow::Result<()> {
    let store: Arc<dyn Store> = if memory {
        Arc::new(seeded_memory_store().await)
    } else {
        Arc::new(PgStore::lazy())
    };

    let port = port
        .or_else(|| {
            std::env::var("CAMPAIGN_API_PORT")
                .ok()
                .or_else(|| std::env::var("PORT").ok())
                .and_then(|s| s.parse::<u16>().ok())
        })
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    println!("🚀 Campaign API server listening on http://{}", bind_addr);

    axum::serve(listener, app(AppState::new(store)))
        .await
        .context("server")?;
    Ok(())
}

/// Demo fixtures: one team, one member, one ready-to-use session
async fn seeded_memory_store() -> MemoryStore {
    let store = MemoryStore::new();
    let team = store.seed_team("Demo Team").await;
    let user = store.seed_user("demo", "demo@example.com").await;
    store.join_team(user.id, team.id).await;
    let token = store.issue_session(user.id).await;

    println!("In-memory store seeded; demo session token: {}", token);
    store
}

async fn probe(url: Option<String>, path: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = CliConfig::from_env();
    let base_url = config.resolve_url(url);
    let target = format!("{}{}", base_url, path);

    let response = reqwest::get(&target)
        .await
        .with_context(|| format!("failed to reach {}", target))?;

    let status = response.status();
    let body: serde_json::Value = response.json().await.unwrap_or_default();

    if status.is_success() {
        output_success(&output_format, &format!("{} -> {}", target, status), Some(body))
    } else {
        output_error(
            &output_format,
            &format!("{} -> {}: {}", target, status, body),
        )
    }
}
