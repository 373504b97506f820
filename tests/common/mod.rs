use std::sync::Arc;

use anyhow::{Context, Result};

use campaign_api::api::{app, AppState};
use campaign_api::database::memory::MemoryStore;

/// In-process test server over a seeded memory store
pub struct TestServer {
    pub base_url: String,
    pub store: Arc<MemoryStore>,
}

pub async fn spawn_server() -> Result<TestServer> {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(store.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind test listener")?;
    let addr = listener.local_addr().context("listener address")?;

    tokio::spawn(async move {
        axum::serve(listener, app(state)).await.expect("test server");
    });

    Ok(TestServer {
        base_url: format!("http://{}", addr),
        store,
    })
}

pub struct TeamFixture {
    pub team_id: i64,
    pub user_id: i64,
    pub token: String,
}

/// Seed a team with one member and an active session
pub async fn seed_team_user(store: &MemoryStore, team: &str, user: &str) -> TeamFixture {
    let team = store.seed_team(team).await;
    let seeded = store
        .seed_user(user, &format!("{}@example.com", user))
        .await;
    store.join_team(seeded.id, team.id).await;
    let token = store.issue_session(seeded.id).await;

    TeamFixture {
        team_id: team.id,
        user_id: seeded.id,
        token,
    }
}
