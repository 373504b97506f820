use std::sync::Arc;

use axum::{
    extract::State,
    middleware::from_fn_with_state,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::database::store::Store;
use crate::handlers;
use crate::middleware::auth::session_auth_middleware;

/// Shared application state: the store behind every endpoint
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

/// Assemble the application router
pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Campaign actions (auth reported as envelope data)
        .merge(action_routes())
        // Session-guarded reads
        .merge(read_routes(state.clone()))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn action_routes() -> Router<AppState> {
    Router::new()
        .route("/api/campaigns", post(handlers::actions::campaign_create_post))
        .route(
            "/api/campaigns/status",
            post(handlers::actions::campaign_status_post),
        )
}

fn read_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/team/campaigns",
            get(handlers::campaigns::team_campaigns_get),
        )
        .route_layer(from_fn_with_state(state, session_auth_middleware))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Campaign API",
            "version": version,
            "description": "Team-scoped campaign management API",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "campaigns": "/api/team/campaigns (session)",
                "actions": "/api/campaigns, /api/campaigns/status (session, envelope)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "store": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "store unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "store_error": e.to_string()
                }
            })),
        ),
    }
}
