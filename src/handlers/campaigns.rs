use axum::{extract::State, Extension, Json};
use serde_json::{json, Value};

use crate::api::AppState;
use crate::error::ApiError;
use crate::middleware::auth::CurrentUser;

/// GET /api/team/campaigns - list every campaign owned by the caller's
/// team. Authentication is handled by the session middleware; any
/// other failure surfaces only a generic 500.
pub async fn team_campaigns_get(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Value>, ApiError> {
    let team = state
        .store
        .team_for_user(user.id)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Campaign list requested by user {} with no team", user.id);
            ApiError::internal_server_error(format!("user {} has no team", user.id))
        })?;

    let campaigns = state.store.campaigns_for_team(team.id).await?;

    Ok(Json(json!({ "campaigns": campaigns })))
}
