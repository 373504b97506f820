use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::api::AppState;
use crate::database::models::User;
use crate::error::ApiError;

/// Authenticated user context injected into request extensions
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: i64,
    pub name: String,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
        }
    }
}

/// Middleware that resolves the bearer session token to a user and
/// injects it into the request. Missing, malformed, or unknown tokens
/// all answer 401 without reaching the handler.
pub async fn session_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers()).ok_or(ApiError::Unauthorized)?;

    let user = state
        .store
        .user_for_session(&token)
        .await
        .map_err(|e| {
            tracing::error!("Session lookup failed: {}", e);
            ApiError::internal_server_error(e.to_string())
        })?
        .ok_or(ApiError::Unauthorized)?;

    tracing::debug!("Session resolved: user {} ({})", user.id, user.name);
    request.extensions_mut().insert(CurrentUser::from(user));

    Ok(next.run(request).await)
}

/// Extract the bearer token from the Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))?;

    let auth_str = auth_header.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
