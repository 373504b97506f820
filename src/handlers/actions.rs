use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request, State},
    http::header::CONTENT_TYPE,
    Json,
};

use crate::actions::input::RawInput;
use crate::actions::{campaigns, ActionContext, ActionState};
use crate::api::AppState;
use crate::error::ApiError;
use crate::middleware::auth::bearer_token;

/// Extracted action call: the caller's session token (if any) plus the
/// raw input body. Accepts a JSON object or a urlencoded form; an
/// empty body validates as an empty object. Authentication is not
/// checked here - the action wrapper reports it as envelope data.
pub struct ActionRequest {
    pub token: Option<String>,
    pub input: RawInput,
}

#[async_trait]
impl<S: Send + Sync> FromRequest<S> for ActionRequest {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(req.headers());
        let form_encoded = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("application/x-www-form-urlencoded"))
            .unwrap_or(false);

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|_| ApiError::bad_request("Unable to read request body"))?;

        let input = if form_encoded {
            let pairs = url::form_urlencoded::parse(&bytes).into_owned().collect();
            RawInput::Form(pairs)
        } else if bytes.is_empty() {
            RawInput::Structured(serde_json::Value::Object(Default::default()))
        } else {
            let value = serde_json::from_slice(&bytes)
                .map_err(|e| ApiError::invalid_json(format!("Invalid JSON body: {}", e)))?;
            RawInput::Structured(value)
        };

        Ok(ActionRequest { token, input })
    }
}

/// POST /api/campaigns - create a campaign, answers 200 with the
/// action envelope for both outcomes
pub async fn campaign_create_post(
    State(state): State<AppState>,
    ActionRequest { token, input }: ActionRequest,
) -> Json<ActionState> {
    let ctx = ActionContext::new(state.store.clone(), token);
    Json(campaigns::create(&ctx, input).await)
}

/// POST /api/campaigns/status - transition a campaign's status
pub async fn campaign_status_post(
    State(state): State<AppState>,
    ActionRequest { token, input }: ActionRequest,
) -> Json<ActionState> {
    let ctx = ActionContext::new(state.store.clone(), token);
    Json(campaigns::set_status(&ctx, input).await)
}
