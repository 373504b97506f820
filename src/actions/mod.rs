//! Validated action layer.
//!
//! Every domain action runs through [`run_validated_action`], which
//! gives it a uniform contract: resolve the caller's session, validate
//! the input against its typed schema, execute, and normalize both the
//! result and every failure into an [`ActionState`] envelope. Failures
//! are data, never raised faults - the HTTP layer answers 200 with the
//! envelope for both outcomes.

pub mod campaigns;
pub mod input;

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::database::models::User;
use crate::database::store::{Store, StoreError};
use input::{join_violations, RawInput, ValidatedInput};

pub const NOT_AUTHENTICATED: &str = "Not authenticated";
pub const UNEXPECTED_ERROR: &str = "Unexpected error";

/// Expected, user-facing failures a domain action can report. Their
/// messages go to the caller verbatim; store errors do not.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("User does not belong to a team")]
    NoTeam,

    #[error("Campaign not found")]
    CampaignNotFound,

    #[error("Unauthorized")]
    CrossTeam,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Uniform result envelope: `{ success, data?, error? }`. This is the
/// only contract clients depend on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionState {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionState {
    pub fn success<T: Serialize>(data: T) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => Self {
                success: true,
                data: Some(value),
                error: None,
            },
            Err(e) => {
                tracing::error!("Failed to serialize action result: {}", e);
                Self::failure(UNEXPECTED_ERROR)
            }
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Explicit execution context for actions: the store and the caller's
/// session token, passed in rather than read from ambient state.
#[derive(Clone)]
pub struct ActionContext {
    pub store: Arc<dyn Store>,
    pub session_token: Option<String>,
}

impl ActionContext {
    pub fn new(store: Arc<dyn Store>, session_token: Option<String>) -> Self {
        Self {
            store,
            session_token,
        }
    }

    async fn current_user(&self) -> Result<Option<User>, StoreError> {
        match &self.session_token {
            Some(token) => self.store.user_for_session(token).await,
            None => Ok(None),
        }
    }
}

/// Run a domain action under the uniform contract.
///
/// Steps, in order: session resolution (no user -> "Not
/// authenticated"), input normalization and validation (violations are
/// joined into one message, in field order), execution. Domain-rule
/// failures surface their own message; store failures are logged and
/// surface only a generic one.
pub async fn run_validated_action<I, T, F, Fut>(
    ctx: &ActionContext,
    input: RawInput,
    action: F,
) -> ActionState
where
    I: ValidatedInput,
    T: Serialize,
    F: FnOnce(I, i64) -> Fut,
    Fut: Future<Output = Result<T, ActionError>>,
{
    let user = match ctx.current_user().await {
        Ok(Some(user)) => user,
        Ok(None) => return ActionState::failure(NOT_AUTHENTICATED),
        Err(e) => {
            tracing::error!("Session resolution failed: {}", e);
            return ActionState::failure(UNEXPECTED_ERROR);
        }
    };

    let value = input.into_value();
    let validated = match I::validate(&value) {
        Ok(validated) => validated,
        Err(violations) => return ActionState::failure(join_violations(&violations)),
    };

    match action(validated, user.id).await {
        Ok(data) => ActionState::success(data),
        Err(ActionError::Store(e)) => {
            tracing::error!("Action failed: {}", e);
            ActionState::failure(UNEXPECTED_ERROR)
        }
        Err(domain) => ActionState::failure(domain.to_string()),
    }
}
