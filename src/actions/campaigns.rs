use serde_json::Value;

use crate::actions::input::{FieldViolation, RawInput, ValidatedInput};
use crate::actions::{run_validated_action, ActionContext, ActionError, ActionState};
use crate::database::models::{Campaign, CampaignStatus, NewCampaign};
use crate::database::store::Store;

const STATUS_EXPECTED: &str = "Expected one of 'draft', 'active', 'completed'";

fn parse_status(path: &str, value: &Value) -> Result<CampaignStatus, FieldViolation> {
    match value.as_str() {
        Some(s) => CampaignStatus::parse(s).ok_or_else(|| {
            FieldViolation::new(
                path,
                format!("Invalid status '{}', expected one of 'draft', 'active', 'completed'", s),
            )
        }),
        None => Err(FieldViolation::new(path, STATUS_EXPECTED)),
    }
}

/// Input for the create action: non-empty name, optional status
/// defaulting to draft.
#[derive(Debug, Clone)]
pub struct CreateCampaignInput {
    pub name: String,
    pub status: CampaignStatus,
}

impl ValidatedInput for CreateCampaignInput {
    fn validate(value: &Value) -> Result<Self, Vec<FieldViolation>> {
        let mut violations = Vec::new();

        let name = match value.get("name") {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::String(_)) | Some(Value::Null) | None => {
                violations.push(FieldViolation::new("name", "Name is required"));
                None
            }
            Some(_) => {
                violations.push(FieldViolation::new("name", "Expected a string"));
                None
            }
        };

        let status = match value.get("status") {
            Some(Value::Null) | None => Some(CampaignStatus::default()),
            Some(raw) => match parse_status("status", raw) {
                Ok(status) => Some(status),
                Err(violation) => {
                    violations.push(violation);
                    None
                }
            },
        };

        match (name, status) {
            (Some(name), Some(status)) if violations.is_empty() => {
                Ok(CreateCampaignInput { name, status })
            }
            _ => Err(violations),
        }
    }
}

/// Input for the status update action: campaign id plus the new status.
#[derive(Debug, Clone)]
pub struct UpdateCampaignStatusInput {
    pub campaign_id: i64,
    pub status: CampaignStatus,
}

impl ValidatedInput for UpdateCampaignStatusInput {
    fn validate(value: &Value) -> Result<Self, Vec<FieldViolation>> {
        let mut violations = Vec::new();

        // Form encodings deliver numbers as strings, so accept both.
        let campaign_id = match value.get("campaignId") {
            Some(Value::Number(n)) => match n.as_i64() {
                Some(id) => Some(id),
                None => {
                    violations.push(FieldViolation::new("campaignId", "Expected an integer"));
                    None
                }
            },
            Some(Value::String(s)) => match s.parse::<i64>() {
                Ok(id) => Some(id),
                Err(_) => {
                    violations.push(FieldViolation::new("campaignId", "Expected an integer"));
                    None
                }
            },
            Some(Value::Null) | None => {
                violations.push(FieldViolation::new("campaignId", "Campaign id is required"));
                None
            }
            Some(_) => {
                violations.push(FieldViolation::new("campaignId", "Expected an integer"));
                None
            }
        };

        let status = match value.get("status") {
            Some(Value::Null) | None => {
                violations.push(FieldViolation::new("status", "Status is required"));
                None
            }
            Some(raw) => match parse_status("status", raw) {
                Ok(status) => Some(status),
                Err(violation) => {
                    violations.push(violation);
                    None
                }
            },
        };

        match (campaign_id, status) {
            (Some(campaign_id), Some(status)) if violations.is_empty() => {
                Ok(UpdateCampaignStatusInput {
                    campaign_id,
                    status,
                })
            }
            _ => Err(violations),
        }
    }
}

/// Create a campaign for the acting user's team. Fails before any
/// insert when the user has no team.
pub async fn create_campaign(
    store: &dyn Store,
    input: CreateCampaignInput,
    user_id: i64,
) -> Result<Campaign, ActionError> {
    let team = store
        .team_for_user(user_id)
        .await?
        .ok_or(ActionError::NoTeam)?;

    let campaign = store
        .insert_campaign(NewCampaign {
            name: input.name,
            status: input.status,
            team_id: team.id,
        })
        .await?;

    Ok(campaign)
}

/// Transition a campaign's status. Preconditions checked in order:
/// team resolved, campaign exists, campaign belongs to the team. A
/// campaign owned by another team is reported as "Unauthorized", not
/// "not found".
pub async fn update_campaign_status(
    store: &dyn Store,
    input: UpdateCampaignStatusInput,
    user_id: i64,
) -> Result<Campaign, ActionError> {
    let team = store
        .team_for_user(user_id)
        .await?
        .ok_or(ActionError::NoTeam)?;

    let campaign = store
        .campaign_by_id(input.campaign_id)
        .await?
        .ok_or(ActionError::CampaignNotFound)?;

    if campaign.team_id != team.id {
        return Err(ActionError::CrossTeam);
    }

    let updated = store
        .update_campaign_status(input.campaign_id, input.status)
        .await?;

    Ok(updated)
}

/// Envelope-level entry point for campaign creation
pub async fn create(ctx: &ActionContext, input: RawInput) -> ActionState {
    let store = ctx.store.clone();
    run_validated_action(ctx, input, move |data, user_id| async move {
        create_campaign(store.as_ref(), data, user_id).await
    })
    .await
}

/// Envelope-level entry point for status updates
pub async fn set_status(ctx: &ActionContext, input: RawInput) -> ActionState {
    let store = ctx.store.clone();
    run_validated_action(ctx, input, move |data, user_id| async move {
        update_campaign_status(store.as_ref(), data, user_id).await
    })
    .await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::actions::NOT_AUTHENTICATED;
    use crate::database::memory::MemoryStore;
    use crate::database::models::{Team, User};

    async fn team_user(store: &MemoryStore, team_name: &str, user_name: &str) -> (User, Team, String) {
        let team = store.seed_team(team_name).await;
        let user = store
            .seed_user(user_name, &format!("{}@example.com", user_name))
            .await;
        store.join_team(user.id, team.id).await;
        let token = store.issue_session(user.id).await;
        (user, team, token)
    }

    fn ctx(store: &Arc<MemoryStore>, token: Option<&str>) -> ActionContext {
        ActionContext::new(store.clone(), token.map(String::from))
    }

    fn campaign_from(state: &ActionState) -> Campaign {
        serde_json::from_value(state.data.clone().expect("success data")).expect("campaign")
    }

    #[tokio::test]
    async fn create_defaults_to_draft_and_owning_team() {
        let store = Arc::new(MemoryStore::new());
        let (_, team, token) = team_user(&store, "T1", "u1").await;

        let state = create(
            &ctx(&store, Some(&token)),
            RawInput::structured(json!({ "name": "Spring Sale" })),
        )
        .await;

        assert!(state.success, "unexpected failure: {:?}", state.error);
        let campaign = campaign_from(&state);
        assert_eq!(campaign.name, "Spring Sale");
        assert_eq!(campaign.status, CampaignStatus::Draft);
        assert_eq!(campaign.team_id, team.id);
        assert_eq!(campaign.created_at, campaign.updated_at);
    }

    #[tokio::test]
    async fn create_honors_supplied_status() {
        let store = Arc::new(MemoryStore::new());
        let (_, _, token) = team_user(&store, "T1", "u1").await;

        let state = create(
            &ctx(&store, Some(&token)),
            RawInput::structured(json!({ "name": "Launch", "status": "active" })),
        )
        .await;

        assert!(state.success);
        assert_eq!(campaign_from(&state).status, CampaignStatus::Active);
    }

    #[tokio::test]
    async fn create_accepts_form_encoded_input() {
        let store = Arc::new(MemoryStore::new());
        let (_, team, token) = team_user(&store, "T1", "u1").await;

        let state = create(
            &ctx(&store, Some(&token)),
            RawInput::form(vec![("name", "Form Campaign"), ("status", "completed")]),
        )
        .await;

        assert!(state.success);
        let campaign = campaign_from(&state);
        assert_eq!(campaign.name, "Form Campaign");
        assert_eq!(campaign.status, CampaignStatus::Completed);
        assert_eq!(campaign.team_id, team.id);
    }

    #[tokio::test]
    async fn create_requires_authentication() {
        let store = Arc::new(MemoryStore::new());

        let missing = create(
            &ctx(&store, None),
            RawInput::structured(json!({ "name": "x" })),
        )
        .await;
        assert!(!missing.success);
        assert_eq!(missing.error.as_deref(), Some(NOT_AUTHENTICATED));

        let stale = create(
            &ctx(&store, Some("expired-token")),
            RawInput::structured(json!({ "name": "x" })),
        )
        .await;
        assert_eq!(stale.error.as_deref(), Some(NOT_AUTHENTICATED));
    }

    #[tokio::test]
    async fn create_fails_without_team_and_inserts_nothing() {
        let store = Arc::new(MemoryStore::new());
        let user = store.seed_user("loner", "loner@example.com").await;
        let token = store.issue_session(user.id).await;

        let state = create(
            &ctx(&store, Some(&token)),
            RawInput::structured(json!({ "name": "Orphan" })),
        )
        .await;

        assert!(!state.success);
        assert_eq!(
            state.error.as_deref(),
            Some("User does not belong to a team")
        );
        assert!(store.campaign_by_id(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_reports_field_violations_joined() {
        let store = Arc::new(MemoryStore::new());
        let (_, _, token) = team_user(&store, "T1", "u1").await;

        let state = create(
            &ctx(&store, Some(&token)),
            RawInput::structured(json!({ "name": "", "status": "archived" })),
        )
        .await;

        assert!(!state.success);
        assert_eq!(
            state.error.as_deref(),
            Some(
                "name: Name is required, status: Invalid status 'archived', \
                 expected one of 'draft', 'active', 'completed'"
            )
        );
        assert!(store.campaign_by_id(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_rejects_unknown_campaign() {
        let store = Arc::new(MemoryStore::new());
        let (_, _, token) = team_user(&store, "T1", "u1").await;

        let state = set_status(
            &ctx(&store, Some(&token)),
            RawInput::structured(json!({ "campaignId": 999, "status": "active" })),
        )
        .await;

        assert!(!state.success);
        assert_eq!(state.error.as_deref(), Some("Campaign not found"));
    }

    #[tokio::test]
    async fn update_rejects_cross_team_campaign_without_touching_it() {
        let store = Arc::new(MemoryStore::new());
        let (_, _, t1_token) = team_user(&store, "T1", "u1").await;
        let (_, _, t2_token) = team_user(&store, "T2", "u2").await;

        let created = create(
            &ctx(&store, Some(&t1_token)),
            RawInput::structured(json!({ "name": "Spring Sale" })),
        )
        .await;
        let campaign = campaign_from(&created);

        let state = set_status(
            &ctx(&store, Some(&t2_token)),
            RawInput::structured(json!({ "campaignId": campaign.id, "status": "active" })),
        )
        .await;

        assert!(!state.success);
        assert_eq!(state.error.as_deref(), Some("Unauthorized"));

        let stored = store.campaign_by_id(campaign.id).await.unwrap().unwrap();
        assert_eq!(stored.status, CampaignStatus::Draft);
    }

    #[tokio::test]
    async fn update_transitions_status() {
        let store = Arc::new(MemoryStore::new());
        let (_, _, token) = team_user(&store, "T1", "u1").await;
        let context = ctx(&store, Some(&token));

        let created = create(
            &context,
            RawInput::structured(json!({ "name": "Spring Sale" })),
        )
        .await;
        let campaign = campaign_from(&created);

        let state = set_status(
            &context,
            RawInput::structured(json!({ "campaignId": campaign.id, "status": "active" })),
        )
        .await;

        assert!(state.success);
        let updated = campaign_from(&state);
        assert_eq!(updated.status, CampaignStatus::Active);
        assert_eq!(updated.id, campaign.id);
    }

    #[tokio::test]
    async fn update_to_current_status_touches_only_updated_at() {
        let store = Arc::new(MemoryStore::new());
        let (_, _, token) = team_user(&store, "T1", "u1").await;
        let context = ctx(&store, Some(&token));

        let created = create(
            &context,
            RawInput::structured(json!({ "name": "Steady", "status": "active" })),
        )
        .await;
        let before = campaign_from(&created);

        let state = set_status(
            &context,
            RawInput::structured(json!({ "campaignId": before.id, "status": "active" })),
        )
        .await;

        assert!(state.success);
        let after = campaign_from(&state);
        assert_eq!(after.status, before.status);
        assert_eq!(after.name, before.name);
        assert_eq!(after.team_id, before.team_id);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at >= before.updated_at);
    }

    #[tokio::test]
    async fn update_validates_status_before_domain_logic() {
        let store = Arc::new(MemoryStore::new());
        let (_, _, token) = team_user(&store, "T1", "u1").await;
        let context = ctx(&store, Some(&token));

        let created = create(
            &context,
            RawInput::structured(json!({ "name": "Spring Sale" })),
        )
        .await;
        let campaign = campaign_from(&created);

        let state = set_status(
            &context,
            RawInput::structured(json!({ "campaignId": campaign.id, "status": "paused" })),
        )
        .await;

        assert!(!state.success);
        assert_eq!(
            state.error.as_deref(),
            Some("status: Invalid status 'paused', expected one of 'draft', 'active', 'completed'")
        );
        let stored = store.campaign_by_id(campaign.id).await.unwrap().unwrap();
        assert_eq!(stored.status, CampaignStatus::Draft);
    }

    #[tokio::test]
    async fn update_accepts_form_encoded_campaign_id() {
        let store = Arc::new(MemoryStore::new());
        let (_, _, token) = team_user(&store, "T1", "u1").await;
        let context = ctx(&store, Some(&token));

        let created = create(
            &context,
            RawInput::structured(json!({ "name": "Spring Sale" })),
        )
        .await;
        let campaign = campaign_from(&created);

        let state = set_status(
            &context,
            RawInput::form(vec![
                ("campaignId", campaign.id.to_string()),
                ("status", "completed".to_string()),
            ]),
        )
        .await;

        assert!(state.success);
        assert_eq!(campaign_from(&state).status, CampaignStatus::Completed);
    }

    #[tokio::test]
    async fn update_reports_missing_fields_in_declaration_order() {
        let store = Arc::new(MemoryStore::new());
        let (_, _, token) = team_user(&store, "T1", "u1").await;

        let state = set_status(&ctx(&store, Some(&token)), RawInput::structured(json!({}))).await;

        assert!(!state.success);
        assert_eq!(
            state.error.as_deref(),
            Some("campaignId: Campaign id is required, status: Status is required")
        );
    }
}
