mod common;

use anyhow::Result;
use campaign_api::database::models::{CampaignStatus, NewCampaign};
use campaign_api::database::store::Store;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn unauthenticated_read_is_401_unauthorized() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/team/campaigns", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert_eq!(body, json!({ "error": "Unauthorized" }));
    Ok(())
}

#[tokio::test]
async fn unknown_token_is_401_unauthorized() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/team/campaigns", server.base_url))
        .bearer_auth("not-a-session")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], json!("Unauthorized"));
    Ok(())
}

#[tokio::test]
async fn read_returns_only_the_callers_team_campaigns() -> Result<()> {
    let server = common::spawn_server().await?;
    let mine = common::seed_team_user(&server.store, "T1", "u1").await;
    let theirs = common::seed_team_user(&server.store, "T2", "u2").await;

    for (name, team_id) in [
        ("Spring Sale", mine.team_id),
        ("Rival Launch", theirs.team_id),
        ("Summer Push", mine.team_id),
    ] {
        server
            .store
            .insert_campaign(NewCampaign {
                name: name.to_string(),
                status: CampaignStatus::Draft,
                team_id,
            })
            .await?;
    }

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/api/team/campaigns", server.base_url))
        .bearer_auth(&mine.token)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    let campaigns = body["campaigns"].as_array().expect("campaigns array");
    let names: Vec<&str> = campaigns
        .iter()
        .filter_map(|c| c["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Spring Sale", "Summer Push"]);
    Ok(())
}

#[tokio::test]
async fn read_for_teamless_user_is_a_generic_server_error() -> Result<()> {
    let server = common::spawn_server().await?;
    let user = server.store.seed_user("loner", "loner@example.com").await;
    let token = server.store.issue_session(user.id).await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/api/team/campaigns", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await?;
    assert_eq!(body, json!({ "error": "Internal Server Error" }));
    Ok(())
}
