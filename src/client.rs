//! HTTP client for the campaign API.
//!
//! Mirrors what the dashboard's data hook does: reads go through a
//! cached list that is invalidated by every successful mutation, so
//! the next read re-fetches.

use serde::Deserialize;
use thiserror::Error;

use crate::actions::ActionState;
use crate::database::models::{Campaign, CampaignStatus};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Server error: {0}")]
    Server(String),

    /// Failure reported inside the action envelope
    #[error("{0}")]
    Action(String),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

#[derive(Debug, Deserialize)]
struct CampaignListBody {
    campaigns: Vec<Campaign>,
}

pub struct CampaignClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    cache: Option<Vec<Campaign>>,
}

impl CampaignClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token,
            cache: None,
        }
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// The team's campaigns, served from cache when one is populated
    pub async fn campaigns(&mut self) -> Result<Vec<Campaign>, ClientError> {
        if let Some(cached) = &self.cache {
            return Ok(cached.clone());
        }

        let fetched = self.fetch_campaigns().await?;
        self.cache = Some(fetched.clone());
        Ok(fetched)
    }

    /// Drop the cache and re-fetch
    pub async fn refresh(&mut self) -> Result<Vec<Campaign>, ClientError> {
        self.cache = None;
        self.campaigns().await
    }

    async fn fetch_campaigns(&self) -> Result<Vec<Campaign>, ClientError> {
        let url = format!("{}/api/team/campaigns", self.base_url);
        let response = self.authorized(self.http.get(&url)).send().await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            let message = body
                .get("error")
                .and_then(|e| e.as_str())
                .unwrap_or("request failed")
                .to_string();
            return Err(ClientError::Server(format!("{}: {}", status, message)));
        }

        let body: CampaignListBody = response
            .json()
            .await
            .map_err(|e| ClientError::Malformed(e.to_string()))?;
        Ok(body.campaigns)
    }

    /// Create a campaign through the action endpoint
    pub async fn create(
        &mut self,
        name: &str,
        status: Option<CampaignStatus>,
    ) -> Result<Campaign, ClientError> {
        let mut body = serde_json::json!({ "name": name });
        if let Some(status) = status {
            body["status"] = serde_json::json!(status);
        }

        let url = format!("{}/api/campaigns", self.base_url);
        self.post_action(&url, body).await
    }

    /// Transition a campaign's status through the action endpoint
    pub async fn set_status(
        &mut self,
        campaign_id: i64,
        status: CampaignStatus,
    ) -> Result<Campaign, ClientError> {
        let body = serde_json::json!({ "campaignId": campaign_id, "status": status });
        let url = format!("{}/api/campaigns/status", self.base_url);
        self.post_action(&url, body).await
    }

    async fn post_action(
        &mut self,
        url: &str,
        body: serde_json::Value,
    ) -> Result<Campaign, ClientError> {
        let response = self.authorized(self.http.post(url)).json(&body).send().await?;
        let state: ActionState = response
            .json()
            .await
            .map_err(|e| ClientError::Malformed(e.to_string()))?;

        if !state.success {
            return Err(ClientError::Action(
                state.error.unwrap_or_else(|| "action failed".to_string()),
            ));
        }

        let data = state
            .data
            .ok_or_else(|| ClientError::Malformed("success envelope without data".to_string()))?;
        let campaign: Campaign =
            serde_json::from_value(data).map_err(|e| ClientError::Malformed(e.to_string()))?;

        // Mutation succeeded, so the cached list is stale
        self.cache = None;

        Ok(campaign)
    }
}
