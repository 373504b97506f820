use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::models::{Campaign, CampaignStatus, NewCampaign, Team, User};
use crate::database::store::{Store, StoreError};

/// In-memory store backend.
///
/// Used by unit and integration tests, and by `campaigns server start
/// --memory` for running the API without Postgres. Ids are assigned
/// from per-table sequences; campaigns keep insertion order via the
/// BTreeMap key.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    next_user_id: i64,
    next_team_id: i64,
    next_campaign_id: i64,
    users: HashMap<i64, User>,
    teams: HashMap<i64, Team>,
    // user id -> team id
    memberships: HashMap<i64, i64>,
    // bearer token -> user id
    sessions: HashMap<String, i64>,
    campaigns: BTreeMap<i64, Campaign>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user fixture and return it.
    pub async fn seed_user(&self, name: &str, email: &str) -> User {
        let mut tables = self.inner.write().await;
        tables.next_user_id += 1;
        let now = Utc::now();
        let user = User {
            id: tables.next_user_id,
            name: name.to_string(),
            email: email.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        user
    }

    /// Insert a team fixture and return it.
    pub async fn seed_team(&self, name: &str) -> Team {
        let mut tables = self.inner.write().await;
        tables.next_team_id += 1;
        let now = Utc::now();
        let team = Team {
            id: tables.next_team_id,
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.teams.insert(team.id, team.clone());
        team
    }

    /// Attach a user to a team, replacing any previous membership.
    pub async fn join_team(&self, user_id: i64, team_id: i64) {
        let mut tables = self.inner.write().await;
        tables.memberships.insert(user_id, team_id);
    }

    /// Issue a bearer session token for the user.
    pub async fn issue_session(&self, user_id: i64) -> String {
        let token = Uuid::new_v4().simple().to_string();
        let mut tables = self.inner.write().await;
        tables.sessions.insert(token.clone(), user_id);
        token
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn user_for_session(&self, token: &str) -> Result<Option<User>, StoreError> {
        let tables = self.inner.read().await;
        let user = tables
            .sessions
            .get(token)
            .and_then(|user_id| tables.users.get(user_id))
            .cloned();
        Ok(user)
    }

    async fn team_for_user(&self, user_id: i64) -> Result<Option<Team>, StoreError> {
        let tables = self.inner.read().await;
        let team = tables
            .memberships
            .get(&user_id)
            .and_then(|team_id| tables.teams.get(team_id))
            .cloned();
        Ok(team)
    }

    async fn insert_campaign(&self, new: NewCampaign) -> Result<Campaign, StoreError> {
        let mut tables = self.inner.write().await;
        tables.next_campaign_id += 1;
        let now = Utc::now();
        let campaign = Campaign {
            id: tables.next_campaign_id,
            name: new.name,
            status: new.status,
            team_id: new.team_id,
            created_at: now,
            updated_at: now,
        };
        tables.campaigns.insert(campaign.id, campaign.clone());
        Ok(campaign)
    }

    async fn campaign_by_id(&self, id: i64) -> Result<Option<Campaign>, StoreError> {
        let tables = self.inner.read().await;
        Ok(tables.campaigns.get(&id).cloned())
    }

    async fn update_campaign_status(
        &self,
        id: i64,
        status: CampaignStatus,
    ) -> Result<Campaign, StoreError> {
        let mut tables = self.inner.write().await;
        let campaign = tables
            .campaigns
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("campaign {}", id)))?;
        campaign.status = status;
        campaign.updated_at = Utc::now();
        Ok(campaign.clone())
    }

    async fn campaigns_for_team(&self, team_id: i64) -> Result<Vec<Campaign>, StoreError> {
        let tables = self.inner.read().await;
        Ok(tables
            .campaigns
            .values()
            .filter(|c| c.team_id == team_id)
            .cloned()
            .collect())
    }

    async fn health(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn session_resolution_round_trip() {
        let store = MemoryStore::new();
        let user = store.seed_user("alice", "alice@example.com").await;
        let token = store.issue_session(user.id).await;

        let resolved = store.user_for_session(&token).await.unwrap();
        assert_eq!(resolved.map(|u| u.id), Some(user.id));

        let missing = store.user_for_session("bogus").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn campaigns_are_scoped_to_their_team() {
        let store = MemoryStore::new();
        let t1 = store.seed_team("t1").await;
        let t2 = store.seed_team("t2").await;

        for (name, team_id) in [("a", t1.id), ("b", t2.id), ("c", t1.id)] {
            store
                .insert_campaign(NewCampaign {
                    name: name.to_string(),
                    status: CampaignStatus::Draft,
                    team_id,
                })
                .await
                .unwrap();
        }

        let t1_campaigns = store.campaigns_for_team(t1.id).await.unwrap();
        assert_eq!(t1_campaigns.len(), 2);
        assert!(t1_campaigns.iter().all(|c| c.team_id == t1.id));
    }
}
