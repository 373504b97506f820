use async_trait::async_trait;
use thiserror::Error;

use crate::database::models::{Campaign, CampaignStatus, NewCampaign, Team, User};

/// Errors surfaced by store implementations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Persistence boundary for the campaign service.
///
/// Covers the three external collaborators the action layer depends
/// on: session resolution, team membership resolution, and campaign
/// storage. Implementations: [`PgStore`](crate::database::postgres::PgStore)
/// for Postgres, [`MemoryStore`](crate::database::memory::MemoryStore)
/// for development and tests.
#[async_trait]
pub trait Store: Send + Sync {
    /// Resolve a bearer session token to its user. Unknown or expired
    /// tokens resolve to `None`, not an error.
    async fn user_for_session(&self, token: &str) -> Result<Option<User>, StoreError>;

    /// Resolve the team the user currently belongs to, if any.
    async fn team_for_user(&self, user_id: i64) -> Result<Option<Team>, StoreError>;

    /// Insert a campaign, assigning id and both timestamps. Returns
    /// the stored record.
    async fn insert_campaign(&self, new: NewCampaign) -> Result<Campaign, StoreError>;

    async fn campaign_by_id(&self, id: i64) -> Result<Option<Campaign>, StoreError>;

    /// Update only status and updated_at on the matching row.
    async fn update_campaign_status(
        &self,
        id: i64,
        status: CampaignStatus,
    ) -> Result<Campaign, StoreError>;

    /// All campaigns owned by the team, oldest first.
    async fn campaigns_for_team(&self, team_id: i64) -> Result<Vec<Campaign>, StoreError>;

    /// Connectivity probe for the health endpoint.
    async fn health(&self) -> Result<(), StoreError>;
}
