use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseManager;
use crate::database::models::{Campaign, CampaignStatus, NewCampaign, Team, User};
use crate::database::store::{Store, StoreError};

/// Postgres-backed store over the schema in `migrations/`
pub struct PgStore {
    pool: Option<PgPool>,
}

impl PgStore {
    /// Store over an explicit pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Some(pool) }
    }

    /// Store that resolves its pool lazily through the manager, so the
    /// server can start before the database is reachable.
    pub fn lazy() -> Self {
        Self { pool: None }
    }

    async fn pool(&self) -> Result<PgPool, StoreError> {
        match &self.pool {
            Some(pool) => Ok(pool.clone()),
            None => DatabaseManager::pool().await,
        }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn user_for_session(&self, token: &str) -> Result<Option<User>, StoreError> {
        let pool = self.pool().await?;
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.name, u.email, u.created_at, u.updated_at
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token = $1
            AND s.expires_at > now()
            "#,
        )
        .bind(token)
        .fetch_optional(&pool)
        .await?;

        Ok(user)
    }

    async fn team_for_user(&self, user_id: i64) -> Result<Option<Team>, StoreError> {
        let pool = self.pool().await?;
        let team = sqlx::query_as::<_, Team>(
            r#"
            SELECT t.id, t.name, t.created_at, t.updated_at
            FROM team_members m
            JOIN teams t ON t.id = m.team_id
            WHERE m.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&pool)
        .await?;

        Ok(team)
    }

    async fn insert_campaign(&self, new: NewCampaign) -> Result<Campaign, StoreError> {
        let pool = self.pool().await?;
        let campaign = sqlx::query_as::<_, Campaign>(
            r#"
            INSERT INTO campaigns (name, status, team_id, created_at, updated_at)
            VALUES ($1, $2, $3, now(), now())
            RETURNING id, name, status, team_id, created_at, updated_at
            "#,
        )
        .bind(&new.name)
        .bind(new.status)
        .bind(new.team_id)
        .fetch_one(&pool)
        .await?;

        Ok(campaign)
    }

    async fn campaign_by_id(&self, id: i64) -> Result<Option<Campaign>, StoreError> {
        let pool = self.pool().await?;
        let campaign = sqlx::query_as::<_, Campaign>(
            r#"
            SELECT id, name, status, team_id, created_at, updated_at
            FROM campaigns
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&pool)
        .await?;

        Ok(campaign)
    }

    async fn update_campaign_status(
        &self,
        id: i64,
        status: CampaignStatus,
    ) -> Result<Campaign, StoreError> {
        let pool = self.pool().await?;
        match sqlx::query_as::<_, Campaign>(
            r#"
            UPDATE campaigns
            SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, name, status, team_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_one(&pool)
        .await
        {
            Ok(campaign) => Ok(campaign),
            Err(sqlx::Error::RowNotFound) => Err(StoreError::NotFound(format!("campaign {}", id))),
            Err(other) => Err(other.into()),
        }
    }

    async fn campaigns_for_team(&self, team_id: i64) -> Result<Vec<Campaign>, StoreError> {
        let pool = self.pool().await?;
        let campaigns = sqlx::query_as::<_, Campaign>(
            r#"
            SELECT id, name, status, team_id, created_at, updated_at
            FROM campaigns
            WHERE team_id = $1
            ORDER BY id
            "#,
        )
        .bind(team_id)
        .fetch_all(&pool)
        .await?;

        Ok(campaigns)
    }

    async fn health(&self) -> Result<(), StoreError> {
        let pool = self.pool().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }
}
