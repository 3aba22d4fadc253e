// SQLite ViewRepository Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use lineup_core::domain::{QueueKey, ViewId};
use lineup_core::error::Result;
use lineup_core::port::{TimeProvider, ViewRepository};
use sqlx::SqlitePool;
use std::sync::Arc;

pub struct SqliteViewRepository {
    pool: SqlitePool,
    time_provider: Arc<dyn TimeProvider>,
}

impl SqliteViewRepository {
    pub fn new(pool: SqlitePool, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            pool,
            time_provider,
        }
    }
}

#[async_trait]
impl ViewRepository for SqliteViewRepository {
    async fn get(&self, key: &QueueKey) -> Result<Option<ViewId>> {
        sqlx::query_scalar("SELECT view_id FROM view_records WHERE team_id = ? AND channel_id = ?")
            .bind(&key.team_id)
            .bind(&key.channel_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn set(&self, key: &QueueKey, view_id: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO view_records (team_id, channel_id, view_id, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (team_id, channel_id)
            DO UPDATE SET view_id = excluded.view_id, updated_at = excluded.updated_at
            "#,
        )
        .bind(&key.team_id)
        .bind(&key.channel_id)
        .bind(view_id)
        .bind(self.time_provider.now_millis())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn delete(&self, key: &QueueKey) -> Result<()> {
        sqlx::query("DELETE FROM view_records WHERE team_id = ? AND channel_id = ?")
            .bind(&key.team_id)
            .bind(&key.channel_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }
}
