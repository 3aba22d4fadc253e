// SQLite QueueRepository Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use lineup_core::domain::{QueueEntry, QueueKey, Rank};
use lineup_core::error::Result;
use lineup_core::port::QueueRepository;
use sqlx::SqlitePool;

/// Membership set backed by the `queue_entries` table.
///
/// Each method is one SQL statement, so SQLite's write lock makes it atomic
/// with respect to every other process sharing the database file.
pub struct SqliteQueueRepository {
    pool: SqlitePool,
}

impl SqliteQueueRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QueueRepository for SqliteQueueRepository {
    async fn insert_if_absent(
        &self,
        key: &QueueKey,
        member_id: &str,
        now_millis: i64,
    ) -> Result<bool> {
        // Rank = max(now, highest rank + 1), computed inside the insert so two
        // admissions in the same millisecond cannot collide.
        // `WHERE true` disambiguates INSERT ... SELECT from the upsert clause.
        let result = sqlx::query(
            r#"
            INSERT INTO queue_entries (team_id, channel_id, member_id, admission_rank)
            SELECT ?1, ?2, ?3, MAX(?4, COALESCE(
                (SELECT MAX(admission_rank) + 1 FROM queue_entries
                 WHERE team_id = ?1 AND channel_id = ?2),
                ?4
            ))
            WHERE true
            ON CONFLICT (team_id, channel_id, member_id) DO NOTHING
            "#,
        )
        .bind(&key.team_id)
        .bind(&key.channel_id)
        .bind(member_id)
        .bind(now_millis)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove(&self, key: &QueueKey, member_id: &str) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM queue_entries WHERE team_id = ? AND channel_id = ? AND member_id = ?",
        )
        .bind(&key.team_id)
        .bind(&key.channel_id)
        .bind(member_id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_entry(&self, key: &QueueKey, entry: &QueueEntry) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM queue_entries
            WHERE team_id = ? AND channel_id = ? AND member_id = ? AND admission_rank = ?
            "#,
        )
        .bind(&key.team_id)
        .bind(&key.channel_id)
        .bind(&entry.member_id)
        .bind(entry.rank)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn range(&self, key: &QueueKey) -> Result<Vec<QueueEntry>> {
        let rows: Vec<EntryRow> = sqlx::query_as(
            r#"
            SELECT member_id, admission_rank FROM queue_entries
            WHERE team_id = ? AND channel_id = ?
            ORDER BY admission_rank ASC
            "#,
        )
        .bind(&key.team_id)
        .bind(&key.channel_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(EntryRow::into_entry).collect())
    }

    async fn head(&self, key: &QueueKey) -> Result<Option<QueueEntry>> {
        let row: Option<EntryRow> = sqlx::query_as(
            r#"
            SELECT member_id, admission_rank FROM queue_entries
            WHERE team_id = ? AND channel_id = ?
            ORDER BY admission_rank ASC
            LIMIT 1
            "#,
        )
        .bind(&key.team_id)
        .bind(&key.channel_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(EntryRow::into_entry))
    }

    async fn remove_ranked_below(&self, key: &QueueKey, cutoff: Rank) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM queue_entries WHERE team_id = ? AND channel_id = ? AND admission_rank < ?",
        )
        .bind(&key.team_id)
        .bind(&key.channel_id)
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }

    async fn clear(&self, key: &QueueKey) -> Result<u64> {
        let result = sqlx::query("DELETE FROM queue_entries WHERE team_id = ? AND channel_id = ?")
            .bind(&key.team_id)
            .bind(&key.channel_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EntryRow {
    member_id: String,
    admission_rank: i64,
}

impl EntryRow {
    fn into_entry(self) -> QueueEntry {
        QueueEntry::new(self.member_id, self.admission_rank)
    }
}
