//! Shared fixtures: a file-backed SQLite store per test

#![allow(dead_code)]

use lineup_core::application::QueueEngine;
use lineup_core::domain::QueueKey;
use lineup_core::port::chat_client::mocks::RecordingChatClient;
use lineup_core::port::head_change::mocks::RecordingListener;
use lineup_core::port::time_provider::mocks::ManualTimeProvider;
use lineup_core::EngineConfig;
use lineup_infra_sqlite::{create_pool, run_migrations, SqliteQueueRepository, SqliteViewRepository};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;

pub const START_MILLIS: i64 = 1_700_000_000_000;

/// Temp database file removed on drop (with its WAL side files)
pub struct TempDb {
    pub pool: SqlitePool,
    path: PathBuf,
}

impl TempDb {
    pub async fn new() -> Self {
        let path = std::env::temp_dir().join(format!("lineup-test-{}.db", uuid::Uuid::new_v4()));
        let pool = create_pool(&format!("sqlite://{}", path.display()))
            .await
            .unwrap();
        run_migrations(&pool).await.unwrap();
        Self { pool, path }
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

pub fn key() -> QueueKey {
    QueueKey::new("T1", "C1")
}

pub struct Fixture {
    pub db: TempDb,
    pub clock: Arc<ManualTimeProvider>,
    pub queue_repo: Arc<SqliteQueueRepository>,
    pub view_repo: Arc<SqliteViewRepository>,
    pub chat: Arc<RecordingChatClient>,
    pub listener: Arc<RecordingListener>,
}

impl Fixture {
    pub async fn new() -> Self {
        let db = TempDb::new().await;
        let clock = Arc::new(ManualTimeProvider::new(START_MILLIS));
        let queue_repo = Arc::new(SqliteQueueRepository::new(db.pool.clone()));
        let view_repo = Arc::new(SqliteViewRepository::new(db.pool.clone(), clock.clone()));
        Self {
            db,
            clock,
            queue_repo,
            view_repo,
            chat: Arc::new(RecordingChatClient::new()),
            listener: Arc::new(RecordingListener::new()),
        }
    }

    pub fn engine(&self, config: EngineConfig) -> QueueEngine {
        QueueEngine::new(
            self.queue_repo.clone(),
            self.view_repo.clone(),
            self.chat.clone(),
            self.listener.clone(),
            self.clock.clone(),
            config,
        )
    }
}
