// Lineup Infrastructure - SQLite Adapter
// Implements: QueueRepository, ViewRepository

mod connection;
mod error;
mod migration;
mod queue_repository;
mod view_repository;

pub use connection::{create_pool, create_pool_with};
pub use migration::run_migrations;
pub use queue_repository::SqliteQueueRepository;
pub use view_repository::SqliteViewRepository;

// Note: sqlx::Error conversion is handled by a mapping helper
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
