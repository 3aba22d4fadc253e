// Port Layer - Interfaces for external dependencies

pub mod chat_client;
pub mod head_change;
pub mod queue_repository;
pub mod time_provider; // For deterministic testing
pub mod view_repository;

// Re-exports
pub use chat_client::{ChatClient, ChatError, ChatResult};
pub use head_change::{DirectMessageListener, HeadChangeListener};
pub use queue_repository::QueueRepository;
pub use time_provider::TimeProvider;
pub use view_repository::ViewRepository;
