// Domain Layer - Pure queue entities and value types

pub mod document;
pub mod error;
pub mod queue;
pub mod view;

// Re-exports
pub use document::{DisplayDocument, QueueAction};
pub use error::DomainError;
pub use queue::{JoinOutcome, LeaveOutcome, MemberId, QueueEntry, QueueKey, Rank};
pub use view::{MessageMarker, PublishedView, RefreshStrategy, ViewId};
