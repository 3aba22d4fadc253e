// Application Layer - Use Cases and Business Logic

pub mod constants;
pub mod engine;
pub mod notifier;
pub mod queue_store;
pub mod render;
pub mod view_reconciler;

// Re-exports
pub use engine::QueueEngine;
pub use notifier::OrderChangeNotifier;
pub use queue_store::QueueStore;
pub use view_reconciler::ViewReconciler;
