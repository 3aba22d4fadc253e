// View Repository Port (Interface)

use crate::domain::{QueueKey, ViewId};
use crate::error::Result;
use async_trait::async_trait;

/// Persists which published message currently represents a queue.
///
/// Last writer wins: the record is only a hint for which message to try
/// editing first.
#[async_trait]
pub trait ViewRepository: Send + Sync {
    async fn get(&self, key: &QueueKey) -> Result<Option<ViewId>>;

    async fn set(&self, key: &QueueKey, view_id: &str) -> Result<()>;

    async fn delete(&self, key: &QueueKey) -> Result<()>;
}

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct InMemoryViewRepository {
        records: Mutex<HashMap<QueueKey, ViewId>>,
        unavailable: AtomicBool,
    }

    impl InMemoryViewRepository {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_unavailable(&self, unavailable: bool) {
            self.unavailable.store(unavailable, Ordering::SeqCst);
        }

        /// Peek without going through the failure switch
        pub fn recorded(&self, key: &QueueKey) -> Option<ViewId> {
            self.records.lock().unwrap().get(key).cloned()
        }

        fn check_available(&self) -> Result<()> {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(AppError::StoreUnavailable(
                    "in-memory view store marked unavailable".to_string(),
                ));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ViewRepository for InMemoryViewRepository {
        async fn get(&self, key: &QueueKey) -> Result<Option<ViewId>> {
            self.check_available()?;
            Ok(self.records.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &QueueKey, view_id: &str) -> Result<()> {
            self.check_available()?;
            self.records
                .lock()
                .unwrap()
                .insert(key.clone(), view_id.to_string());
            Ok(())
        }

        async fn delete(&self, key: &QueueKey) -> Result<()> {
            self.check_available()?;
            self.records.lock().unwrap().remove(key);
            Ok(())
        }
    }
}
