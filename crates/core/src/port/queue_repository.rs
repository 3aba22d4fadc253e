// Queue Repository Port (Interface)

use crate::domain::{QueueEntry, QueueKey, Rank};
use crate::error::Result;
use async_trait::async_trait;

/// Atomic primitives over the shared, order-preserving membership store.
///
/// Every method is a single store operation scoped to one `QueueKey`, so a
/// failed call never leaves a queue half-mutated. The engine holds no lock
/// on a key; correctness under concurrent callers rests on these primitives.
#[async_trait]
pub trait QueueRepository: Send + Sync {
    /// Insert `member_id` unless already present.
    ///
    /// The store assigns the rank as `max(now_millis, highest_rank + 1)` so
    /// two admissions within the same millisecond still get distinct,
    /// strictly increasing ranks.
    ///
    /// # Returns
    /// `true` if the member was inserted, `false` if it was already queued
    async fn insert_if_absent(&self, key: &QueueKey, member_id: &str, now_millis: i64)
        -> Result<bool>;

    /// Remove `member_id` if present. Returns `false` when absent.
    async fn remove(&self, key: &QueueKey, member_id: &str) -> Result<bool>;

    /// Remove `entry` only if that member is still queued at that rank.
    ///
    /// A member who was removed and re-joined in the meantime holds a new
    /// rank and is left alone. Returns `false` when nothing matched.
    async fn remove_entry(&self, key: &QueueKey, entry: &QueueEntry) -> Result<bool>;

    /// All entries, ascending by rank
    async fn range(&self, key: &QueueKey) -> Result<Vec<QueueEntry>>;

    /// Entry with the lowest rank
    async fn head(&self, key: &QueueKey) -> Result<Option<QueueEntry>>;

    /// Remove every entry ranked strictly below `cutoff`
    ///
    /// # Returns
    /// Number of entries removed
    async fn remove_ranked_below(&self, key: &QueueKey, cutoff: Rank) -> Result<u64>;

    /// Remove every entry of the queue
    async fn clear(&self, key: &QueueKey) -> Result<u64>;
}

// ============================================================================
// In-Memory Implementation for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory membership store with failure injection
    #[derive(Default)]
    pub struct InMemoryQueueRepository {
        queues: Mutex<HashMap<QueueKey, Vec<QueueEntry>>>,
        unavailable: AtomicBool,
        stolen_removals: AtomicUsize,
        remove_calls: AtomicUsize,
    }

    impl InMemoryQueueRepository {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every call fail with `StoreUnavailable`
        pub fn set_unavailable(&self, unavailable: bool) {
            self.unavailable.store(unavailable, Ordering::SeqCst);
        }

        /// The next `count` calls to `remove_entry` lose a race: the target
        /// is removed "by someone else" and the call reports `false`.
        pub fn steal_next_removals(&self, count: usize) {
            self.stolen_removals.store(count, Ordering::SeqCst);
        }

        pub fn remove_calls(&self) -> usize {
            self.remove_calls.load(Ordering::SeqCst)
        }

        /// Seed an entry with an explicit rank
        pub fn seed(&self, key: &QueueKey, member_id: &str, rank: Rank) {
            let mut queues = self.queues.lock().unwrap();
            let entries = queues.entry(key.clone()).or_default();
            entries.push(QueueEntry::new(member_id, rank));
            entries.sort_by_key(|e| e.rank);
        }

        fn check_available(&self) -> Result<()> {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(AppError::StoreUnavailable(
                    "in-memory store marked unavailable".to_string(),
                ));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl QueueRepository for InMemoryQueueRepository {
        async fn insert_if_absent(
            &self,
            key: &QueueKey,
            member_id: &str,
            now_millis: i64,
        ) -> Result<bool> {
            self.check_available()?;
            let mut queues = self.queues.lock().unwrap();
            let entries = queues.entry(key.clone()).or_default();
            if entries.iter().any(|e| e.member_id == member_id) {
                return Ok(false);
            }
            let rank = entries
                .iter()
                .map(|e| e.rank + 1)
                .max()
                .map_or(now_millis, |next| next.max(now_millis));
            entries.push(QueueEntry::new(member_id, rank));
            Ok(true)
        }

        async fn remove(&self, key: &QueueKey, member_id: &str) -> Result<bool> {
            self.check_available()?;
            let mut queues = self.queues.lock().unwrap();
            let Some(entries) = queues.get_mut(key) else {
                return Ok(false);
            };
            let before = entries.len();
            entries.retain(|e| e.member_id != member_id);
            Ok(entries.len() < before)
        }

        async fn remove_entry(&self, key: &QueueKey, entry: &QueueEntry) -> Result<bool> {
            self.check_available()?;
            self.remove_calls.fetch_add(1, Ordering::SeqCst);
            let mut queues = self.queues.lock().unwrap();
            let Some(entries) = queues.get_mut(key) else {
                return Ok(false);
            };
            let before = entries.len();
            entries.retain(|e| e != entry);
            if entries.len() == before {
                return Ok(false);
            }

            let stolen = self
                .stolen_removals
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            Ok(!stolen)
        }

        async fn range(&self, key: &QueueKey) -> Result<Vec<QueueEntry>> {
            self.check_available()?;
            let queues = self.queues.lock().unwrap();
            let mut entries = queues.get(key).cloned().unwrap_or_default();
            entries.sort_by_key(|e| e.rank);
            Ok(entries)
        }

        async fn head(&self, key: &QueueKey) -> Result<Option<QueueEntry>> {
            Ok(self.range(key).await?.into_iter().next())
        }

        async fn remove_ranked_below(&self, key: &QueueKey, cutoff: Rank) -> Result<u64> {
            self.check_available()?;
            let mut queues = self.queues.lock().unwrap();
            let Some(entries) = queues.get_mut(key) else {
                return Ok(0);
            };
            let before = entries.len();
            entries.retain(|e| e.rank >= cutoff);
            Ok((before - entries.len()) as u64)
        }

        async fn clear(&self, key: &QueueKey) -> Result<u64> {
            self.check_available()?;
            let mut queues = self.queues.lock().unwrap();
            Ok(queues.remove(key).map_or(0, |e| e.len() as u64))
        }
    }
}
