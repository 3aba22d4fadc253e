// Order Change Notifier - "you are now first" detection around a mutation

use crate::application::queue_store::QueueStore;
use crate::domain::QueueKey;
use crate::error::Result;
use crate::port::HeadChangeListener;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

/// Decide whether a head transition deserves a notification.
///
/// Returns the member to notify, if any.
pub fn promoted_head<'a>(
    before: Option<&str>,
    after: Option<&'a str>,
    suppress_if_previously_empty: bool,
) -> Option<&'a str> {
    let after = after?;
    if before == Some(after) {
        return None;
    }
    if suppress_if_previously_empty && before.is_none() {
        return None;
    }
    Some(after)
}

/// Wraps queue mutations and notifies a newly promoted head at most once
#[derive(Clone)]
pub struct OrderChangeNotifier {
    store: QueueStore,
    listener: Arc<dyn HeadChangeListener>,
}

impl OrderChangeNotifier {
    pub fn new(store: QueueStore, listener: Arc<dyn HeadChangeListener>) -> Self {
        Self { store, listener }
    }

    /// Run `mutate` between two head snapshots.
    ///
    /// The notification is fire-once and never rolls back the mutation: a
    /// failed delivery, or a failed post-mutation snapshot, is logged and the
    /// mutation's result is still returned.
    pub async fn with_head_change_detection<T, F, Fut>(
        &self,
        key: &QueueKey,
        suppress_if_previously_empty: bool,
        mutate: F,
    ) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let before = self.store.list(key).await?.into_iter().next();

        let outcome = mutate().await?;

        let after = match self.store.list(key).await {
            Ok(members) => members.into_iter().next(),
            Err(e) => {
                warn!(
                    queue = %key,
                    error = %e,
                    "Head snapshot after mutation failed, skipping notification"
                );
                return Ok(outcome);
            }
        };

        if let Some(member_id) = promoted_head(
            before.as_deref(),
            after.as_deref(),
            suppress_if_previously_empty,
        ) {
            debug!(queue = %key, member_id, "Head changed, notifying");
            if let Err(e) = self.listener.on_new_head(key, member_id).await {
                warn!(
                    queue = %key,
                    member_id,
                    error = %e,
                    "Head change notification delivery failed"
                );
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::domain::JoinOutcome;
    use crate::port::head_change::mocks::RecordingListener;
    use crate::port::queue_repository::mocks::InMemoryQueueRepository;
    use crate::port::time_provider::mocks::ManualTimeProvider;

    fn setup() -> (QueueStore, OrderChangeNotifier, Arc<RecordingListener>) {
        let repo = Arc::new(InMemoryQueueRepository::new());
        let clock = Arc::new(ManualTimeProvider::new(1_000));
        let store = QueueStore::new(repo, clock, &EngineConfig::default());
        let listener = Arc::new(RecordingListener::new());
        let notifier = OrderChangeNotifier::new(store.clone(), listener.clone());
        (store, notifier, listener)
    }

    fn key() -> QueueKey {
        QueueKey::new("T1", "C1")
    }

    #[test]
    fn test_promoted_head_rules() {
        assert_eq!(promoted_head(None, Some("A"), true), None);
        assert_eq!(promoted_head(None, Some("A"), false), Some("A"));
        assert_eq!(promoted_head(Some("A"), Some("A"), false), None);
        assert_eq!(promoted_head(Some("A"), None, false), None);
        assert_eq!(promoted_head(Some("A"), Some("B"), true), Some("B"));
    }

    #[tokio::test]
    async fn test_first_join_into_empty_queue_is_silent() {
        let (store, notifier, listener) = setup();
        let k = key();

        let outcome = notifier
            .with_head_change_detection(&k, true, || store.join(&k, "A"))
            .await
            .unwrap();

        assert_eq!(outcome, JoinOutcome::Admitted);
        assert!(listener.received().is_empty());
    }

    #[tokio::test]
    async fn test_join_behind_head_is_silent() {
        let (store, notifier, listener) = setup();
        let k = key();
        store.join(&k, "A").await.unwrap();

        notifier
            .with_head_change_detection(&k, true, || store.join(&k, "B"))
            .await
            .unwrap();

        assert!(listener.received().is_empty());
    }

    #[tokio::test]
    async fn test_last_member_leaving_is_silent() {
        let (store, notifier, listener) = setup();
        let k = key();
        store.join(&k, "A").await.unwrap();

        notifier
            .with_head_change_detection(&k, false, || store.leave(&k, "A"))
            .await
            .unwrap();

        assert!(listener.received().is_empty());
    }

    #[tokio::test]
    async fn test_head_leaving_notifies_next_once() {
        let (store, notifier, listener) = setup();
        let k = key();
        store.join(&k, "A").await.unwrap();
        store.join(&k, "B").await.unwrap();

        notifier
            .with_head_change_detection(&k, false, || store.leave(&k, "A"))
            .await
            .unwrap();

        assert_eq!(listener.members(), vec!["B"]);
    }

    #[tokio::test]
    async fn test_failed_delivery_keeps_mutation() {
        let (store, notifier, listener) = setup();
        let k = key();
        store.join(&k, "A").await.unwrap();
        store.join(&k, "B").await.unwrap();
        listener.set_failing(true);

        let popped = notifier
            .with_head_change_detection(&k, false, || store.pop_front(&k))
            .await
            .unwrap();

        assert_eq!(popped.as_deref(), Some("A"));
        assert_eq!(listener.members(), vec!["B"]);
        assert_eq!(store.list(&k).await.unwrap(), vec!["B"]);
    }
}
