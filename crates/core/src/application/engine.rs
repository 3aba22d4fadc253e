// Queue Engine - the surface exposed to the dispatch layer

use crate::application::notifier::OrderChangeNotifier;
use crate::application::queue_store::QueueStore;
use crate::application::render::{channel_title, render};
use crate::application::view_reconciler::ViewReconciler;
use crate::config::EngineConfig;
use crate::domain::{JoinOutcome, LeaveOutcome, MemberId, PublishedView, QueueKey};
use crate::error::Result;
use crate::port::{ChatClient, HeadChangeListener, QueueRepository, TimeProvider, ViewRepository};
use std::sync::Arc;
use tracing::info;

/// Queue mutations with head-change notification, plus view refresh.
///
/// All collaborators are injected; nothing here is process-global.
pub struct QueueEngine {
    store: QueueStore,
    notifier: OrderChangeNotifier,
    reconciler: ViewReconciler,
}

impl QueueEngine {
    pub fn new(
        queue_repo: Arc<dyn QueueRepository>,
        view_repo: Arc<dyn ViewRepository>,
        chat: Arc<dyn ChatClient>,
        listener: Arc<dyn HeadChangeListener>,
        time_provider: Arc<dyn TimeProvider>,
        config: EngineConfig,
    ) -> Self {
        let store = QueueStore::new(queue_repo, time_provider, &config);
        let notifier = OrderChangeNotifier::new(store.clone(), listener);
        let reconciler = ViewReconciler::new(chat, view_repo, &config);
        Self {
            store,
            notifier,
            reconciler,
        }
    }

    /// Join the queue. Becoming head of an empty queue is not announced.
    pub async fn join(&self, key: &QueueKey, member_id: &str) -> Result<JoinOutcome> {
        self.notifier
            .with_head_change_detection(key, true, || self.store.join(key, member_id))
            .await
    }

    pub async fn leave(&self, key: &QueueKey, member_id: &str) -> Result<LeaveOutcome> {
        self.notifier
            .with_head_change_detection(key, false, || self.store.leave(key, member_id))
            .await
    }

    pub async fn pop_front(&self, key: &QueueKey) -> Result<Option<MemberId>> {
        self.notifier
            .with_head_change_detection(key, false, || self.store.pop_front(key))
            .await
    }

    pub async fn list(&self, key: &QueueKey) -> Result<Vec<MemberId>> {
        self.store.list(key).await
    }

    pub async fn clear(&self, key: &QueueKey) -> Result<u64> {
        self.store.clear(key).await
    }

    /// Re-render the queue and publish it to the channel
    pub async fn refresh_view(
        &self,
        key: &QueueKey,
        explicit_view_id: Option<&str>,
        annotation: Option<&str>,
    ) -> Result<PublishedView> {
        let members = self.store.list(key).await?;
        let document = render(&channel_title(&key.channel_id), &members, annotation);
        self.reconciler
            .reconcile(key, &document, explicit_view_id)
            .await
    }

    /// Delete action: remove the display and reset the queue
    pub async fn delete_view(&self, key: &QueueKey, explicit_view_id: Option<&str>) -> Result<()> {
        self.reconciler.delete_view(key, explicit_view_id).await?;
        let removed = self.store.clear(key).await?;
        info!(queue = %key, removed, "Queue display deleted and queue reset");
        Ok(())
    }
}
