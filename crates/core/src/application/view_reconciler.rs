// View Reconciler - keeps exactly one current queue display per channel
//
// Per channel: NoView -> (publish) -> Live; Live -> (edit) -> Live;
// Live -> (buried) -> Deleted -> (publish) -> Live; Live -> (delete action) -> NoView.
// Buriedness is only checked when a refresh happens; a view can stay buried
// until the next queue action touches the channel.

use crate::application::constants::BURY_SCAN_PADDING;
use crate::config::EngineConfig;
use crate::domain::{DisplayDocument, PublishedView, QueueKey, RefreshStrategy, ViewId};
use crate::error::Result;
use crate::port::{ChatClient, ChatError, ViewRepository};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct ViewReconciler {
    chat: Arc<dyn ChatClient>,
    views: Arc<dyn ViewRepository>,
    repost_after: Option<usize>,
}

impl ViewReconciler {
    pub fn new(
        chat: Arc<dyn ChatClient>,
        views: Arc<dyn ViewRepository>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            chat,
            views,
            repost_after: config.repost_after(),
        }
    }

    /// Make the channel show `document`, editing, reposting or creating as needed.
    ///
    /// `explicit_view_id` is the message the user interacted with, if any; it
    /// is tried before the recorded view. Whichever display ends up current,
    /// the other known ones are removed so the channel keeps a single display.
    pub async fn reconcile(
        &self,
        key: &QueueKey,
        document: &DisplayDocument,
        explicit_view_id: Option<&str>,
    ) -> Result<PublishedView> {
        let mut candidates: Vec<ViewId> =
            explicit_view_id.map(str::to_string).into_iter().collect();
        if let Some(recorded) = self.recorded_view(key).await {
            if !candidates.contains(&recorded) {
                candidates.push(recorded);
            }
        }

        for (i, target) in candidates.iter().enumerate() {
            if let Some(published) = self.reuse(key, document, target).await? {
                for superseded in &candidates[i + 1..] {
                    self.retire(key, superseded).await;
                }
                return Ok(published);
            }
        }

        // Handles that refused the edit may still be on screen
        let published = self.create(key, document, RefreshStrategy::Created).await?;
        for leftover in &candidates {
            self.retire(key, leftover).await;
        }
        Ok(published)
    }

    /// Bring `target` up to date, or repost it when buried.
    ///
    /// `None` means the handle is unusable and the next candidate should be tried.
    async fn reuse(
        &self,
        key: &QueueKey,
        document: &DisplayDocument,
        target: &str,
    ) -> Result<Option<PublishedView>> {
        if self.is_buried(key, target).await {
            if self.discard(key, target).await {
                info!(queue = %key, view_id = %target, "View buried, reposting");
                return self
                    .create(key, document, RefreshStrategy::Reposted)
                    .await
                    .map(Some);
            }
            info!(
                queue = %key,
                view_id = %target,
                "Buried view cannot be removed, editing in place"
            );
        }

        match self
            .chat
            .update_message(&key.channel_id, target, document)
            .await
        {
            Ok(view_id) => {
                self.record(key, &view_id).await;
                Ok(Some(PublishedView {
                    view_id,
                    strategy: RefreshStrategy::EditedInPlace,
                }))
            }
            Err(e) if e.is_stale_handle() => {
                debug!(
                    queue = %key,
                    view_id = %target,
                    error = %e,
                    "View handle stale, skipping it"
                );
                Ok(None)
            }
            Err(e) => {
                warn!(
                    queue = %key,
                    view_id = %target,
                    error = %e,
                    "Editing view failed, skipping it"
                );
                Ok(None)
            }
        }
    }

    /// Explicit delete action: remove the display and forget it
    pub async fn delete_view(&self, key: &QueueKey, explicit_view_id: Option<&str>) -> Result<()> {
        let target = match explicit_view_id {
            Some(id) => Some(id.to_string()),
            None => self.recorded_view(key).await,
        };

        if let Some(target) = target {
            match self.chat.delete_message(&key.channel_id, &target).await {
                Ok(()) => info!(queue = %key, view_id = %target, "View deleted"),
                Err(e) if e.is_stale_handle() => {
                    debug!(queue = %key, view_id = %target, error = %e, "View already gone")
                }
                Err(e) => return Err(e.into()),
            }
        }

        if let Err(e) = self.views.delete(key).await {
            warn!(queue = %key, error = %e, "Failed to forget view record");
        }
        Ok(())
    }

    /// Whether more than the threshold of visible messages sit below `view_id`
    async fn is_buried(&self, key: &QueueKey, view_id: &str) -> bool {
        let Some(threshold) = self.repost_after else {
            return false;
        };

        let limit = threshold + 1 + BURY_SCAN_PADDING;
        match self
            .chat
            .list_recent_messages(&key.channel_id, view_id, limit)
            .await
        {
            Ok(markers) => {
                let visible = markers
                    .iter()
                    .filter(|m| m.visible && m.id != view_id)
                    .count();
                visible > threshold
            }
            Err(e) => {
                warn!(
                    queue = %key,
                    view_id,
                    error = %e,
                    "Could not inspect channel history, assuming not buried"
                );
                false
            }
        }
    }

    /// Delete a buried view we are about to replace and forget it.
    ///
    /// Returns `false` when the message is still in the channel, in which case
    /// the record is kept. "Already gone" counts as removed.
    async fn discard(&self, key: &QueueKey, view_id: &str) -> bool {
        match self.chat.delete_message(&key.channel_id, view_id).await {
            Ok(()) => {}
            Err(ChatError::NotFound) => debug!(queue = %key, view_id, "Buried view already gone"),
            Err(e) => {
                warn!(queue = %key, view_id, error = %e, "Could not delete buried view");
                return false;
            }
        }
        if let Err(e) = self.views.delete(key).await {
            warn!(queue = %key, error = %e, "Failed to forget view record");
        }
        true
    }

    /// Remove a display that another one has replaced. Failures are logged only.
    async fn retire(&self, key: &QueueKey, view_id: &str) {
        match self.chat.delete_message(&key.channel_id, view_id).await {
            Ok(()) => debug!(queue = %key, view_id, "Superseded view removed"),
            Err(ChatError::NotFound) => {}
            Err(e) => warn!(queue = %key, view_id, error = %e, "Could not remove superseded view"),
        }
    }

    async fn create(
        &self,
        key: &QueueKey,
        document: &DisplayDocument,
        strategy: RefreshStrategy,
    ) -> Result<PublishedView> {
        let view_id = self.chat.post_message(&key.channel_id, document).await?;
        self.record(key, &view_id).await;
        debug!(queue = %key, view_id = %view_id, %strategy, "View published");
        Ok(PublishedView { view_id, strategy })
    }

    /// Store errors degrade to "no known view"
    async fn recorded_view(&self, key: &QueueKey) -> Option<ViewId> {
        match self.views.get(key).await {
            Ok(view) => view,
            Err(e) => {
                warn!(queue = %key, error = %e, "Reading view record failed, treating as unknown");
                None
            }
        }
    }

    async fn record(&self, key: &QueueKey, view_id: &str) {
        if let Err(e) = self.views.set(key, view_id).await {
            warn!(queue = %key, view_id, error = %e, "Recording view failed");
        }
    }
}
