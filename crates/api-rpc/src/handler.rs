//! RPC Method Handlers
//!
//! Each mutating method validates its input, runs the mutation through the
//! engine, then re-publishes the queue display. A failed refresh is logged,
//! reported to the invoking member and does not undo or fail a mutation
//! that already happened.

use crate::error::to_rpc_error;
use crate::types::{
    ChannelRequest, ClearResponse, DeleteResponse, JoinResponse, LeaveResponse, ListResponse,
    MemberRequest, PopResponse, ViewResponse, ViewSummary,
};
use jsonrpsee::types::ErrorObjectOwned;
use lineup_core::application::constants::{DISPLAY_FAILED_NOTICE, TRY_AGAIN_NOTICE};
use lineup_core::application::render::annotation;
use lineup_core::application::QueueEngine;
use lineup_core::domain::queue::validate_id;
use lineup_core::domain::QueueKey;
use lineup_core::error::AppError;
use lineup_core::port::ChatClient;
use std::sync::Arc;
use tracing::{error, warn};

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    engine: Arc<QueueEngine>,
    chat: Arc<dyn ChatClient>,
}

impl RpcHandler {
    pub fn new(engine: Arc<QueueEngine>, chat: Arc<dyn ChatClient>) -> Self {
        Self { engine, chat }
    }

    /// queue.join.v1
    pub async fn join(&self, params: MemberRequest) -> Result<JoinResponse, ErrorObjectOwned> {
        let key = parse_key(&params.team_id, &params.channel_id)?;
        parse_member(&params.member_id)?;

        let outcome = match self.engine.join(&key, &params.member_id).await {
            Ok(outcome) => outcome,
            Err(e) => return Err(self.failed(&key, Some(params.member_id.as_str()), e).await),
        };

        let view = self
            .refresh_after_mutation(
                &key,
                Some(params.member_id.as_str()),
                params.view_id.as_deref(),
                None,
            )
            .await;
        let members = self.members(&key, Some(params.member_id.as_str())).await?;
        let position = members
            .iter()
            .position(|m| m == &params.member_id)
            .map(|i| i + 1);

        Ok(JoinResponse {
            admitted: outcome.admitted(),
            position,
            members,
            view,
        })
    }

    /// queue.leave.v1
    pub async fn leave(&self, params: MemberRequest) -> Result<LeaveResponse, ErrorObjectOwned> {
        let key = parse_key(&params.team_id, &params.channel_id)?;
        parse_member(&params.member_id)?;

        let outcome = match self.engine.leave(&key, &params.member_id).await {
            Ok(outcome) => outcome,
            Err(e) => return Err(self.failed(&key, Some(params.member_id.as_str()), e).await),
        };

        let note = outcome
            .removed()
            .then(|| annotation::left(&params.member_id));
        let view = self
            .refresh_after_mutation(
                &key,
                Some(params.member_id.as_str()),
                params.view_id.as_deref(),
                note.as_deref(),
            )
            .await;
        let members = self.members(&key, Some(params.member_id.as_str())).await?;

        Ok(LeaveResponse {
            removed: outcome.removed(),
            members,
            view,
        })
    }

    /// queue.pop.v1
    pub async fn pop(&self, params: ChannelRequest) -> Result<PopResponse, ErrorObjectOwned> {
        let key = parse_key(&params.team_id, &params.channel_id)?;
        let invoker = parse_optional_member(params.member_id.as_deref())?;

        let popped = match self.engine.pop_front(&key).await {
            Ok(popped) => popped,
            Err(e) => return Err(self.failed(&key, invoker, e).await),
        };

        let members = self.members(&key, invoker).await?;
        let next = members.first().cloned();
        let note = popped
            .as_deref()
            .map(|p| annotation::served(p, next.as_deref()));
        let view = self
            .refresh_after_mutation(&key, invoker, params.view_id.as_deref(), note.as_deref())
            .await;

        Ok(PopResponse {
            popped,
            next,
            members,
            view,
        })
    }

    /// queue.list.v1
    pub async fn list(&self, params: ChannelRequest) -> Result<ListResponse, ErrorObjectOwned> {
        let key = parse_key(&params.team_id, &params.channel_id)?;
        let invoker = parse_optional_member(params.member_id.as_deref())?;

        Ok(ListResponse {
            members: self.members(&key, invoker).await?,
        })
    }

    /// queue.clear.v1
    pub async fn clear(&self, params: ChannelRequest) -> Result<ClearResponse, ErrorObjectOwned> {
        let key = parse_key(&params.team_id, &params.channel_id)?;
        let invoker = parse_optional_member(params.member_id.as_deref())?;

        let removed = match self.engine.clear(&key).await {
            Ok(removed) => removed,
            Err(e) => return Err(self.failed(&key, invoker, e).await),
        };

        let view = self
            .refresh_after_mutation(&key, invoker, params.view_id.as_deref(), None)
            .await;

        Ok(ClearResponse { removed, view })
    }

    /// queue.show.v1 and view.refresh.v1
    ///
    /// Unlike the post-mutation refresh, publishing is the whole point here,
    /// so a failure is returned to the caller.
    pub async fn refresh(&self, params: ChannelRequest) -> Result<ViewResponse, ErrorObjectOwned> {
        let key = parse_key(&params.team_id, &params.channel_id)?;
        let invoker = parse_optional_member(params.member_id.as_deref())?;

        let published = match self
            .engine
            .refresh_view(&key, params.view_id.as_deref(), None)
            .await
        {
            Ok(published) => published,
            Err(e) => return Err(self.failed(&key, invoker, e).await),
        };
        let members = self.members(&key, invoker).await?;

        Ok(ViewResponse {
            view: published.into(),
            members,
        })
    }

    /// view.delete.v1
    pub async fn delete(&self, params: ChannelRequest) -> Result<DeleteResponse, ErrorObjectOwned> {
        let key = parse_key(&params.team_id, &params.channel_id)?;
        let invoker = parse_optional_member(params.member_id.as_deref())?;

        if let Err(e) = self
            .engine
            .delete_view(&key, params.view_id.as_deref())
            .await
        {
            return Err(self.failed(&key, invoker, e).await);
        }

        Ok(DeleteResponse { deleted: true })
    }

    async fn members(
        &self,
        key: &QueueKey,
        invoker: Option<&str>,
    ) -> Result<Vec<String>, ErrorObjectOwned> {
        match self.engine.list(key).await {
            Ok(members) => Ok(members),
            Err(e) => Err(self.failed(key, invoker, e).await),
        }
    }

    async fn refresh_after_mutation(
        &self,
        key: &QueueKey,
        invoker: Option<&str>,
        view_id: Option<&str>,
        note: Option<&str>,
    ) -> Option<ViewSummary> {
        match self.engine.refresh_view(key, view_id, note).await {
            Ok(published) => Some(published.into()),
            Err(e) => {
                warn!(
                    team_id = %key.team_id,
                    channel_id = %key.channel_id,
                    error = %e,
                    "View refresh after mutation failed"
                );
                self.notify(key, invoker, DISPLAY_FAILED_NOTICE).await;
                None
            }
        }
    }

    /// Log, tell the invoking member what went wrong, then convert for the wire.
    ///
    /// Store failures ask to try again; chat failures report the display.
    async fn failed(
        &self,
        key: &QueueKey,
        member_id: Option<&str>,
        err: AppError,
    ) -> ErrorObjectOwned {
        let notice = match &err {
            e if e.is_retryable() => {
                error!(
                    team_id = %key.team_id,
                    channel_id = %key.channel_id,
                    error = %err,
                    "Queue store unavailable"
                );
                Some(TRY_AGAIN_NOTICE)
            }
            AppError::Chat(_) => {
                warn!(
                    team_id = %key.team_id,
                    channel_id = %key.channel_id,
                    error = %err,
                    "Chat platform call failed"
                );
                Some(DISPLAY_FAILED_NOTICE)
            }
            _ => {
                warn!(
                    team_id = %key.team_id,
                    channel_id = %key.channel_id,
                    error = %err,
                    "Request failed"
                );
                None
            }
        };
        if let Some(notice) = notice {
            self.notify(key, member_id, notice).await;
        }
        to_rpc_error(err)
    }

    /// Best-effort ephemeral notice to the invoking member
    async fn notify(&self, key: &QueueKey, member_id: Option<&str>, text: &str) {
        let Some(member_id) = member_id else {
            return;
        };
        if let Err(e) = self
            .chat
            .post_ephemeral(&key.channel_id, member_id, text)
            .await
        {
            warn!(member_id, error = %e, "Failed to post notice");
        }
    }
}

fn parse_key(team_id: &str, channel_id: &str) -> Result<QueueKey, ErrorObjectOwned> {
    QueueKey::parse(team_id, channel_id).map_err(|e| to_rpc_error(e.into()))
}

fn parse_member(member_id: &str) -> Result<(), ErrorObjectOwned> {
    validate_id("member_id", member_id).map_err(|e| to_rpc_error(e.into()))
}

fn parse_optional_member(member_id: Option<&str>) -> Result<Option<&str>, ErrorObjectOwned> {
    if let Some(member_id) = member_id {
        parse_member(member_id)?;
    }
    Ok(member_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::code;
    use lineup_core::domain::RefreshStrategy;
    use lineup_core::port::chat_client::mocks::RecordingChatClient;
    use lineup_core::port::head_change::mocks::RecordingListener;
    use lineup_core::port::queue_repository::mocks::InMemoryQueueRepository;
    use lineup_core::port::time_provider::mocks::ManualTimeProvider;
    use lineup_core::port::view_repository::mocks::InMemoryViewRepository;
    use lineup_core::EngineConfig;

    struct Harness {
        handler: RpcHandler,
        chat: Arc<RecordingChatClient>,
        queue: Arc<InMemoryQueueRepository>,
        listener: Arc<RecordingListener>,
    }

    fn harness() -> Harness {
        let chat = Arc::new(RecordingChatClient::new());
        let queue = Arc::new(InMemoryQueueRepository::new());
        let listener = Arc::new(RecordingListener::new());
        let engine = Arc::new(QueueEngine::new(
            queue.clone(),
            Arc::new(InMemoryViewRepository::new()),
            chat.clone(),
            listener.clone(),
            Arc::new(ManualTimeProvider::new(1_000)),
            EngineConfig::default(),
        ));
        Harness {
            handler: RpcHandler::new(engine, chat.clone()),
            chat,
            queue,
            listener,
        }
    }

    fn member(member_id: &str) -> MemberRequest {
        MemberRequest {
            team_id: "T1".to_string(),
            channel_id: "C1".to_string(),
            member_id: member_id.to_string(),
            view_id: None,
        }
    }

    fn channel() -> ChannelRequest {
        ChannelRequest {
            team_id: "T1".to_string(),
            channel_id: "C1".to_string(),
            member_id: Some("U0".to_string()),
            view_id: None,
        }
    }

    #[tokio::test]
    async fn test_join_publishes_display() {
        let h = harness();

        let first = h.handler.join(member("A")).await.unwrap();
        assert!(first.admitted);
        assert_eq!(first.position, Some(1));
        assert_eq!(first.view.unwrap().strategy, RefreshStrategy::Created);

        let again = h.handler.join(member("A")).await.unwrap();
        assert!(!again.admitted);
        assert_eq!(again.members, vec!["A"]);
        assert_eq!(again.view.unwrap().strategy, RefreshStrategy::EditedInPlace);

        assert_eq!(h.chat.live_documents("C1").len(), 1);
    }

    #[tokio::test]
    async fn test_pop_annotates_and_notifies() {
        let h = harness();
        h.handler.join(member("A")).await.unwrap();
        h.handler.join(member("B")).await.unwrap();

        let response = h.handler.pop(channel()).await.unwrap();

        assert_eq!(response.popped.as_deref(), Some("A"));
        assert_eq!(response.next.as_deref(), Some("B"));
        assert_eq!(h.listener.members(), vec!["B"]);

        let live = h.chat.live_documents("C1");
        assert_eq!(
            live[0].1.annotation.as_deref(),
            Some("<@A> is done, <@B> is up.")
        );
    }

    #[tokio::test]
    async fn test_leave_annotation_only_when_removed() {
        let h = harness();
        h.handler.join(member("A")).await.unwrap();

        let absent = h.handler.leave(member("Z")).await.unwrap();
        assert!(!absent.removed);
        assert_eq!(h.chat.live_documents("C1")[0].1.annotation, None);

        let left = h.handler.leave(member("A")).await.unwrap();
        assert!(left.removed);
        assert_eq!(
            h.chat.live_documents("C1")[0].1.annotation.as_deref(),
            Some("<@A> left the queue.")
        );
    }

    #[tokio::test]
    async fn test_invalid_ids_rejected() {
        let h = harness();

        let err = h.handler.join(member("")).await.unwrap_err();
        assert_eq!(err.code(), code::VALIDATION_ERROR);

        let mut req = member("A");
        req.channel_id = "C".repeat(65);
        let err = h.handler.join(req).await.unwrap_err();
        assert_eq!(err.code(), code::VALIDATION_ERROR);

        assert_eq!(h.chat.post_count(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_posts_try_again() {
        let h = harness();
        h.queue.set_unavailable(true);

        let err = h.handler.join(member("A")).await.unwrap_err();

        assert_eq!(err.code(), code::STORE_UNAVAILABLE);
        assert_eq!(
            h.chat.ephemerals(),
            vec![(
                "C1".to_string(),
                "A".to_string(),
                TRY_AGAIN_NOTICE.to_string()
            )]
        );
        assert_eq!(h.chat.post_count(), 0);
    }

    fn notice(member_id: &str, text: &str) -> (String, String, String) {
        ("C1".to_string(), member_id.to_string(), text.to_string())
    }

    #[tokio::test]
    async fn test_refresh_failure_does_not_fail_mutation() {
        let h = harness();
        h.chat.set_publishing_failing(true);

        let response = h.handler.join(member("A")).await.unwrap();

        assert!(response.admitted);
        assert!(response.view.is_none());
        assert_eq!(response.members, vec!["A"]);
        assert_eq!(h.chat.ephemerals(), vec![notice("A", DISPLAY_FAILED_NOTICE)]);
    }

    #[tokio::test]
    async fn test_explicit_refresh_failure_is_reported() {
        let h = harness();
        h.chat.set_publishing_failing(true);

        let err = h.handler.refresh(channel()).await.unwrap_err();

        assert_eq!(err.code(), code::CHAT_ERROR);
        assert_eq!(h.chat.ephemerals(), vec![notice("U0", DISPLAY_FAILED_NOTICE)]);
    }

    #[tokio::test]
    async fn test_unreachable_platform_still_answers() {
        let h = harness();
        h.chat.set_transport_down(true);

        // The notice itself cannot be delivered; the mutation still stands
        let response = h.handler.join(member("A")).await.unwrap();
        assert!(response.view.is_none());
        assert!(h.chat.ephemerals().is_empty());

        let err = h.handler.refresh(channel()).await.unwrap_err();
        assert_eq!(err.code(), code::CHAT_ERROR);
    }

    #[tokio::test]
    async fn test_validation_failure_posts_no_notice() {
        let h = harness();

        let mut req = channel();
        req.team_id = String::new();
        let err = h.handler.refresh(req).await.unwrap_err();

        assert_eq!(err.code(), code::VALIDATION_ERROR);
        assert!(h.chat.ephemerals().is_empty());
    }

    #[tokio::test]
    async fn test_delete_resets_queue() {
        let h = harness();
        h.handler.join(member("A")).await.unwrap();

        let response = h.handler.delete(channel()).await.unwrap();
        assert!(response.deleted);
        assert!(h.chat.live_documents("C1").is_empty());

        let listed = h.handler.list(channel()).await.unwrap();
        assert!(listed.members.is_empty());
    }
}
