// Chat Client Port (Interface)

use crate::domain::{DisplayDocument, MessageMarker, ViewId};
use async_trait::async_trait;
use thiserror::Error;

/// Closed set of failures the chat platform can report.
///
/// The reconciler switches on these to pick a fallback instead of matching
/// platform error strings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// The message handle no longer exists
    #[error("message not found")]
    NotFound,

    /// The message exists but cannot be edited by us
    #[error("message cannot be edited")]
    NotEditable,

    /// The message exists but cannot be deleted by us
    #[error("message cannot be deleted")]
    NotDeletable,

    /// Anything else: network, auth, rate limit, malformed response
    #[error("chat transport error: {0}")]
    Transport(String),
}

impl ChatError {
    /// Errors meaning "this handle is unusable", recovered by posting anew
    pub fn is_stale_handle(&self) -> bool {
        matches!(
            self,
            ChatError::NotFound | ChatError::NotEditable | ChatError::NotDeletable
        )
    }
}

pub type ChatResult<T> = std::result::Result<T, ChatError>;

/// Outbound operations against the chat platform
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Publish a new document, returning its handle
    async fn post_message(&self, channel_id: &str, document: &DisplayDocument)
        -> ChatResult<ViewId>;

    /// Replace the content of an existing message
    async fn update_message(
        &self,
        channel_id: &str,
        view_id: &str,
        document: &DisplayDocument,
    ) -> ChatResult<ViewId>;

    async fn delete_message(&self, channel_id: &str, view_id: &str) -> ChatResult<()>;

    /// Messages posted after `since`, oldest first, at most `limit`
    async fn list_recent_messages(
        &self,
        channel_id: &str,
        since: &str,
        limit: usize,
    ) -> ChatResult<Vec<MessageMarker>>;

    async fn send_direct_message(&self, member_id: &str, text: &str) -> ChatResult<()>;

    /// Message visible only to `member_id` (request-scoped notices)
    async fn post_ephemeral(&self, channel_id: &str, member_id: &str, text: &str)
        -> ChatResult<()>;
}

// ============================================================================
// Recording Implementation for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Debug, Clone)]
    struct Message {
        id: ViewId,
        document: Option<DisplayDocument>,
        visible: bool,
    }

    #[derive(Default)]
    struct State {
        channels: HashMap<String, Vec<Message>>,
        seq: u64,
        posts: usize,
        updates: usize,
        deletes: usize,
        direct_messages: Vec<(String, String)>,
        ephemerals: Vec<(String, String, String)>,
    }

    impl State {
        fn next_id(&mut self) -> ViewId {
            self.seq += 1;
            format!("1700000000.{:06}", self.seq)
        }
    }

    /// Chat platform fake: keeps channel history in memory and records calls
    #[derive(Default)]
    pub struct RecordingChatClient {
        state: Mutex<State>,
        transport_down: AtomicBool,
        edits_locked: AtomicBool,
        deletes_locked: AtomicBool,
        publishing_failing: AtomicBool,
        direct_messages_failing: AtomicBool,
    }

    impl RecordingChatClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_transport_down(&self, down: bool) {
            self.transport_down.store(down, Ordering::SeqCst);
        }

        pub fn set_edits_locked(&self, locked: bool) {
            self.edits_locked.store(locked, Ordering::SeqCst);
        }

        pub fn set_deletes_locked(&self, locked: bool) {
            self.deletes_locked.store(locked, Ordering::SeqCst);
        }

        /// Posting and editing fail while ephemerals still go through
        pub fn set_publishing_failing(&self, failing: bool) {
            self.publishing_failing.store(failing, Ordering::SeqCst);
        }

        pub fn set_direct_messages_failing(&self, failing: bool) {
            self.direct_messages_failing.store(failing, Ordering::SeqCst);
        }

        /// Someone else talks in the channel
        pub fn post_chatter(&self, channel_id: &str, count: usize) {
            let mut state = self.state.lock().unwrap();
            for _ in 0..count {
                let id = state.next_id();
                state
                    .channels
                    .entry(channel_id.to_string())
                    .or_default()
                    .push(Message {
                        id,
                        document: None,
                        visible: true,
                    });
            }
        }

        /// A message the platform hides from the timeline
        pub fn post_hidden(&self, channel_id: &str) {
            let mut state = self.state.lock().unwrap();
            let id = state.next_id();
            state
                .channels
                .entry(channel_id.to_string())
                .or_default()
                .push(Message {
                    id,
                    document: None,
                    visible: false,
                });
        }

        /// Delete a message behind the engine's back (e.g. by an admin)
        pub fn remove_externally(&self, channel_id: &str, view_id: &str) {
            let mut state = self.state.lock().unwrap();
            if let Some(messages) = state.channels.get_mut(channel_id) {
                messages.retain(|m| m.id != view_id);
            }
        }

        /// Queue documents currently present in the channel
        pub fn live_documents(&self, channel_id: &str) -> Vec<(ViewId, DisplayDocument)> {
            let state = self.state.lock().unwrap();
            state
                .channels
                .get(channel_id)
                .map(|messages| {
                    messages
                        .iter()
                        .filter_map(|m| m.document.clone().map(|d| (m.id.clone(), d)))
                        .collect()
                })
                .unwrap_or_default()
        }

        pub fn post_count(&self) -> usize {
            self.state.lock().unwrap().posts
        }

        pub fn update_count(&self) -> usize {
            self.state.lock().unwrap().updates
        }

        pub fn delete_count(&self) -> usize {
            self.state.lock().unwrap().deletes
        }

        pub fn direct_messages(&self) -> Vec<(String, String)> {
            self.state.lock().unwrap().direct_messages.clone()
        }

        pub fn ephemerals(&self) -> Vec<(String, String, String)> {
            self.state.lock().unwrap().ephemerals.clone()
        }

        fn check_transport(&self) -> ChatResult<()> {
            if self.transport_down.load(Ordering::SeqCst) {
                return Err(ChatError::Transport("connection refused".to_string()));
            }
            Ok(())
        }

        fn check_publishing(&self) -> ChatResult<()> {
            self.check_transport()?;
            if self.publishing_failing.load(Ordering::SeqCst) {
                return Err(ChatError::Transport("rate limited".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ChatClient for RecordingChatClient {
        async fn post_message(
            &self,
            channel_id: &str,
            document: &DisplayDocument,
        ) -> ChatResult<ViewId> {
            self.check_publishing()?;
            let mut state = self.state.lock().unwrap();
            let id = state.next_id();
            state.posts += 1;
            state
                .channels
                .entry(channel_id.to_string())
                .or_default()
                .push(Message {
                    id: id.clone(),
                    document: Some(document.clone()),
                    visible: true,
                });
            Ok(id)
        }

        async fn update_message(
            &self,
            channel_id: &str,
            view_id: &str,
            document: &DisplayDocument,
        ) -> ChatResult<ViewId> {
            self.check_publishing()?;
            let mut state = self.state.lock().unwrap();
            let message = state
                .channels
                .get_mut(channel_id)
                .and_then(|messages| messages.iter_mut().find(|m| m.id == view_id))
                .ok_or(ChatError::NotFound)?;
            if self.edits_locked.load(Ordering::SeqCst) {
                return Err(ChatError::NotEditable);
            }
            message.document = Some(document.clone());
            state.updates += 1;
            Ok(view_id.to_string())
        }

        async fn delete_message(&self, channel_id: &str, view_id: &str) -> ChatResult<()> {
            self.check_transport()?;
            let mut state = self.state.lock().unwrap();
            let messages = state
                .channels
                .get_mut(channel_id)
                .ok_or(ChatError::NotFound)?;
            let position = messages
                .iter()
                .position(|m| m.id == view_id)
                .ok_or(ChatError::NotFound)?;
            if self.deletes_locked.load(Ordering::SeqCst) {
                return Err(ChatError::NotDeletable);
            }
            messages.remove(position);
            state.deletes += 1;
            Ok(())
        }

        async fn list_recent_messages(
            &self,
            channel_id: &str,
            since: &str,
            limit: usize,
        ) -> ChatResult<Vec<MessageMarker>> {
            self.check_transport()?;
            let state = self.state.lock().unwrap();
            // Ids are fixed-width, so string order is posting order
            Ok(state
                .channels
                .get(channel_id)
                .map(|messages| {
                    messages
                        .iter()
                        .filter(|m| m.id.as_str() > since)
                        .take(limit)
                        .map(|m| MessageMarker {
                            id: m.id.clone(),
                            visible: m.visible,
                        })
                        .collect()
                })
                .unwrap_or_default())
        }

        async fn send_direct_message(&self, member_id: &str, text: &str) -> ChatResult<()> {
            self.check_transport()?;
            if self.direct_messages_failing.load(Ordering::SeqCst) {
                return Err(ChatError::Transport("im.open failed".to_string()));
            }
            self.state
                .lock()
                .unwrap()
                .direct_messages
                .push((member_id.to_string(), text.to_string()));
            Ok(())
        }

        async fn post_ephemeral(
            &self,
            channel_id: &str,
            member_id: &str,
            text: &str,
        ) -> ChatResult<()> {
            self.check_transport()?;
            self.state.lock().unwrap().ephemerals.push((
                channel_id.to_string(),
                member_id.to_string(),
                text.to_string(),
            ));
            Ok(())
        }
    }
}
