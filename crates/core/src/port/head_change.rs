// Head Change Listener Port - "you are now first" notifications

use crate::domain::QueueKey;
use crate::port::chat_client::{ChatClient, ChatResult};
use async_trait::async_trait;
use std::sync::Arc;

/// Called when a queue gets a new head member
#[async_trait]
pub trait HeadChangeListener: Send + Sync {
    async fn on_new_head(&self, key: &QueueKey, member_id: &str) -> ChatResult<()>;
}

/// Notifies the new head with a direct message
pub struct DirectMessageListener {
    chat: Arc<dyn ChatClient>,
}

impl DirectMessageListener {
    pub fn new(chat: Arc<dyn ChatClient>) -> Self {
        Self { chat }
    }

    pub fn message_for(key: &QueueKey) -> String {
        format!("You're up next in <#{}>!", key.channel_id)
    }
}

#[async_trait]
impl HeadChangeListener for DirectMessageListener {
    async fn on_new_head(&self, key: &QueueKey, member_id: &str) -> ChatResult<()> {
        self.chat
            .send_direct_message(member_id, &Self::message_for(key))
            .await
    }
}

pub mod mocks {
    use super::*;
    use crate::port::chat_client::ChatError;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// Records every notification it receives
    #[derive(Default)]
    pub struct RecordingListener {
        received: Mutex<Vec<(QueueKey, String)>>,
        failing: AtomicBool,
    }

    impl RecordingListener {
        pub fn new() -> Self {
            Self::default()
        }

        /// Record the call but report a delivery failure
        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        pub fn received(&self) -> Vec<(QueueKey, String)> {
            self.received.lock().unwrap().clone()
        }

        pub fn members(&self) -> Vec<String> {
            self.received().into_iter().map(|(_, m)| m).collect()
        }
    }

    #[async_trait]
    impl HeadChangeListener for RecordingListener {
        async fn on_new_head(&self, key: &QueueKey, member_id: &str) -> ChatResult<()> {
            self.received
                .lock()
                .unwrap()
                .push((key.clone(), member_id.to_string()));
            if self.failing.load(Ordering::SeqCst) {
                return Err(ChatError::Transport("dm delivery failed".to_string()));
            }
            Ok(())
        }
    }
}
