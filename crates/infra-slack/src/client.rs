// Slack Web API ChatClient Implementation

use crate::api::{
    classify_error, HistoryResponse, OpenConversationResponse, PostMessageResponse,
};
use crate::blocks::to_blocks;
use async_trait::async_trait;
use lineup_core::domain::{DisplayDocument, MessageMarker, ViewId};
use lineup_core::port::{ChatClient, ChatError, ChatResult};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://slack.com/api";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct SlackConfig {
    pub token: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl SlackConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }
}

pub struct SlackChatClient {
    http: reqwest::Client,
    config: SlackConfig,
}

impl SlackChatClient {
    pub fn new(config: SlackConfig) -> ChatResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ChatError::Transport(format!("http client: {}", e)))?;

        Ok(Self { http, config })
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.config.api_base, method)
    }

    /// POST a JSON body to a write method
    async fn call<T: DeserializeOwned>(&self, method: &str, body: Value) -> ChatResult<T> {
        let response = self
            .http
            .post(self.url(method))
            .bearer_auth(&self.config.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Transport(format!("{}: {}", method, e)))?;

        decode(method, response).await
    }

    /// GET a read method with query parameters
    async fn query<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, String)],
    ) -> ChatResult<T> {
        let response = self
            .http
            .get(self.url(method))
            .bearer_auth(&self.config.token)
            .query(params)
            .send()
            .await
            .map_err(|e| ChatError::Transport(format!("{}: {}", method, e)))?;

        decode(method, response).await
    }
}

async fn decode<T: DeserializeOwned>(method: &str, response: reqwest::Response) -> ChatResult<T> {
    let status = response.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        tracing::warn!(method, "Slack rate limit hit");
        return Err(ChatError::Transport(format!("{}: rate limited", method)));
    }
    if !status.is_success() {
        return Err(ChatError::Transport(format!("{}: HTTP {}", method, status)));
    }

    let envelope: Value = response
        .json()
        .await
        .map_err(|e| ChatError::Transport(format!("{}: invalid response: {}", method, e)))?;

    parse_envelope(method, envelope)
}

/// Slack always answers 200 with `ok` telling success apart
fn parse_envelope<T: DeserializeOwned>(method: &str, envelope: Value) -> ChatResult<T> {
    if envelope.get("ok").and_then(Value::as_bool) != Some(true) {
        let code = envelope
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown_error");
        tracing::debug!(method, code, "Slack call rejected");
        return Err(classify_error(method, code));
    }

    serde_json::from_value(envelope)
        .map_err(|e| ChatError::Transport(format!("{}: unexpected response: {}", method, e)))
}

#[async_trait]
impl ChatClient for SlackChatClient {
    async fn post_message(
        &self,
        channel_id: &str,
        document: &DisplayDocument,
    ) -> ChatResult<ViewId> {
        let posted: PostMessageResponse = self
            .call(
                "chat.postMessage",
                json!({
                    "channel": channel_id,
                    "text": document.fallback_text(),
                    "blocks": to_blocks(document),
                }),
            )
            .await?;

        Ok(posted.ts)
    }

    async fn update_message(
        &self,
        channel_id: &str,
        view_id: &str,
        document: &DisplayDocument,
    ) -> ChatResult<ViewId> {
        let updated: PostMessageResponse = self
            .call(
                "chat.update",
                json!({
                    "channel": channel_id,
                    "ts": view_id,
                    "text": document.fallback_text(),
                    "blocks": to_blocks(document),
                }),
            )
            .await?;

        Ok(updated.ts)
    }

    async fn delete_message(&self, channel_id: &str, view_id: &str) -> ChatResult<()> {
        let _: Value = self
            .call("chat.delete", json!({ "channel": channel_id, "ts": view_id }))
            .await?;
        Ok(())
    }

    async fn list_recent_messages(
        &self,
        channel_id: &str,
        since: &str,
        limit: usize,
    ) -> ChatResult<Vec<MessageMarker>> {
        let history: HistoryResponse = self
            .query(
                "conversations.history",
                &[
                    ("channel", channel_id.to_string()),
                    ("oldest", since.to_string()),
                    ("inclusive", "false".to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        Ok(history.into_markers())
    }

    async fn send_direct_message(&self, member_id: &str, text: &str) -> ChatResult<()> {
        let opened: OpenConversationResponse = self
            .call("conversations.open", json!({ "users": member_id }))
            .await?;

        let _: PostMessageResponse = self
            .call(
                "chat.postMessage",
                json!({ "channel": opened.channel.id, "text": text }),
            )
            .await?;
        Ok(())
    }

    async fn post_ephemeral(
        &self,
        channel_id: &str,
        member_id: &str,
        text: &str,
    ) -> ChatResult<()> {
        let _: Value = self
            .call(
                "chat.postEphemeral",
                json!({ "channel": channel_id, "user": member_id, "text": text }),
            )
            .await?;
        Ok(())
    }
}
