//! Slack Web API response shapes and error mapping

use lineup_core::domain::MessageMarker;
use lineup_core::port::ChatError;
use serde::Deserialize;

/// Map a Slack `error` code onto the chat port's closed error set
pub fn classify_error(method: &str, code: &str) -> ChatError {
    match code {
        "message_not_found" | "thread_not_found" => ChatError::NotFound,
        "cant_update_message" | "edit_window_closed" | "is_inactive" => ChatError::NotEditable,
        "cant_delete_message" | "compliance_exports_prevent_deletion" => ChatError::NotDeletable,
        other => ChatError::Transport(format!("{} failed: {}", method, other)),
    }
}

/// Subtypes that do not show up as a new message in the channel timeline
pub fn is_visible_subtype(subtype: Option<&str>) -> bool {
    !matches!(
        subtype,
        Some("message_changed")
            | Some("message_deleted")
            | Some("message_replied")
            | Some("channel_join")
            | Some("channel_leave")
    )
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostMessageResponse {
    pub ts: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenConversationResponse {
    pub channel: ChannelRef,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChannelRef {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryResponse {
    #[serde(default)]
    pub messages: Vec<HistoryMessage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryMessage {
    pub ts: String,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub hidden: bool,
}

impl HistoryResponse {
    /// Slack lists newest first; markers are oldest first
    pub fn into_markers(self) -> Vec<MessageMarker> {
        let mut markers: Vec<MessageMarker> = self
            .messages
            .into_iter()
            .map(|m| MessageMarker {
                visible: !m.hidden && is_visible_subtype(m.subtype.as_deref()),
                id: m.ts,
            })
            .collect();
        markers.reverse();
        markers
    }
}
