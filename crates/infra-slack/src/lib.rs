//! Slack adapter for the `ChatClient` port
//!
//! Talks to the Slack Web API over HTTPS with a bot token and maps Slack's
//! string error codes onto the closed `ChatError` set.

mod api;
mod blocks;
mod client;

pub use api::{classify_error, is_visible_subtype};
pub use blocks::to_blocks;
pub use client::{SlackChatClient, SlackConfig, DEFAULT_API_BASE};
