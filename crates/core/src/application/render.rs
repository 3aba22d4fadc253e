// Renderer - queue snapshot to display document (pure, no I/O)

use crate::domain::{DisplayDocument, MemberId, QueueAction};

/// Line shown instead of an empty list
pub const EMPTY_PLACEHOLDER: &str = "The queue is empty.";

/// Footer hint shown above the action buttons
pub const USAGE_HINT: &str = "Use the buttons below or `/lineup join` to get in line.";

/// Title for a channel's queue display
pub fn channel_title(channel_id: &str) -> String {
    format!("Lineup for <#{}>", channel_id)
}

/// Platform mention for a member id
pub fn mention(member_id: &str) -> String {
    format!("<@{}>", member_id)
}

/// Build the display for a queue snapshot.
///
/// Deterministic: identical inputs give identical documents.
pub fn render(title: &str, members: &[MemberId], annotation: Option<&str>) -> DisplayDocument {
    let lines = if members.is_empty() {
        vec![EMPTY_PLACEHOLDER.to_string()]
    } else {
        members
            .iter()
            .enumerate()
            .map(|(i, m)| format!("{}. {}", i + 1, mention(m)))
            .collect()
    };

    DisplayDocument {
        title: title.to_string(),
        lines,
        annotation: annotation
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string),
        hint: USAGE_HINT.to_string(),
        actions: QueueAction::ALL.to_vec(),
    }
}

/// Annotations describing what just happened to the queue
pub mod annotation {
    use super::mention;

    pub fn left(member_id: &str) -> String {
        format!("{} left the queue.", mention(member_id))
    }

    pub fn served(popped: &str, next: Option<&str>) -> String {
        match next {
            Some(next) => format!("{} is done, {} is up.", mention(popped), mention(next)),
            None => format!("{} is done. Nobody is left in line.", mention(popped)),
        }
    }
}
