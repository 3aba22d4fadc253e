// Display Document - what the chat platform renders for a queue

use serde::{Deserialize, Serialize};

/// Buttons attached to every queue display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueAction {
    Join,
    Leave,
    Refresh,
    Delete,
}

impl QueueAction {
    /// Fixed order in which actions are shown
    pub const ALL: [QueueAction; 4] = [
        QueueAction::Join,
        QueueAction::Leave,
        QueueAction::Refresh,
        QueueAction::Delete,
    ];

    /// Stable id the dispatch layer receives back on click
    pub fn action_id(&self) -> &'static str {
        match self {
            QueueAction::Join => "lineup_join",
            QueueAction::Leave => "lineup_leave",
            QueueAction::Refresh => "lineup_refresh",
            QueueAction::Delete => "lineup_delete",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QueueAction::Join => "Join",
            QueueAction::Leave => "Leave",
            QueueAction::Refresh => "Refresh",
            QueueAction::Delete => "Delete",
        }
    }
}

/// Rendered queue view. Derived from a snapshot, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayDocument {
    pub title: String,
    /// Numbered member lines, or a single placeholder line
    pub lines: Vec<String>,
    pub annotation: Option<String>,
    pub hint: String,
    pub actions: Vec<QueueAction>,
}

impl DisplayDocument {
    /// Plain-text rendering (notification previews, clients without rich layout)
    pub fn fallback_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.title);
        for line in &self.lines {
            out.push('\n');
            out.push_str(line);
        }
        if let Some(note) = &self.annotation {
            out.push('\n');
            out.push_str(note);
        }
        out.push('\n');
        out.push_str(&self.hint);
        out
    }
}
