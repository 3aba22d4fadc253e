// View Domain Model

use serde::{Deserialize, Serialize};

/// Opaque handle to a published message (e.g. a Slack `ts`)
pub type ViewId = String;

/// A message seen in the channel after a given view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageMarker {
    pub id: ViewId,
    /// Hidden messages (edits, joins, bot bookkeeping) do not bury a view
    pub visible: bool,
}

impl MessageMarker {
    pub fn visible(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            visible: true,
        }
    }

    pub fn hidden(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            visible: false,
        }
    }
}

/// Which strategy a refresh ended up using
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefreshStrategy {
    EditedInPlace,
    Reposted,
    Created,
}

impl std::fmt::Display for RefreshStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefreshStrategy::EditedInPlace => write!(f, "EDITED_IN_PLACE"),
            RefreshStrategy::Reposted => write!(f, "REPOSTED"),
            RefreshStrategy::Created => write!(f, "CREATED"),
        }
    }
}

/// Outcome of a view refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedView {
    pub view_id: ViewId,
    pub strategy: RefreshStrategy,
}
