//! RPC Request/Response Types
//!
//! Defines the JSON-RPC method parameters and results.

use lineup_core::domain::{PublishedView, RefreshStrategy};
use serde::{Deserialize, Serialize};

/// queue.join.v1 / queue.leave.v1 - act on behalf of one member
#[derive(Debug, Deserialize)]
pub struct MemberRequest {
    pub team_id: String,
    pub channel_id: String,
    pub member_id: String,
    /// Message the action was triggered from, if any
    #[serde(default)]
    pub view_id: Option<String>,
}

/// Channel-scoped methods (pop, show, list, clear, view.*)
#[derive(Debug, Deserialize)]
pub struct ChannelRequest {
    pub team_id: String,
    pub channel_id: String,
    /// Invoking user, used for request-scoped notices
    #[serde(default)]
    pub member_id: Option<String>,
    #[serde(default)]
    pub view_id: Option<String>,
}

/// The display a request ended up publishing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSummary {
    pub view_id: String,
    pub strategy: RefreshStrategy,
}

impl From<PublishedView> for ViewSummary {
    fn from(view: PublishedView) -> Self {
        Self {
            view_id: view.view_id,
            strategy: view.strategy,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinResponse {
    pub admitted: bool,
    /// 1-based position of the member after the join
    pub position: Option<usize>,
    pub members: Vec<String>,
    /// None when the refresh failed; the join itself still happened
    pub view: Option<ViewSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveResponse {
    pub removed: bool,
    pub members: Vec<String>,
    pub view: Option<ViewSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopResponse {
    pub popped: Option<String>,
    pub next: Option<String>,
    pub members: Vec<String>,
    pub view: Option<ViewSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearResponse {
    pub removed: u64,
    pub view: Option<ViewSummary>,
}

/// queue.show.v1 / view.refresh.v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewResponse {
    pub view: ViewSummary,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}
